//! Path resolution: schema graph → per-field `PathChain`.
//!
//! A field's `sh:path` is either a predicate IRI or an RDF list whose elements
//! are predicate IRIs (forward hops) or blank nodes carrying exactly one
//! `sh:inversePath` triple (inverse hops).
//!
//! Lists are resolved with three narrow sub-queries instead of one query
//! alternating over "direct predicate | list head | list tail", which
//! engines have been seen to evaluate incompletely:
//!
//! 1. roots: every root with its raw `sh:path` value (IRIs resolve directly),
//! 2. heads: the first list cell of every root, with its element's modifier,
//! 3. tails: every later cell reachable via `rdf:rest+`, with its predecessor.
//!
//! All three run against the same store, so the blank-node ids they return
//! are valid join keys. `first_step[root]` and `next_step[cell]` are then
//! walked per root. Ids are never kept beyond one resolution pass.

use std::collections::{BTreeMap, BTreeSet};

use formgraph_rdf::{
    vocab::{RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE},
    Bindings, GraphStore, GroupPattern, Term, Triple, TriplePattern, Variable, Verb,
};

use crate::error::{FormError, PathDefect};
use crate::path::{Direction, FieldKey, PathChain, PathMap, PathStep};
use crate::vocab::{
    FORM_FIELD, FORM_GENERATOR, FORM_PROTOTYPE, FORM_SCOPE, FORM_SHAPE, SH_INVERSE_PATH, SH_PATH,
};

/// Which kind of schema entity carries the paths being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// `form:Field` declarations; roots are the fields themselves.
    Field,
    /// `form:Generator` declarations; roots are their `form:scope` nodes and
    /// the resolved fields are the generators' prototype-shape predicates.
    Generator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolution {
    pub chains: PathMap,
    /// Fields left out of `chains`, with the reason.
    pub malformed: Vec<(FieldKey, PathDefect)>,
}

/// Resolve every path of `kind` in `schema`. Malformed paths are omitted.
pub fn resolve_paths(schema: &GraphStore, kind: RootKind) -> Result<PathMap, FormError> {
    Ok(resolve_paths_detailed(schema, kind)?.chains)
}

pub fn resolve_paths_detailed(
    schema: &GraphStore,
    kind: RootKind,
) -> Result<PathResolution, FormError> {
    let roots = resolve_roots(schema, kind)?;
    let resolution = match kind {
        RootKind::Field => {
            let mut out = PathResolution::default();
            for (root, result) in roots {
                let key = FieldKey::field(root);
                match result {
                    Ok(chain) => {
                        out.chains.insert(key, chain);
                    }
                    Err(defect) => out.malformed.push((key, defect)),
                }
            }
            out
        }
        RootKind::Generator => generated_fields(schema, &roots),
    };

    for (key, defect) in &resolution.malformed {
        tracing::warn!(field = %key, %defect, "omitting field with malformed path");
    }
    tracing::debug!(
        kind = ?kind,
        resolved = resolution.chains.len(),
        malformed = resolution.malformed.len(),
        "resolved schema paths"
    );
    Ok(resolution)
}

// ============================================================================
// Sub-queries
// ============================================================================

fn iri(value: &str) -> Term {
    Term::iri(value)
}

fn var(name: &str) -> Variable {
    Variable::new(name)
}

/// Patterns binding `?root` for `kind`.
fn root_group(kind: RootKind) -> GroupPattern {
    let root = var("root");
    match kind {
        RootKind::Field => {
            GroupPattern::new().with(TriplePattern::new(&root, iri(RDF_TYPE), iri(FORM_FIELD)))
        }
        RootKind::Generator => {
            let generator = var("generator");
            GroupPattern::new()
                .with(TriplePattern::new(&generator, iri(RDF_TYPE), iri(FORM_GENERATOR)))
                .with(TriplePattern::new(&generator, iri(FORM_SCOPE), &root))
        }
    }
}

/// `OPTIONAL { ?element ?modifier ?target }`
fn modifier_optional() -> GroupPattern {
    GroupPattern::new().with(TriplePattern::new(
        var("element"),
        var("modifier"),
        var("target"),
    ))
}

fn root_path_query(kind: RootKind) -> GroupPattern {
    root_group(kind).with(TriplePattern::new(var("root"), iri(SH_PATH), var("path")))
}

fn head_query(kind: RootKind) -> GroupPattern {
    root_group(kind)
        .with(TriplePattern::new(var("root"), iri(SH_PATH), var("list")))
        .with(TriplePattern::new(var("list"), iri(RDF_FIRST), var("element")))
        .with_optional(modifier_optional())
}

fn tail_query(kind: RootKind) -> GroupPattern {
    root_group(kind)
        .with(TriplePattern::new(var("root"), iri(SH_PATH), var("list")))
        .with(TriplePattern::new(
            var("list"),
            Verb::OneOrMore(iri(RDF_REST)),
            var("cell"),
        ))
        .with(TriplePattern::new(var("previous"), iri(RDF_REST), var("cell")))
        .with(TriplePattern::new(var("cell"), iri(RDF_FIRST), var("element")))
        .with_optional(modifier_optional())
}

fn get<'a>(row: &'a Bindings, name: &str) -> Option<&'a Term> {
    row.get(&Variable::new(name))
}

// ============================================================================
// Step resolution
// ============================================================================

/// A resolved hop plus the list cell it came from (the join key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Step {
    predicate: Term,
    direction: Direction,
    cell: Term,
}

/// Rows grouped per list cell: the element and every `(modifier, target)`
/// found on it.
#[derive(Debug, Default)]
struct CellRows {
    elements: BTreeSet<Term>,
    modifiers: BTreeSet<(Term, Term)>,
}

fn group_rows<'a>(
    rows: &'a [Bindings],
    key: impl Fn(&'a Bindings) -> Option<(&'a Term, &'a Term)>,
) -> BTreeMap<(Term, Term), CellRows> {
    let mut grouped: BTreeMap<(Term, Term), CellRows> = BTreeMap::new();
    for row in rows {
        let (Some((owner, cell)), Some(element)) = (key(row), get(row, "element")) else {
            continue;
        };
        let entry = grouped.entry((owner.clone(), cell.clone())).or_default();
        entry.elements.insert(element.clone());
        if let (Some(m), Some(t)) = (get(row, "modifier"), get(row, "target")) {
            entry.modifiers.insert((m.clone(), t.clone()));
        }
    }
    grouped
}

/// Resolve one list element to a hop. `Err` is fatal; `Ok(Err)` marks the
/// step unresolvable.
fn resolve_element(
    root: &Term,
    cell: &Term,
    rows: &CellRows,
) -> Result<Result<Step, PathDefect>, FormError> {
    let mut elements = rows.elements.iter();
    let (Some(element), None) = (elements.next(), elements.next()) else {
        return Ok(Err(PathDefect::Ambiguous {
            at: cell.to_string(),
        }));
    };

    if element.is_iri() {
        return Ok(Ok(Step {
            predicate: element.clone(),
            direction: Direction::Forward,
            cell: cell.clone(),
        }));
    }
    if !element.is_blank() {
        return Ok(Err(PathDefect::UnresolvableStep {
            step: element.to_string(),
        }));
    }

    if let Some((modifier, _)) = rows.modifiers.iter().find(|(m, _)| !m.is(SH_INVERSE_PATH)) {
        return Err(FormError::UnsupportedModifier {
            modifier: modifier.as_iri().unwrap_or_default().to_string(),
            field: root.to_string(),
        });
    }
    let targets: Vec<&Term> = rows.modifiers.iter().map(|(_, t)| t).collect();
    match targets.as_slice() {
        [target] if target.is_iri() => Ok(Ok(Step {
            predicate: (*target).clone(),
            direction: Direction::Inverse,
            cell: cell.clone(),
        })),
        [_, _, ..] => Ok(Err(PathDefect::Ambiguous {
            at: element.to_string(),
        })),
        _ => Ok(Err(PathDefect::UnresolvableStep {
            step: element.to_string(),
        })),
    }
}

// ============================================================================
// Root resolution
// ============================================================================

type RootResults = BTreeMap<Term, Result<PathChain, PathDefect>>;

fn resolve_roots(schema: &GraphStore, kind: RootKind) -> Result<RootResults, FormError> {
    let path_rows = schema.select(&root_path_query(kind));
    let head_rows = schema.select(&head_query(kind));
    let tail_rows = schema.select(&tail_query(kind));

    // Raw path values per root.
    let mut paths: BTreeMap<Term, BTreeSet<Term>> = BTreeMap::new();
    for row in &path_rows {
        if let (Some(root), Some(path)) = (get(row, "root"), get(row, "path")) {
            paths.entry(root.clone()).or_default().insert(path.clone());
        }
    }

    // first_step[root]
    let mut first_step: BTreeMap<Term, Result<Step, PathDefect>> = BTreeMap::new();
    for ((root, cell), rows) in group_rows(&head_rows, |row| {
        Some((get(row, "root")?, get(row, "list")?))
    }) {
        let step = resolve_element(&root, &cell, &rows)?;
        first_step.insert(root, step);
    }

    // next_step[previous cell]; `broken` records cells whose element failed.
    let mut next_step: BTreeMap<Term, BTreeSet<Step>> = BTreeMap::new();
    let mut broken: BTreeMap<Term, PathDefect> = BTreeMap::new();
    let mut predecessors: BTreeMap<Term, BTreeSet<Term>> = BTreeMap::new();
    for row in &tail_rows {
        if let (Some(previous), Some(cell)) = (get(row, "previous"), get(row, "cell")) {
            predecessors
                .entry(cell.clone())
                .or_default()
                .insert(previous.clone());
        }
    }
    for ((root, cell), rows) in group_rows(&tail_rows, |row| {
        Some((get(row, "root")?, get(row, "cell")?))
    }) {
        match resolve_element(&root, &cell, &rows)? {
            Ok(step) => {
                for previous in predecessors.get(&cell).into_iter().flatten() {
                    next_step
                        .entry(previous.clone())
                        .or_default()
                        .insert(step.clone());
                }
            }
            Err(defect) => {
                broken.insert(cell, defect);
            }
        }
    }

    let mut out = RootResults::new();
    for (root, values) in paths {
        let mut values = values.into_iter();
        let result = match (values.next(), values.next()) {
            (Some(path), None) if path.is_iri() => Ok(PathChain::new(vec![PathStep::forward(path)])),
            (Some(path), None) if path.is_blank() => {
                walk(schema, &root, &first_step, &next_step, &broken)
            }
            (Some(_), None) => Err(PathDefect::NotAPath),
            _ => Err(PathDefect::Ambiguous {
                at: root.to_string(),
            }),
        };
        out.insert(root, result);
    }
    Ok(out)
}

fn walk(
    schema: &GraphStore,
    root: &Term,
    first_step: &BTreeMap<Term, Result<Step, PathDefect>>,
    next_step: &BTreeMap<Term, BTreeSet<Step>>,
    broken: &BTreeMap<Term, PathDefect>,
) -> Result<PathChain, PathDefect> {
    let first = match first_step.get(root) {
        Some(Ok(step)) => step,
        Some(Err(defect)) => return Err(defect.clone()),
        None => return Err(PathDefect::MissingHead),
    };

    let mut visited: BTreeSet<&Term> = BTreeSet::from([&first.cell]);
    let mut steps = vec![PathStep {
        predicate: first.predicate.clone(),
        direction: first.direction,
    }];
    let mut cell = &first.cell;

    while let Some(candidates) = next_step.get(cell) {
        let mut candidates = candidates.iter();
        let (Some(next), None) = (candidates.next(), candidates.next()) else {
            return Err(PathDefect::Ambiguous {
                at: cell.to_string(),
            });
        };
        if !visited.insert(&next.cell) {
            return Err(PathDefect::Cycle);
        }
        steps.push(PathStep {
            predicate: next.predicate.clone(),
            direction: next.direction,
        });
        cell = &next.cell;
    }

    // The walk stopped: the list must end here.
    let rest = Term::iri(RDF_REST);
    if schema.contains(&Triple::new(cell.clone(), rest.clone(), Term::iri(RDF_NIL))) {
        return Ok(PathChain::new(steps));
    }
    let successor = schema.object_of(cell, &rest);
    match successor.as_ref().and_then(|s| broken.get(s)) {
        Some(defect) => Err(defect.clone()),
        None => Err(PathDefect::Unterminated),
    }
}

// ============================================================================
// Generators
// ============================================================================

fn generated_fields(schema: &GraphStore, scopes: &RootResults) -> PathResolution {
    let generator = var("generator");
    let shape = var("shape");
    let predicate = var("predicate");
    let scope = var("scope");
    let query = GroupPattern::new()
        .with(TriplePattern::new(&generator, iri(RDF_TYPE), iri(FORM_GENERATOR)))
        .with(TriplePattern::new(&generator, iri(FORM_PROTOTYPE), var("prototype")))
        .with(TriplePattern::new(var("prototype"), iri(FORM_SHAPE), &shape))
        .with(TriplePattern::new(&shape, &predicate, var("value")))
        .with_optional(GroupPattern::new().with(TriplePattern::new(
            &generator,
            iri(FORM_SCOPE),
            &scope,
        )));

    let mut predicates: BTreeMap<Term, BTreeSet<Term>> = BTreeMap::new();
    let mut declared_scopes: BTreeMap<Term, BTreeSet<Term>> = BTreeMap::new();
    for row in schema.select(&query) {
        let (Some(g), Some(p)) = (row.get(&generator), row.get(&predicate)) else {
            continue;
        };
        predicates.entry(g.clone()).or_default().insert(p.clone());
        let scopes_of = declared_scopes.entry(g.clone()).or_default();
        if let Some(s) = row.get(&scope) {
            scopes_of.insert(s.clone());
        }
    }

    let mut out = PathResolution::default();
    for (g, preds) in predicates {
        let declared = declared_scopes.remove(&g).unwrap_or_default();
        let base: Result<PathChain, PathDefect> = {
            let mut it = declared.iter();
            match (it.next(), it.next()) {
                (None, _) => Ok(PathChain::default()),
                (Some(s), None) => match scopes.get(s) {
                    Some(result) => result.clone(),
                    None => Err(PathDefect::MissingScopePath),
                },
                (Some(_), Some(_)) => Err(PathDefect::Ambiguous { at: g.to_string() }),
            }
        };
        for p in preds {
            let key = FieldKey::generated(g.clone(), p.clone());
            match &base {
                Ok(chain) => {
                    out.chains.insert(key, chain.then(PathStep::forward(p)));
                }
                Err(defect) => out.malformed.push((key, defect.clone())),
            }
        }
    }
    out
}
