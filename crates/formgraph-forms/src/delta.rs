//! Snapshot diffing: two documents → minimal update statement.
//!
//! Blank-node ids are not canonicalized across independently parsed
//! documents. Each snapshot's blank nodes are scoped (`old_` / `new_`), so any
//! triple touching a blank node shows up as both removed and added, even when
//! logically unchanged. That is a known limitation of diffing by structural
//! equality, not something patched over with isomorphism matching here.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use formgraph_rdf::{
    parse_document, render::render_template, GraphStore, GroupPattern, PatternTerm, RdfFormat,
    Term, Triple, TriplePattern, Variable,
};
use serde::Serialize;

use crate::error::FormError;

const OLD_SCOPE: &str = "old_";
const NEW_SCOPE: &str = "new_";

/// The add/remove triple sets transforming one snapshot into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub removed: BTreeSet<Triple>,
    pub added: BTreeSet<Triple>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeltaOutcome {
    /// Nothing changed; no write should be performed.
    NoOp,
    Update { delta: Delta, statement: String },
}

impl DeltaOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, DeltaOutcome::NoOp)
    }

    pub fn statement(&self) -> Option<&str> {
        match self {
            DeltaOutcome::NoOp => None,
            DeltaOutcome::Update { statement, .. } => Some(statement),
        }
    }
}

/// `?name` for a blank node, restricted to characters valid in a SPARQL
/// variable name.
fn blank_variable(id: &str) -> Variable {
    let name: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    Variable::new(format!("b_{name}"))
}

fn to_pattern_term(term: &Term) -> PatternTerm {
    match term {
        Term::BlankNode { id } => PatternTerm::Var(blank_variable(id)),
        other => PatternTerm::Term(other.clone()),
    }
}

/// Removal patterns for triples touching blank nodes: each blank node becomes
/// a variable, so the statement matches whatever nodes the target store holds.
fn blank_removal_patterns<'a>(triples: impl Iterator<Item = &'a Triple>) -> Vec<TriplePattern> {
    triples
        .map(|t| {
            TriplePattern::new(
                to_pattern_term(&t.subject),
                t.predicate.clone(),
                to_pattern_term(&t.object),
            )
        })
        .collect()
}

fn write_graph_block(out: &mut String, graph: &Term, body: &str) {
    let _ = write!(out, "{{\n  GRAPH {graph} {{\n{body}  }}\n}}");
}

fn triple_lines<'a>(triples: impl Iterator<Item = &'a Triple>) -> String {
    let mut out = String::new();
    for triple in triples {
        let _ = writeln!(out, "    {triple}");
    }
    out
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    fn ground_removals(&self) -> impl Iterator<Item = &Triple> {
        self.removed.iter().filter(|t| !t.has_blank_node())
    }

    fn blank_removals(&self) -> impl Iterator<Item = &Triple> {
        self.removed.iter().filter(|t| t.has_blank_node())
    }

    /// Render the update, scoped to `graph`. Statements are separated by
    /// `;` so the whole text can be submitted as one request.
    pub fn to_update(&self, graph: &Term) -> String {
        let mut statements = Vec::new();

        if self.ground_removals().next().is_some() {
            let mut s = String::from("DELETE DATA ");
            write_graph_block(&mut s, graph, &triple_lines(self.ground_removals()));
            statements.push(s);
        }

        let patterns = blank_removal_patterns(self.blank_removals());
        if !patterns.is_empty() {
            let body = render_template(&patterns, 2);
            let mut s = String::from("DELETE ");
            write_graph_block(&mut s, graph, &body);
            s.push_str("\nWHERE ");
            write_graph_block(&mut s, graph, &body);
            statements.push(s);
        }

        if !self.added.is_empty() {
            let mut s = String::from("INSERT DATA ");
            write_graph_block(&mut s, graph, &triple_lines(self.added.iter()));
            statements.push(s);
        }

        statements.join(" ;\n")
    }

    /// Apply the patch to `store`'s default graph, with the same matching the
    /// rendered update performs against the target graph.
    pub fn apply(&self, store: &mut GraphStore) {
        for triple in self.ground_removals() {
            store.remove(triple);
        }
        let patterns = blank_removal_patterns(self.blank_removals());
        if !patterns.is_empty() {
            let group = patterns
                .iter()
                .cloned()
                .fold(GroupPattern::new(), GroupPattern::with);
            store.delete_where(&patterns, &group);
        }
        store.extend(self.added.iter().cloned());
    }
}

/// Set difference in both directions, by structural triple equality.
pub fn diff_stores(old: &GraphStore, new: &GraphStore) -> Delta {
    let old: BTreeSet<&Triple> = old.triples().collect();
    let new: BTreeSet<&Triple> = new.triples().collect();
    Delta {
        removed: old.difference(&new).map(|t| (*t).clone()).collect(),
        added: new.difference(&old).map(|t| (*t).clone()).collect(),
    }
}

fn scoped(text: &str, format: RdfFormat, scope: &str) -> Result<GraphStore, FormError> {
    let parsed = parse_document(text, format)?;
    let mut store = GraphStore::new();
    store.extend_relabeled(&parsed, &None, scope);
    Ok(store)
}

/// Diff two snapshot texts into an update against `target_graph`.
///
/// Identical texts are a no-op without parsing further; otherwise both are
/// parsed (either failing is an error) and diffed.
pub fn compute_delta(
    old_text: &str,
    new_text: &str,
    format: RdfFormat,
    target_graph: &Term,
) -> Result<DeltaOutcome, FormError> {
    if old_text == new_text {
        parse_document(old_text, format)?;
        tracing::debug!("snapshots are identical");
        return Ok(DeltaOutcome::NoOp);
    }

    let old = scoped(old_text, format, OLD_SCOPE)?;
    let new = scoped(new_text, format, NEW_SCOPE)?;
    let delta = diff_stores(&old, &new);
    tracing::debug!(
        removed = delta.removed.len(),
        added = delta.added.len(),
        "computed snapshot delta"
    );

    if delta.is_empty() {
        return Ok(DeltaOutcome::NoOp);
    }
    let statement = delta.to_update(target_graph);
    Ok(DeltaOutcome::Update { delta, statement })
}
