//! Pattern-matching query algebra.
//!
//! This is the subset of SPARQL the form core needs:
//!
//! - basic graph patterns (conjunctions of triple patterns),
//! - nested `OPTIONAL` groups (left joins),
//! - one-or-more predicate paths (`p+`),
//! - `CONSTRUCT` / `DELETE` templates instantiated over solution rows.
//!
//! The same values are evaluated in memory (`GraphStore::select`) and rendered
//! as SPARQL text (see `render`) for remote stores, so both sides always see
//! the identical pattern set.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::term::{Term, Triple};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Solution row: variable → bound term.
pub type Bindings = BTreeMap<Variable, Term>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternTerm {
    Var(Variable),
    Term(Term),
}

impl From<Term> for PatternTerm {
    fn from(value: Term) -> Self {
        PatternTerm::Term(value)
    }
}

impl From<Variable> for PatternTerm {
    fn from(value: Variable) -> Self {
        PatternTerm::Var(value)
    }
}

impl From<&Variable> for PatternTerm {
    fn from(value: &Variable) -> Self {
        PatternTerm::Var(value.clone())
    }
}

/// Predicate position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Term(Term),
    Var(Variable),
    /// `<iri>+`: one or more hops along the same predicate.
    OneOrMore(Term),
}

impl From<Term> for Verb {
    fn from(value: Term) -> Self {
        Verb::Term(value)
    }
}

impl From<Variable> for Verb {
    fn from(value: Variable) -> Self {
        Verb::Var(value)
    }
}

impl From<&Variable> for Verb {
    fn from(value: &Variable) -> Self {
        Verb::Var(value.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub verb: Verb,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        verb: impl Into<Verb>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            verb: verb.into(),
            object: object.into(),
        }
    }

    /// Ground the pattern under `row`. Returns `None` if a variable is unbound,
    /// the verb is a path, or the result would not be a valid triple.
    pub fn instantiate(&self, row: &Bindings) -> Option<Triple> {
        let subject = resolve(&self.subject, row)?;
        let predicate = match &self.verb {
            Verb::Term(t) => t.clone(),
            Verb::Var(v) => row.get(v)?.clone(),
            Verb::OneOrMore(_) => return None,
        };
        let object = resolve(&self.object, row)?;
        let triple = Triple::new(subject, predicate, object);
        triple.is_valid().then_some(triple)
    }
}

/// A group graph pattern: required triple patterns followed by optional
/// sub-groups, each left-joined in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupPattern {
    pub patterns: Vec<TriplePattern>,
    pub optionals: Vec<GroupPattern>,
}

impl GroupPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pattern: TriplePattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn with_optional(mut self, group: GroupPattern) -> Self {
        self.optionals.push(group);
        self
    }

    pub fn push(&mut self, pattern: TriplePattern) {
        self.patterns.push(pattern);
    }

    pub fn push_optional(&mut self, group: GroupPattern) {
        self.optionals.push(group);
    }

    /// Every triple pattern in the group, depth-first, required before optional.
    pub fn all_patterns(&self) -> Vec<&TriplePattern> {
        let mut out: Vec<&TriplePattern> = self.patterns.iter().collect();
        for group in &self.optionals {
            out.extend(group.all_patterns());
        }
        out
    }
}

fn resolve(term: &PatternTerm, row: &Bindings) -> Option<Term> {
    match term {
        PatternTerm::Term(t) => Some(t.clone()),
        PatternTerm::Var(v) => row.get(v).cloned(),
    }
}

fn bound<'a>(term: &'a PatternTerm, row: &'a Bindings) -> Option<&'a Term> {
    match term {
        PatternTerm::Term(t) => Some(t),
        PatternTerm::Var(v) => row.get(v),
    }
}

/// Bind `term` to `value` in `row`; false on a conflicting earlier binding.
fn unify(row: &mut Bindings, term: &PatternTerm, value: &Term) -> bool {
    match term {
        PatternTerm::Term(t) => t == value,
        PatternTerm::Var(v) => match row.get(v) {
            Some(existing) => existing == value,
            None => {
                row.insert(v.clone(), value.clone());
                true
            }
        },
    }
}

pub(crate) fn evaluate(
    triples: &BTreeSet<Triple>,
    group: &GroupPattern,
    seed: &Bindings,
) -> Vec<Bindings> {
    let mut rows = vec![seed.clone()];
    for pattern in &group.patterns {
        let mut next = Vec::new();
        for row in &rows {
            match &pattern.verb {
                Verb::OneOrMore(predicate) => {
                    extend_path(triples, pattern, predicate, row, &mut next)
                }
                _ => extend_simple(triples, pattern, row, &mut next),
            }
        }
        rows = next;
        if rows.is_empty() {
            return rows;
        }
    }

    for optional in &group.optionals {
        let mut next = Vec::with_capacity(rows.len());
        for row in rows {
            let extended = evaluate(triples, optional, &row);
            if extended.is_empty() {
                next.push(row);
            } else {
                next.extend(extended);
            }
        }
        rows = next;
    }
    rows
}

fn extend_simple(
    triples: &BTreeSet<Triple>,
    pattern: &TriplePattern,
    row: &Bindings,
    out: &mut Vec<Bindings>,
) {
    let subject = bound(&pattern.subject, row);
    let predicate = match &pattern.verb {
        Verb::Term(t) => Some(t),
        Verb::Var(v) => row.get(v),
        Verb::OneOrMore(_) => return,
    };
    let object = bound(&pattern.object, row);

    for triple in triples {
        if subject.is_some_and(|s| s != &triple.subject)
            || predicate.is_some_and(|p| p != &triple.predicate)
            || object.is_some_and(|o| o != &triple.object)
        {
            continue;
        }
        let mut candidate = row.clone();
        let verb_ok = match &pattern.verb {
            Verb::Var(v) => unify(&mut candidate, &PatternTerm::Var(v.clone()), &triple.predicate),
            _ => true,
        };
        if verb_ok
            && unify(&mut candidate, &pattern.subject, &triple.subject)
            && unify(&mut candidate, &pattern.object, &triple.object)
        {
            out.push(candidate);
        }
    }
}

fn extend_path(
    triples: &BTreeSet<Triple>,
    pattern: &TriplePattern,
    predicate: &Term,
    row: &Bindings,
    out: &mut Vec<Bindings>,
) {
    let starts: BTreeSet<Term> = match bound(&pattern.subject, row) {
        Some(s) => BTreeSet::from([s.clone()]),
        None => triples
            .iter()
            .filter(|t| &t.predicate == predicate)
            .map(|t| t.subject.clone())
            .collect(),
    };

    for start in starts {
        for reached in reachable(triples, &start, predicate) {
            let mut candidate = row.clone();
            if unify(&mut candidate, &pattern.subject, &start)
                && unify(&mut candidate, &pattern.object, &reached)
            {
                out.push(candidate);
            }
        }
    }
}

/// Nodes reachable from `start` in one or more `predicate` hops. Terminates on
/// cyclic data; `start` itself is included only if a cycle leads back to it.
pub(crate) fn reachable(
    triples: &BTreeSet<Triple>,
    start: &Term,
    predicate: &Term,
) -> BTreeSet<Term> {
    let mut seen: BTreeSet<Term> = BTreeSet::new();
    let mut queue: VecDeque<Term> = VecDeque::from([start.clone()]);
    while let Some(node) = queue.pop_front() {
        for t in triples
            .iter()
            .filter(|t| t.subject == node && &t.predicate == predicate)
        {
            if seen.insert(t.object.clone()) {
                queue.push_back(t.object.clone());
            }
        }
    }
    seen
}

/// Instantiate a template over solution rows (SPARQL `CONSTRUCT` semantics).
pub fn instantiate_template(template: &[TriplePattern], rows: &[Bindings]) -> BTreeSet<Triple> {
    rows.iter()
        .flat_map(|row| template.iter().filter_map(move |p| p.instantiate(row)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://ex.org/{s}"))
    }

    fn data() -> BTreeSet<Triple> {
        BTreeSet::from([
            Triple::new(iri("a"), iri("next"), iri("b")),
            Triple::new(iri("b"), iri("next"), iri("c")),
            Triple::new(iri("c"), iri("next"), iri("a")),
            Triple::new(iri("a"), iri("label"), Term::literal("A")),
            Triple::new(iri("b"), iri("label"), Term::literal("B")),
        ])
    }

    #[test]
    fn joins_patterns_on_shared_variables() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let label = Variable::new("label");
        let group = GroupPattern::new()
            .with(TriplePattern::new(&x, iri("next"), &y))
            .with(TriplePattern::new(&y, iri("label"), &label));
        let rows = evaluate(&data(), &group, &Bindings::new());
        let labels: BTreeSet<Term> = rows.iter().map(|r| r[&label].clone()).collect();
        // c -> a and a -> b match; b -> c does not (c has no label).
        assert_eq!(labels, BTreeSet::from([Term::literal("A"), Term::literal("B")]));
    }

    #[test]
    fn optional_keeps_rows_without_a_match() {
        let x = Variable::new("x");
        let label = Variable::new("label");
        let group = GroupPattern::new()
            .with(TriplePattern::new(&x, iri("next"), Variable::new("y")))
            .with_optional(GroupPattern::new().with(TriplePattern::new(&x, iri("label"), &label)));
        let rows = evaluate(&data(), &group, &Bindings::new());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().filter(|r| r.contains_key(&label)).count(), 2);
    }

    #[test]
    fn one_or_more_terminates_on_cycles() {
        let reached = reachable(&data(), &iri("a"), &iri("next"));
        assert_eq!(reached, BTreeSet::from([iri("a"), iri("b"), iri("c")]));
    }

    #[test]
    fn repeated_variable_must_bind_consistently() {
        let triples = BTreeSet::from([
            Triple::new(iri("a"), iri("same"), iri("a")),
            Triple::new(iri("a"), iri("same"), iri("b")),
        ]);
        let x = Variable::new("x");
        let group = GroupPattern::new().with(TriplePattern::new(&x, iri("same"), &x));
        let rows = evaluate(&triples, &group, &Bindings::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][&x], iri("a"));
    }

    #[test]
    fn template_skips_rows_with_unbound_variables() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let template = [TriplePattern::new(&x, iri("p"), &y)];
        let mut full = Bindings::new();
        full.insert(x.clone(), iri("s"));
        full.insert(y.clone(), iri("o"));
        let mut partial = Bindings::new();
        partial.insert(x, iri("t"));
        let out = instantiate_template(&template, &[full, partial]);
        assert_eq!(out, BTreeSet::from([Triple::new(iri("s"), iri("p"), iri("o"))]));
    }
}
