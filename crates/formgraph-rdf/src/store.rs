//! In-memory, named-graph partitioned triple store.
//!
//! Stores are scratch spaces: built for one operation, queried, discarded.
//! Nothing here is shared across threads or invocations.

use std::collections::{BTreeMap, BTreeSet};

use crate::pattern::{self, Bindings, GroupPattern, TriplePattern};
use crate::term::{GraphName, Term, Triple};

static EMPTY: BTreeSet<Triple> = BTreeSet::new();

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStore {
    graphs: BTreeMap<GraphName, BTreeSet<Triple>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    pub fn insert(&mut self, triple: Triple) -> bool {
        self.insert_in(&None, triple)
    }

    pub fn insert_in(&mut self, graph: &GraphName, triple: Triple) -> bool {
        self.graphs.entry(graph.clone()).or_default().insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.remove_in(&None, triple)
    }

    pub fn remove_in(&mut self, graph: &GraphName, triple: &Triple) -> bool {
        let Some(set) = self.graphs.get_mut(graph) else {
            return false;
        };
        let removed = set.remove(triple);
        if set.is_empty() {
            self.graphs.remove(graph);
        }
        removed
    }

    /// Remove every triple of `graph` matching the (s, p, o) pattern, where
    /// `None` is a wildcard. Returns the number removed.
    pub fn remove_matching_in(
        &mut self,
        graph: &GraphName,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
    ) -> usize {
        let doomed = self.matching_in(graph, subject, predicate, object);
        for triple in &doomed {
            self.remove_in(graph, triple);
        }
        doomed.len()
    }

    pub fn remove_matching(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
    ) -> usize {
        self.remove_matching_in(&None, subject, predicate, object)
    }

    /// Copy every triple of `other` (all graphs) into `graph`, prefixing each
    /// blank-node id with `scope`. Independently parsed documents may reuse
    /// the same generated ids; scoping keeps their blank nodes apart.
    pub fn extend_relabeled(&mut self, other: &GraphStore, graph: &GraphName, scope: &str) {
        let relabel = |term: &Term| match term {
            Term::BlankNode { id } => Term::blank(format!("{scope}{id}")),
            other => other.clone(),
        };
        for triple in other.triples() {
            self.insert_in(
                graph,
                Triple::new(
                    relabel(&triple.subject),
                    triple.predicate.clone(),
                    relabel(&triple.object),
                ),
            );
        }
    }

    /// Detach `graph` into a new store whose default graph holds its triples.
    pub fn take_graph(&mut self, graph: &GraphName) -> GraphStore {
        let mut out = GraphStore::new();
        if let Some(set) = self.graphs.remove(graph) {
            out.graphs.insert(None, set);
        }
        out
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn contains(&self, triple: &Triple) -> bool {
        self.contains_in(&None, triple)
    }

    pub fn contains_in(&self, graph: &GraphName, triple: &Triple) -> bool {
        self.graph(graph).contains(triple)
    }

    /// Triples of every graph, graph by graph.
    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.graphs.values().flatten()
    }

    pub fn triples_in(&self, graph: &GraphName) -> impl Iterator<Item = &Triple> {
        self.graph(graph).iter()
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &GraphName> {
        self.graphs.keys()
    }

    pub fn len(&self) -> usize {
        self.graphs.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    pub fn matching_in(
        &self,
        graph: &GraphName,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        self.graph(graph)
            .iter()
            .filter(|t| {
                subject.map_or(true, |s| s == &t.subject)
                    && predicate.map_or(true, |p| p == &t.predicate)
                    && object.map_or(true, |o| o == &t.object)
            })
            .cloned()
            .collect()
    }

    pub fn matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        self.matching_in(&None, subject, predicate, object)
    }

    /// First object of `(subject, predicate, ?)` in the default graph.
    pub fn object_of(&self, subject: &Term, predicate: &Term) -> Option<Term> {
        self.graph(&None)
            .iter()
            .find(|t| &t.subject == subject && &t.predicate == predicate)
            .map(|t| t.object.clone())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn select(&self, group: &GroupPattern) -> Vec<Bindings> {
        self.select_in(&None, group)
    }

    pub fn select_in(&self, graph: &GraphName, group: &GroupPattern) -> Vec<Bindings> {
        pattern::evaluate(self.graph(graph), group, &Bindings::new())
    }

    /// `CONSTRUCT { template } WHERE { group }` over the default graph.
    pub fn construct(&self, template: &[TriplePattern], group: &GroupPattern) -> BTreeSet<Triple> {
        pattern::instantiate_template(template, &self.select(group))
    }

    /// `DELETE { template } WHERE { group }` over the default graph.
    /// Returns the triples actually removed.
    pub fn delete_where(
        &mut self,
        template: &[TriplePattern],
        group: &GroupPattern,
    ) -> BTreeSet<Triple> {
        let doomed = self.construct(template, group);
        doomed
            .into_iter()
            .filter(|t| self.remove(t))
            .collect()
    }

    fn graph(&self, graph: &GraphName) -> &BTreeSet<Triple> {
        self.graphs.get(graph).unwrap_or(&EMPTY)
    }
}

impl FromIterator<Triple> for GraphStore {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = GraphStore::new();
        for triple in iter {
            store.insert(triple);
        }
        store
    }
}

impl Extend<Triple> for GraphStore {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}
