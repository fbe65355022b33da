//! Query synthesis: resolved path chains → extraction / deletion statement.
//!
//! Body shape (identical for both modes):
//!
//! ```text
//! <root> a <type> .
//! OPTIONAL {
//!   OPTIONAL { <root> dct:modified ?modified . }
//!   OPTIONAL { <field 0 hops + guards> }
//!   OPTIONAL { <field 1 hops + guards> }
//!   ...
//! }
//! ```
//!
//! Every intermediate node of a multi-hop chain must carry `mu:uuid` and
//! `rdf:type` (the guards). The head template is exactly the set of triple
//! patterns in the body, so `CONSTRUCT` and `DELETE` select the same triples.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use formgraph_rdf::{
    render::render_template, vocab::RDF_TYPE, GraphStore, GroupPattern, PatternTerm, Term, Triple,
    TriplePattern, Variable,
};

use crate::path::{Direction, PathChain, PathMap};
use crate::vocab::{DCT_MODIFIED, MU_UUID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Extract,
    Delete,
}

/// The entity the query is anchored on: one instance, or every instance of
/// the target type through a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRoot {
    Iri(Term),
    Var(Variable),
}

impl QueryRoot {
    fn pattern_term(&self) -> PatternTerm {
        match self {
            QueryRoot::Iri(t) => PatternTerm::Term(t.clone()),
            QueryRoot::Var(v) => PatternTerm::Var(v.clone()),
        }
    }
}

impl From<Term> for QueryRoot {
    fn from(value: Term) -> Self {
        QueryRoot::Iri(value)
    }
}

impl From<Variable> for QueryRoot {
    fn from(value: Variable) -> Self {
        QueryRoot::Var(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormQuery {
    pub mode: QueryMode,
    pub template: Vec<TriplePattern>,
    pub body: GroupPattern,
}

impl FormQuery {
    pub fn to_sparql(&self) -> String {
        let head = match self.mode {
            QueryMode::Extract => "CONSTRUCT",
            QueryMode::Delete => "DELETE",
        };
        let mut out = String::new();
        let _ = write!(
            out,
            "{head} {{\n{}}}\nWHERE {}\n",
            render_template(&self.template, 1),
            self.body
        );
        out
    }

    /// Triples the statement selects in `data`, without modifying it.
    pub fn matched(&self, data: &GraphStore) -> BTreeSet<Triple> {
        data.construct(&self.template, &self.body)
    }

    /// Run the statement in memory. Extraction returns the constructed
    /// triples; deletion removes them from `data` and returns what it removed.
    pub fn execute(&self, data: &mut GraphStore) -> BTreeSet<Triple> {
        match self.mode {
            QueryMode::Extract => self.matched(data),
            QueryMode::Delete => data.delete_where(&self.template, &self.body),
        }
    }
}

impl std::fmt::Display for FormQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sparql())
    }
}

/// Triple patterns for one chain, hop by hop, with the identifier/type guards
/// on every intermediate node.
fn chain_patterns(chain: &PathChain, root: &PatternTerm, field_index: usize) -> GroupPattern {
    let node = |hop: usize| -> PatternTerm {
        if hop == 0 {
            root.clone()
        } else {
            PatternTerm::Var(Variable::new(format!("field{field_index}_node{hop}")))
        }
    };

    let mut group = GroupPattern::new();
    let last = chain.len().saturating_sub(1);
    for (hop, step) in chain.steps().iter().enumerate() {
        let (from, to) = (node(hop), node(hop + 1));
        let pattern = match step.direction {
            Direction::Forward => TriplePattern::new(from, step.predicate.clone(), to.clone()),
            Direction::Inverse => TriplePattern::new(to.clone(), step.predicate.clone(), from),
        };
        group.push(pattern);

        if hop < last {
            let prefix = format!("field{field_index}_node{}", hop + 1);
            group.push(TriplePattern::new(
                to.clone(),
                Term::iri(MU_UUID),
                Variable::new(format!("{prefix}_uuid")),
            ));
            group.push(TriplePattern::new(
                to,
                Term::iri(RDF_TYPE),
                Variable::new(format!("{prefix}_type")),
            ));
        }
    }
    group
}

/// Build the extraction or deletion statement for `root` under `chains`.
/// Fields with empty chains contribute nothing.
pub fn build_query(
    chains: &PathMap,
    root: impl Into<QueryRoot>,
    target_type: &Term,
    mode: QueryMode,
) -> FormQuery {
    let root = root.into().pattern_term();

    let mut fields = GroupPattern::new().with_optional(GroupPattern::new().with(
        TriplePattern::new(
            root.clone(),
            Term::iri(DCT_MODIFIED),
            Variable::new("modified"),
        ),
    ));
    for (index, chain) in chains.values().filter(|c| !c.is_empty()).enumerate() {
        fields.push_optional(chain_patterns(chain, &root, index));
    }

    let body = GroupPattern::new()
        .with(TriplePattern::new(
            root,
            Term::iri(RDF_TYPE),
            target_type.clone(),
        ))
        .with_optional(fields);
    let template = body.all_patterns().into_iter().cloned().collect();

    tracing::debug!(fields = chains.len(), mode = ?mode, "built form query");
    FormQuery {
        mode,
        template,
        body,
    }
}
