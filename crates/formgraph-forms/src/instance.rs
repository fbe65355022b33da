//! Reading field values out of an already-fetched instance.

use std::collections::{BTreeMap, BTreeSet};

use formgraph_rdf::{vocab::RDF_TYPE, GraphStore, Term};

use crate::path::{Direction, FieldKey, PathChain, PathMap};
use crate::vocab::MU_UUID;

fn is_addressable(data: &GraphStore, node: &Term) -> bool {
    data.object_of(node, &Term::iri(MU_UUID)).is_some()
        && data.object_of(node, &Term::iri(RDF_TYPE)).is_some()
}

/// Nodes reached from `root` along `chain`. Intermediate nodes must carry an
/// identifier and a type, the same guards the synthesized query applies.
pub fn follow_chain(data: &GraphStore, root: &Term, chain: &PathChain) -> BTreeSet<Term> {
    let mut frontier = BTreeSet::from([root.clone()]);
    let last = chain.len().saturating_sub(1);
    for (hop, step) in chain.steps().iter().enumerate() {
        let mut next = BTreeSet::new();
        for node in &frontier {
            let reached = match step.direction {
                Direction::Forward => data
                    .matching(Some(node), Some(&step.predicate), None)
                    .into_iter()
                    .map(|t| t.object)
                    .collect::<Vec<_>>(),
                Direction::Inverse => data
                    .matching(None, Some(&step.predicate), Some(node))
                    .into_iter()
                    .map(|t| t.subject)
                    .collect(),
            };
            next.extend(reached);
        }
        if hop < last {
            next.retain(|n| is_addressable(data, n));
        }
        frontier = next;
        if frontier.is_empty() {
            break;
        }
    }
    frontier
}

/// Values of every field in `chains` for the instance `root`. Fields without
/// values are present with an empty list.
pub fn field_values(
    data: &GraphStore,
    root: &Term,
    chains: &PathMap,
) -> BTreeMap<FieldKey, Vec<Term>> {
    chains
        .iter()
        .map(|(key, chain)| {
            let values = if chain.is_empty() {
                Vec::new()
            } else {
                follow_chain(data, root, chain).into_iter().collect()
            };
            (key.clone(), values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathStep;
    use formgraph_rdf::parse_turtle;

    const DATA: &str = r#"
@prefix ex: <http://ex.org/> .
@prefix mu: <http://mu.semte.ch/vocabularies/core/> .

ex:doc ex:title "Minutes" .
ex:act ex:generated ex:doc ; mu:uuid "1" ; a ex:Activity ; ex:subject ex:topic .
ex:loose ex:generated ex:doc ; ex:subject ex:ignored .
"#;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://ex.org/{local}"))
    }

    #[test]
    fn values_follow_forward_and_inverse_hops() {
        let data = parse_turtle(DATA).unwrap();
        let mut chains = PathMap::new();
        chains.insert(
            FieldKey::field(ex("f-title")),
            PathChain::new(vec![PathStep::forward(ex("title"))]),
        );
        chains.insert(
            FieldKey::field(ex("f-subject")),
            PathChain::new(vec![PathStep::inverse(ex("generated")), PathStep::forward(ex("subject"))]),
        );
        chains.insert(
            FieldKey::field(ex("f-missing")),
            PathChain::new(vec![PathStep::forward(ex("nothing"))]),
        );

        let values = field_values(&data, &ex("doc"), &chains);
        assert_eq!(values[&FieldKey::field(ex("f-title"))], vec![Term::literal("Minutes")]);
        assert_eq!(values[&FieldKey::field(ex("f-subject"))], vec![ex("topic")]);
        assert!(values[&FieldKey::field(ex("f-missing"))].is_empty());
    }
}
