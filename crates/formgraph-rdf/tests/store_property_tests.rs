use formgraph_rdf::{GraphStore, GroupPattern, Term, Triple, TriplePattern, Variable, Verb};
use proptest::prelude::*;

fn node(i: usize) -> Term {
    Term::iri(format!("http://ex.org/n{i}"))
}

fn edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((0usize..8, 0usize..8), 0..24)
}

fn store_from(edges: &[(usize, usize)]) -> GraphStore {
    let next = Term::iri("http://ex.org/next");
    edges
        .iter()
        .map(|(a, b)| Triple::new(node(*a), next.clone(), node(*b)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn one_or_more_path_matches_transitive_closure(edges in edges(), start in 0usize..8) {
        let store = store_from(&edges);
        let target = Variable::new("target");
        let group = GroupPattern::new().with(TriplePattern::new(
            node(start),
            Verb::OneOrMore(Term::iri("http://ex.org/next")),
            &target,
        ));
        let via_query: std::collections::BTreeSet<Term> =
            store.select(&group).into_iter().map(|row| row[&target].clone()).collect();

        // Naive fixpoint over the edge list.
        let mut closure = std::collections::BTreeSet::new();
        let mut frontier = vec![start];
        while let Some(n) = frontier.pop() {
            for (a, b) in &edges {
                if *a == n && closure.insert(*b) {
                    frontier.push(*b);
                }
            }
        }
        let expected: std::collections::BTreeSet<Term> = closure.into_iter().map(node).collect();
        prop_assert_eq!(via_query, expected);
    }

    #[test]
    fn delete_where_removes_exactly_what_construct_returns(edges in edges()) {
        let mut store = store_from(&edges);
        let before = store.len();
        let (a, b, c) = (Variable::new("a"), Variable::new("b"), Variable::new("c"));
        let next = Term::iri("http://ex.org/next");
        let template = vec![
            TriplePattern::new(&a, next.clone(), &b),
            TriplePattern::new(&b, next.clone(), &c),
        ];
        let group = GroupPattern::new()
            .with(template[0].clone())
            .with(template[1].clone());
        let constructed = store.construct(&template, &group);
        let removed = store.delete_where(&template, &group);
        prop_assert_eq!(&constructed, &removed);
        prop_assert_eq!(store.len(), before - removed.len());
    }
}
