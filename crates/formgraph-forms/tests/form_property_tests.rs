//! Property tests for the form core.
//!
//! 1. Modifier-free list paths resolve to all-forward chains in list order
//! 2. A single inverse step is reported at its own position
//! 3. Extraction and deletion select the same triples
//! 4. Diffing a snapshot against itself is a no-op
//! 5. Applying a delta reaches the new snapshot's ground triples

use std::collections::BTreeSet;

use formgraph_forms::{
    build_query, compute_delta, resolve_paths, DeltaOutcome, Direction, FieldKey, PathChain,
    PathStep, QueryMode, RootKind,
};
use formgraph_rdf::{parse_document, parse_turtle, GraphStore, RdfFormat, Term, Triple};
use proptest::prelude::*;

const PREFIXES: &str = "@prefix form: <http://lblod.data.gift/vocabularies/forms/> .\n\
@prefix sh: <http://www.w3.org/ns/shacl#> .\n\
@prefix ex: <http://ex.org/> .\n";

fn ex(local: impl std::fmt::Display) -> Term {
    Term::iri(format!("http://ex.org/{local}"))
}

fn field_key() -> FieldKey {
    FieldKey::field(ex("field"))
}

/// `ex:field` with a list path over `ex:p{i}`, inverse where flagged.
fn schema_with_list(steps: &[(usize, bool)]) -> GraphStore {
    let elements: Vec<String> = steps
        .iter()
        .map(|(p, inverse)| {
            if *inverse {
                format!("[ sh:inversePath ex:p{p} ]")
            } else {
                format!("ex:p{p}")
            }
        })
        .collect();
    let text = format!(
        "{PREFIXES}ex:field a form:Field ; sh:path ( {} ) .\n",
        elements.join(" ")
    );
    parse_turtle(&text).expect("generated schema parses")
}

// ============================================================================
// Strategies
// ============================================================================

fn predicates() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0usize..6, 1..6)
}

fn edges() -> impl Strategy<Value = Vec<(usize, usize, usize)>> {
    proptest::collection::vec((0usize..6, 0usize..3, 0usize..6), 0..30)
}

/// Ground N-Triples snapshots over a small vocabulary, so that two draws
/// overlap often.
fn snapshot() -> impl Strategy<Value = String> {
    proptest::collection::vec((0usize..4, 0usize..3, 0usize..4, any::<bool>()), 0..12).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(s, p, o, literal)| {
                    let object = if literal {
                        format!("\"v{o}\"")
                    } else {
                        format!("<http://ex.org/n{o}>")
                    };
                    format!("<http://ex.org/n{s}> <http://ex.org/p{p}> {object} .\n")
                })
                .collect()
        },
    )
}

fn ground(store: &GraphStore) -> BTreeSet<Triple> {
    store.triples().filter(|t| !t.has_blank_node()).cloned().collect()
}

// ============================================================================
// Path resolution
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn forward_lists_resolve_in_declared_order(preds in predicates()) {
        let steps: Vec<(usize, bool)> = preds.iter().map(|p| (*p, false)).collect();
        let chains = resolve_paths(&schema_with_list(&steps), RootKind::Field).unwrap();
        let expected: Vec<PathStep> = preds.iter().map(|p| PathStep::forward(ex(format!("p{p}")))).collect();
        prop_assert_eq!(chains.get(&field_key()), Some(&PathChain::new(expected)));
    }

    #[test]
    fn single_inverse_step_keeps_its_position(preds in predicates(), k in 0usize..6) {
        let k = k % preds.len();
        let steps: Vec<(usize, bool)> = preds.iter().enumerate().map(|(i, p)| (*p, i == k)).collect();
        let chains = resolve_paths(&schema_with_list(&steps), RootKind::Field).unwrap();
        let chain = chains.get(&field_key()).cloned().unwrap_or_default();
        prop_assert_eq!(chain.len(), preds.len());
        for (i, step) in chain.steps().iter().enumerate() {
            let expected = if i == k { Direction::Inverse } else { Direction::Forward };
            prop_assert_eq!(step.direction, expected);
            prop_assert_eq!(&step.predicate, &ex(format!("p{}", preds[i])));
        }
    }
}

// ============================================================================
// Query synthesis
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn extract_and_delete_agree(edges in edges(), guarded in proptest::collection::vec(any::<bool>(), 6)) {
        let mut data = GraphStore::new();
        data.insert(Triple::new(ex("n0"), Term::iri(formgraph_rdf::vocab::RDF_TYPE), ex("Doc")));
        for (s, p, o) in &edges {
            data.insert(Triple::new(ex(format!("n{s}")), ex(format!("p{p}")), ex(format!("n{o}"))));
        }
        for (n, guard) in guarded.iter().enumerate() {
            if *guard {
                data.insert(Triple::new(ex(format!("n{n}")), Term::iri("http://mu.semte.ch/vocabularies/core/uuid"), Term::literal(format!("{n}"))));
                data.insert(Triple::new(ex(format!("n{n}")), Term::iri(formgraph_rdf::vocab::RDF_TYPE), ex("Thing")));
            }
        }

        let mut chains = formgraph_forms::PathMap::new();
        chains.insert(FieldKey::field(ex("a")), PathChain::new(vec![PathStep::forward(ex("p0"))]));
        chains.insert(
            FieldKey::field(ex("b")),
            PathChain::new(vec![PathStep::inverse(ex("p1")), PathStep::forward(ex("p2"))]),
        );

        let extract = build_query(&chains, ex("n0"), &ex("Doc"), QueryMode::Extract);
        let delete = build_query(&chains, ex("n0"), &ex("Doc"), QueryMode::Delete);
        let selected = extract.matched(&data);
        let before = data.len();
        let removed = delete.execute(&mut data);
        prop_assert_eq!(&selected, &removed);
        prop_assert_eq!(data.len(), before - removed.len());
    }
}

// ============================================================================
// Deltas
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn self_delta_is_noop(a in snapshot()) {
        let graph = Term::iri("http://ex.org/graph");
        let outcome = compute_delta(&a, &a, RdfFormat::NTriples, &graph).unwrap();
        prop_assert_eq!(outcome, DeltaOutcome::NoOp);
    }

    #[test]
    fn applying_delta_reaches_new_snapshot(a in snapshot(), b in snapshot()) {
        let graph = Term::iri("http://ex.org/graph");
        let mut store = parse_document(&a, RdfFormat::NTriples).unwrap();
        let target = parse_document(&b, RdfFormat::NTriples).unwrap();
        match compute_delta(&a, &b, RdfFormat::NTriples, &graph).unwrap() {
            DeltaOutcome::NoOp => prop_assert_eq!(ground(&store), ground(&target)),
            DeltaOutcome::Update { delta, statement } => {
                prop_assert!(!statement.is_empty());
                delta.apply(&mut store);
                prop_assert_eq!(ground(&store), ground(&target));
            }
        }
    }
}
