//! Extension schemas: folding an extension into its base form.
//!
//! Both inputs are loaded into one scratch store under the configured merge
//! graph, rewritten in place, and detached as the merged schema. The result
//! shares nothing with either input.

use formgraph_rdf::{parse_document, vocab::RDF_TYPE, GraphName, GraphStore, RdfFormat, Term, Triple};

use crate::config::FormsConfig;
use crate::error::FormError;
use crate::vocab::{
    EXT_EXTENDS_FORM, EXT_EXTENDS_GROUP, FORM_EXTENSION, FORM_FORM, MU_UUID,
    OVERRIDABLE_SCHEMA_PREDICATES, SH_GROUP,
};

/// Base form URI an extension declares through `ext:extendsForm`.
pub fn extended_form(extension: &GraphStore, extension_uri: &Term) -> Result<Term, FormError> {
    extension
        .object_of(extension_uri, &Term::iri(EXT_EXTENDS_FORM))
        .filter(Term::is_iri)
        .ok_or_else(|| FormError::MissingRequiredRelation {
            schema: extension_uri.to_string(),
            relation: EXT_EXTENDS_FORM.to_string(),
        })
}

/// Rewrite every triple of `graph` selected by `pick` with `rewrite`.
fn rewrite_in(
    store: &mut GraphStore,
    graph: &GraphName,
    pick: impl Fn(&Triple) -> bool,
    rewrite: impl Fn(&Triple) -> Triple,
) -> usize {
    let selected: Vec<Triple> = store.triples_in(graph).filter(|t| pick(*t)).cloned().collect();
    for triple in &selected {
        store.remove_in(graph, triple);
    }
    for triple in &selected {
        store.insert_in(graph, rewrite(triple));
    }
    selected.len()
}

/// Merge `extension` (identified by `extension_uri`) into `base`.
///
/// Descriptive predicates the extension sets replace the base's values; the
/// base's `mu:uuid` is always dropped. `ext:extendsGroup` becomes `sh:group`.
/// Subject occurrences of the base URI move to the extension URI (with the
/// extension promoted from `form:Extension` to `form:Form`), then object
/// occurrences do too, except the `ext:extendsForm` link itself.
pub fn merge_schemas(
    base: &GraphStore,
    extension: &GraphStore,
    extension_uri: &Term,
    config: &FormsConfig,
) -> Result<GraphStore, FormError> {
    let base_uri = extended_form(extension, extension_uri)?;
    let graph: GraphName = Some(config.merge_graph());

    let mut scratch = GraphStore::new();
    scratch.extend_relabeled(base, &graph, "base_");
    scratch.extend_relabeled(extension, &graph, "ext_");

    // Overrides.
    for predicate in OVERRIDABLE_SCHEMA_PREDICATES {
        let predicate = Term::iri(predicate);
        let overridden = !extension
            .matching(Some(extension_uri), Some(&predicate), None)
            .is_empty();
        if overridden {
            scratch.remove_matching_in(&graph, Some(&base_uri), Some(&predicate), None);
        }
    }
    scratch.remove_matching_in(&graph, Some(&base_uri), Some(&Term::iri(MU_UUID)), None);

    let extends_group = Term::iri(EXT_EXTENDS_GROUP);
    rewrite_in(
        &mut scratch,
        &graph,
        |t| t.predicate == extends_group,
        |t| Triple::new(t.subject.clone(), Term::iri(SH_GROUP), t.object.clone()),
    );

    // Subject pass, with the type promotion.
    let rdf_type = Term::iri(RDF_TYPE);
    let extension_type = Triple::new(extension_uri.clone(), rdf_type.clone(), Term::iri(FORM_EXTENSION));
    if scratch.remove_in(&graph, &extension_type) {
        scratch.insert_in(
            &graph,
            Triple::new(extension_uri.clone(), rdf_type, Term::iri(FORM_FORM)),
        );
    }
    let moved_subjects = rewrite_in(
        &mut scratch,
        &graph,
        |t| t.subject == base_uri,
        |t| Triple::new(extension_uri.clone(), t.predicate.clone(), t.object.clone()),
    );

    // Object pass.
    let extends_form = Term::iri(EXT_EXTENDS_FORM);
    let moved_objects = rewrite_in(
        &mut scratch,
        &graph,
        |t| t.object == base_uri && !(t.subject == *extension_uri && t.predicate == extends_form),
        |t| Triple::new(t.subject.clone(), t.predicate.clone(), extension_uri.clone()),
    );

    let merged = scratch.take_graph(&graph);
    tracing::debug!(
        base = %base_uri,
        extension = %extension_uri,
        moved_subjects,
        moved_objects,
        triples = merged.len(),
        "merged extension schema"
    );
    Ok(merged)
}

/// Text-in, text-out merge: parse both documents, merge, and serialize the
/// result as Turtle with the configured prefixes.
pub fn merge_documents(
    base_text: &str,
    extension_text: &str,
    format: RdfFormat,
    extension_uri: &Term,
    config: &FormsConfig,
) -> Result<String, FormError> {
    let base = parse_document(base_text, format)?;
    let extension = parse_document(extension_text, format)?;
    let merged = merge_schemas(&base, &extension, extension_uri, config)?;
    Ok(merged.to_turtle(&config.prefixes()))
}
