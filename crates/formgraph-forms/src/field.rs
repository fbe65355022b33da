//! Field declarations: writing new fields into a schema and listing the
//! fields a schema declares.

use formgraph_rdf::{
    vocab::{RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE, XSD_INTEGER},
    GraphStore, Literal, Term, Triple,
};
use serde::Serialize;

use crate::error::FormError;
use crate::path::{Direction, FieldKey, Path, PathChain, PathStep};
use crate::resolve::{resolve_paths, RootKind};
use crate::vocab::{
    FORM_DISPLAY_TYPE, FORM_FIELD, FORM_INCLUDES, SH_GROUP, SH_INVERSE_PATH, SH_NAME, SH_ORDER,
    SH_PATH,
};

/// A field to add to a form. The URI is minted by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub uri: Term,
    pub label: String,
    pub display_type: Term,
    pub order: Option<i64>,
    pub group: Option<Term>,
    pub path: Path,
}

/// FNV-1a 64-bit digest, hex encoded.
fn fnv1a64_hex(bytes: &[u8]) -> String {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x00000100000001b3;

    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= (*b) as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}

/// Encode `steps` as an RDF list; returns the head node.
///
/// Blank-node ids derive from the field URI so that adding the same field to
/// two schemas produces the same labels, and two fields never share one.
fn write_path_list(
    schema: &mut GraphStore,
    field: &Term,
    steps: &[PathStep],
) -> Term {
    let stem = fnv1a64_hex(field.to_string().as_bytes());
    let cells: Vec<Term> = (0..steps.len())
        .map(|i| Term::blank(format!("path{stem}c{i}")))
        .collect();

    for (i, step) in steps.iter().enumerate() {
        let element = match step.direction {
            Direction::Forward => step.predicate.clone(),
            Direction::Inverse => {
                let node = Term::blank(format!("path{stem}s{i}"));
                schema.insert(Triple::new(
                    node.clone(),
                    Term::iri(SH_INVERSE_PATH),
                    step.predicate.clone(),
                ));
                node
            }
        };
        schema.insert(Triple::new(cells[i].clone(), Term::iri(RDF_FIRST), element));
        let rest = cells.get(i + 1).cloned().unwrap_or_else(|| Term::iri(RDF_NIL));
        schema.insert(Triple::new(cells[i].clone(), Term::iri(RDF_REST), rest));
    }
    cells.into_iter().next().unwrap_or_else(|| Term::iri(RDF_NIL))
}

/// Declare `field` in `schema` and include it in `form`.
pub fn add_field(
    schema: &mut GraphStore,
    form: &Term,
    field: &FieldDefinition,
) -> Result<(), FormError> {
    let invalid = |reason: &str| FormError::InvalidField {
        field: field.uri.to_string(),
        reason: reason.to_string(),
    };
    if !field.uri.is_iri() {
        return Err(invalid("field identifier must be an IRI"));
    }
    let path_value = match &field.path {
        Path::Simple(predicate) if predicate.is_iri() => predicate.clone(),
        Path::Simple(_) => return Err(invalid("path predicate must be an IRI")),
        Path::List(steps) if steps.is_empty() => return Err(invalid("path list is empty")),
        Path::List(steps) if steps.iter().any(|s| !s.predicate.is_iri()) => {
            return Err(invalid("path predicate must be an IRI"))
        }
        Path::List(steps) => write_path_list(schema, &field.uri, steps),
    };

    let uri = &field.uri;
    let mut declare = |predicate: &str, object: Term| {
        schema.insert(Triple::new(uri.clone(), Term::iri(predicate), object));
    };
    declare(RDF_TYPE, Term::iri(FORM_FIELD));
    declare(SH_NAME, Term::literal(field.label.as_str()));
    declare(FORM_DISPLAY_TYPE, field.display_type.clone());
    declare(SH_PATH, path_value);
    if let Some(order) = field.order {
        declare(SH_ORDER, Term::Literal(Literal::typed(order.to_string(), XSD_INTEGER)));
    }
    if let Some(group) = &field.group {
        declare(SH_GROUP, group.clone());
    }
    schema.insert(Triple::new(form.clone(), Term::iri(FORM_INCLUDES), uri.clone()));

    tracing::debug!(field = %uri, form = %form, "added field");
    Ok(())
}

/// One declared field, as listed by [`describe_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub uri: Term,
    pub label: Option<String>,
    pub display_type: Option<Term>,
    pub order: Option<i64>,
    pub group: Option<Term>,
    /// `None` when the field's path is malformed.
    pub path: Option<PathChain>,
}

fn literal_text(term: Term) -> Option<String> {
    match term {
        Term::Literal(lit) => Some(lit.lexical),
        _ => None,
    }
}

/// Every `form:Field` in `schema`, ordered by `sh:order` (unordered fields
/// last), then by URI.
pub fn describe_fields(schema: &GraphStore) -> Result<Vec<FieldInfo>, FormError> {
    let mut chains = resolve_paths(schema, RootKind::Field)?;
    let mut fields: Vec<FieldInfo> = schema
        .matching(None, Some(&Term::iri(RDF_TYPE)), Some(&Term::iri(FORM_FIELD)))
        .into_iter()
        .map(|t| {
            let uri = t.subject;
            let value = |predicate: &str| schema.object_of(&uri, &Term::iri(predicate));
            FieldInfo {
                label: value(SH_NAME).and_then(literal_text),
                display_type: value(FORM_DISPLAY_TYPE),
                order: value(SH_ORDER)
                    .and_then(literal_text)
                    .and_then(|s| s.trim().parse().ok()),
                group: value(SH_GROUP),
                path: chains.remove(&FieldKey::field(uri.clone())),
                uri,
            }
        })
        .collect();
    fields.sort_by(|a, b| {
        (a.order.is_none(), a.order, &a.uri).cmp(&(b.order.is_none(), b.order, &b.uri))
    });
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathMap;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://ex.org/{local}"))
    }

    fn definition(uri: &str, path: Path, order: Option<i64>) -> FieldDefinition {
        FieldDefinition {
            uri: ex(uri),
            label: format!("Label of {uri}"),
            display_type: Term::iri("http://lblod.data.gift/display-types/defaultInput"),
            order,
            group: Some(ex("main")),
            path,
        }
    }

    #[test]
    fn added_list_path_resolves_back_to_the_same_chain() {
        let steps = vec![
            PathStep::inverse(Term::iri("http://www.w3.org/ns/prov#generated")),
            PathStep::forward(Term::iri("http://purl.org/dc/terms/subject")),
        ];
        let mut schema = GraphStore::new();
        add_field(&mut schema, &ex("form"), &definition("subject", Path::List(steps.clone()), Some(2)))
            .unwrap();

        let chains: PathMap = resolve_paths(&schema, RootKind::Field).unwrap();
        assert_eq!(chains[&FieldKey::field(ex("subject"))].steps(), steps.as_slice());
        assert!(schema.contains(&Triple::new(ex("form"), Term::iri(FORM_INCLUDES), ex("subject"))));
    }

    #[test]
    fn two_fields_never_share_list_nodes() {
        let steps = vec![PathStep::forward(ex("a")), PathStep::forward(ex("b"))];
        let mut schema = GraphStore::new();
        add_field(&mut schema, &ex("form"), &definition("one", Path::List(steps.clone()), None)).unwrap();
        add_field(&mut schema, &ex("form"), &definition("two", Path::List(steps), None)).unwrap();
        let chains = resolve_paths(&schema, RootKind::Field).unwrap();
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn empty_list_path_is_rejected() {
        let mut schema = GraphStore::new();
        let err = add_field(&mut schema, &ex("form"), &definition("f", Path::List(vec![]), None))
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidField { .. }));
        assert!(schema.is_empty());
    }

    #[test]
    fn fields_are_listed_by_order_then_uri() {
        let mut schema = GraphStore::new();
        let title = Path::Simple(Term::iri("http://purl.org/dc/terms/title"));
        for (uri, order) in [("zeta", Some(1)), ("beta", None), ("alpha", Some(5)), ("gamma", Some(1))] {
            add_field(&mut schema, &ex("form"), &definition(uri, title.clone(), order)).unwrap();
        }
        let listed: Vec<String> = describe_fields(&schema)
            .unwrap()
            .into_iter()
            .map(|f| f.uri.as_iri().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            listed,
            ["gamma", "zeta", "alpha", "beta"].map(|l| format!("http://ex.org/{l}"))
        );
    }

    #[test]
    fn description_carries_label_order_and_path() {
        let mut schema = GraphStore::new();
        let title = Term::iri("http://purl.org/dc/terms/title");
        add_field(&mut schema, &ex("form"), &definition("title", Path::Simple(title.clone()), Some(3)))
            .unwrap();
        let info = describe_fields(&schema).unwrap().remove(0);
        assert_eq!(info.label.as_deref(), Some("Label of title"));
        assert_eq!(info.order, Some(3));
        assert_eq!(info.group, Some(ex("main")));
        assert_eq!(info.path, Some(PathChain::new(vec![PathStep::forward(title)])));
    }
}
