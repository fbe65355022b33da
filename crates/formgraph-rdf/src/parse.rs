//! Document parsing through Sophia.
//!
//! Supported serializations:
//! - N-Triples (`.nt`)
//! - Turtle (`.ttl`)
//! - RDF/XML (`.rdf`, `.owl`, `.xml`)
//!
//! Relative IRIs are not resolved (no base IRI); documents exchanged with the
//! form service use absolute IRIs.

use serde::{Deserialize, Serialize};
use sophia::api::source::TripleSource;
use sophia::api::term::{Term as _, TermKind};
use sophia::api::triple::Triple as _;
use std::fmt;
use std::str::FromStr;

use crate::store::GraphStore;
use crate::term::{Literal, Term, Triple};
use crate::RdfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "nt" | "ntriples" => Some(RdfFormat::NTriples),
            "ttl" | "turtle" => Some(RdfFormat::Turtle),
            "rdf" | "owl" | "xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RdfFormat::NTriples => "ntriples",
            RdfFormat::Turtle => "turtle",
            RdfFormat::RdfXml => "rdfxml",
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RdfFormat {
    type Err = RdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ntriples" => Ok(RdfFormat::NTriples),
            "turtle" => Ok(RdfFormat::Turtle),
            "rdfxml" => Ok(RdfFormat::RdfXml),
            other => RdfFormat::from_extension(other)
                .ok_or_else(|| RdfError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct ParseSinkError {
    message: String,
}

fn convert_term<T: sophia::api::term::Term>(term: T) -> Result<Term, ParseSinkError> {
    let kind = term.kind();
    let converted = match kind {
        TermKind::Iri => term.iri().map(|iri| Term::iri(iri.as_str())),
        TermKind::BlankNode => term.bnode_id().map(|id| Term::blank(id.as_str())),
        TermKind::Literal => term.lexical_form().map(|lex| {
            let lexical: &str = &lex;
            if let Some(tag) = term.language_tag() {
                Term::Literal(Literal::lang(lexical, tag.as_str()))
            } else if let Some(dt) = term.datatype() {
                Term::Literal(Literal::typed(lexical, dt.as_str()))
            } else {
                Term::Literal(Literal::plain(lexical))
            }
        }),
        _ => None,
    };
    converted.ok_or_else(|| ParseSinkError {
        message: format!("unsupported RDF term kind: {kind:?}"),
    })
}

fn collect_triples<S: TripleSource>(
    mut source: S,
    format: RdfFormat,
) -> Result<GraphStore, RdfError> {
    let mut store = GraphStore::new();
    source
        .try_for_each_triple(|t| -> Result<(), ParseSinkError> {
            let triple = Triple::new(convert_term(t.s())?, convert_term(t.p())?, convert_term(t.o())?);
            store.insert(triple);
            Ok(())
        })
        .map_err(|e| RdfError::Parse {
            format,
            message: e.to_string(),
        })?;
    Ok(store)
}

/// Parse a whole document into a fresh store (default graph).
pub fn parse_document(text: &str, format: RdfFormat) -> Result<GraphStore, RdfError> {
    let reader = std::io::BufReader::new(text.as_bytes());
    let store = match format {
        RdfFormat::NTriples => {
            collect_triples(sophia::turtle::parser::nt::parse_bufread(reader), format)?
        }
        RdfFormat::Turtle => {
            collect_triples(sophia::turtle::parser::turtle::parse_bufread(reader), format)?
        }
        RdfFormat::RdfXml => collect_triples(sophia::xml::parser::parse_bufread(reader), format)?,
    };
    tracing::debug!(format = %format, triples = store.len(), "parsed RDF document");
    Ok(store)
}

pub fn parse_turtle(text: &str) -> Result<GraphStore, RdfError> {
    parse_document(text, RdfFormat::Turtle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_NT: &str = r#"
<http://example.org/Steel> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Metal> .
<http://example.org/Steel> <http://example.org/label> "Steel" .
<http://example.org/Steel> <http://example.org/grade> "304"^^<http://www.w3.org/2001/XMLSchema#integer> .
"#;

    #[test]
    fn parses_ntriples_into_the_default_graph() {
        let store = parse_document(SAMPLE_NT, RdfFormat::NTriples).expect("parse");
        assert_eq!(store.len(), 3);
        assert!(store.contains(&Triple::new(
            Term::iri("http://example.org/Steel"),
            Term::iri("http://example.org/label"),
            Term::literal("Steel"),
        )));
        assert!(store.contains(&Triple::new(
            Term::iri("http://example.org/Steel"),
            Term::iri("http://example.org/grade"),
            Term::Literal(Literal::typed("304", crate::vocab::XSD_INTEGER)),
        )));
    }

    #[test]
    fn parses_turtle_lists_and_language_tags() {
        let turtle = r#"
@prefix ex: <http://example.org/> .
ex:a ex:path ( ex:p ex:q ) .
ex:a ex:label "Alice"@en .
"#;
        let store = parse_turtle(turtle).expect("turtle");
        let first = Term::iri(crate::vocab::RDF_FIRST);
        assert_eq!(store.matching(None, Some(&first), None).len(), 2);
        assert!(store.contains(&Triple::new(
            Term::iri("http://example.org/a"),
            Term::iri("http://example.org/label"),
            Term::Literal(Literal::lang("Alice", "en")),
        )));
    }

    #[test]
    fn reports_syntax_errors_with_the_format() {
        let err = parse_turtle("@prefix ex: <http://example.org/> .\nex:a ex:b").unwrap_err();
        assert!(matches!(err, RdfError::Parse { format: RdfFormat::Turtle, .. }));
    }

    #[test]
    fn format_names_round_trip_through_from_str() {
        for format in [RdfFormat::NTriples, RdfFormat::Turtle, RdfFormat::RdfXml] {
            assert_eq!(format.name().parse::<RdfFormat>().unwrap(), format);
        }
        assert_eq!("ttl".parse::<RdfFormat>().unwrap(), RdfFormat::Turtle);
        assert!("json".parse::<RdfFormat>().is_err());
    }
}
