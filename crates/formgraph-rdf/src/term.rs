//! RDF term model.
//!
//! Terms are plain owned values: two terms are equal iff they are structurally
//! equal. Blank-node identifiers are only meaningful inside the store (or
//! parse) that produced them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vocab::{RDF_LANG_STRING, XSD_STRING};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    /// A simple literal (`xsd:string`).
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal. `xsd:string` and `rdf:langString` are folded into the
    /// plain form so that parsed and hand-built literals compare equal.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        let datatype = if datatype == XSD_STRING || datatype == RDF_LANG_STRING {
            None
        } else {
            Some(datatype)
        };
        Self {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    Iri { value: String },
    BlankNode { id: String },
    Literal(Literal),
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri {
            value: value.into(),
        }
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Term::BlankNode { id: id.into() }
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(lexical))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri { value } => Some(value),
            _ => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri { .. })
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// Whether `self == iri` without allocating a term for the comparison.
    pub fn is(&self, iri: &str) -> bool {
        self.as_iri() == Some(iri)
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

pub(crate) fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// N-Triples syntax, which is also valid SPARQL and Turtle term syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri { value } => write!(f, "<{value}>"),
            Term::BlankNode { id } => write!(f, "_:{id}"),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", escape_literal(&lit.lexical))?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// An RDF statement. Predicates are always IRIs; subjects are never literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    pub fn has_blank_node(&self) -> bool {
        self.subject.is_blank() || self.object.is_blank()
    }

    /// Whether the triple is well-formed RDF (IRI predicate, non-literal subject).
    pub fn is_valid(&self) -> bool {
        self.predicate.is_iri() && !self.subject.is_literal()
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// `None` is the default graph.
pub type GraphName = Option<Term>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xsd_string_literals_fold_into_plain_literals() {
        assert_eq!(Literal::typed("abc", XSD_STRING), Literal::plain("abc"));
        assert_ne!(
            Literal::typed("1", "http://www.w3.org/2001/XMLSchema#integer"),
            Literal::plain("1")
        );
    }

    #[test]
    fn displays_terms_in_ntriples_syntax() {
        assert_eq!(Term::iri("http://ex.org/a").to_string(), "<http://ex.org/a>");
        assert_eq!(Term::blank("b0").to_string(), "_:b0");
        assert_eq!(Term::literal("say \"hi\"\n").to_string(), r#""say \"hi\"\n""#);
        assert_eq!(
            Term::from(Literal::lang("chat", "fr")).to_string(),
            "\"chat\"@fr"
        );
        assert_eq!(
            Term::from(Literal::typed("2", "http://www.w3.org/2001/XMLSchema#integer"))
                .to_string(),
            "\"2\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn triple_reports_blank_nodes_on_either_side() {
        let p = Term::iri("http://ex.org/p");
        assert!(Triple::new(Term::blank("x"), p.clone(), Term::literal("v")).has_blank_node());
        assert!(Triple::new(Term::iri("http://ex.org/s"), p.clone(), Term::blank("y")).has_blank_node());
        assert!(!Triple::new(Term::iri("http://ex.org/s"), p, Term::literal("v")).has_blank_node());
    }
}
