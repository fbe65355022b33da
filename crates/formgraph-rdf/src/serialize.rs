//! Deterministic N-Triples and Turtle writers.
//!
//! Named graphs are flattened: both writers emit the union of every graph in
//! the store. Output order follows the store's (subject, predicate, object)
//! ordering, so equal stores always serialize identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::store::GraphStore;
use crate::term::{escape_literal, Term, Triple};
use crate::vocab::RDF_TYPE;

/// Ordered `prefix → namespace` declarations for Turtle output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefixes {
    entries: Vec<(String, String)>,
}

impl Prefixes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.entries.push((prefix.into(), namespace.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// `prefix:local` for `iri`, if a declared namespace covers it and the
    /// local part is a safe Turtle local name. The longest namespace wins.
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.entries
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .and_then(|(prefix, ns)| {
                let local = &iri[ns.len()..];
                is_safe_local_name(local).then(|| format!("{prefix}:{local}"))
            })
    }
}

fn is_safe_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        Some(_) => false,
    }
}

fn write_term(out: &mut String, term: &Term, prefixes: &Prefixes) {
    match term {
        Term::Iri { value } => match prefixes.compact(value) {
            Some(compact) => out.push_str(&compact),
            None => {
                let _ = write!(out, "<{value}>");
            }
        },
        Term::Literal(lit) if lit.datatype.is_some() && lit.language.is_none() => {
            let _ = write!(out, "\"{}\"^^", escape_literal(&lit.lexical));
            let dt = Term::iri(lit.datatype.clone().unwrap_or_default());
            write_term(out, &dt, prefixes);
        }
        other => {
            let _ = write!(out, "{other}");
        }
    }
}

impl GraphStore {
    pub fn to_ntriples(&self) -> String {
        let sorted: BTreeSet<&Triple> = self.triples().collect();
        let mut out = String::new();
        for triple in sorted {
            let _ = writeln!(out, "{triple}");
        }
        out
    }

    pub fn to_turtle(&self, prefixes: &Prefixes) -> String {
        let mut out = String::new();
        for (prefix, ns) in prefixes.iter() {
            let _ = writeln!(out, "@prefix {prefix}: <{ns}> .");
        }
        if !prefixes.entries.is_empty() {
            out.push('\n');
        }

        let sorted: BTreeSet<&Triple> = self.triples().collect();
        let mut current: Option<&Term> = None;
        for triple in sorted {
            if current == Some(&triple.subject) {
                out.push_str(" ;\n    ");
            } else {
                if current.is_some() {
                    out.push_str(" .\n\n");
                }
                write_term(&mut out, &triple.subject, prefixes);
                out.push(' ');
                current = Some(&triple.subject);
            }
            if triple.predicate.is(RDF_TYPE) {
                out.push('a');
            } else {
                write_term(&mut out, &triple.predicate, prefixes);
            }
            out.push(' ');
            write_term(&mut out, &triple.object, prefixes);
        }
        if current.is_some() {
            out.push_str(" .\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_turtle;
    use crate::term::Literal;

    fn store() -> GraphStore {
        let ex = |s: &str| Term::iri(format!("http://ex.org/{s}"));
        [
            Triple::new(ex("a"), Term::iri(RDF_TYPE), ex("Thing")),
            Triple::new(ex("a"), ex("label"), Term::literal("A \"quoted\"")),
            Triple::new(ex("a"), ex("count"), Term::Literal(Literal::typed("3", crate::vocab::XSD_INTEGER))),
            Triple::new(ex("b"), ex("rel"), Term::blank("n1")),
            Triple::new(Term::blank("n1"), ex("odd"), Term::iri("http://ex.org/1st")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn compacts_only_safe_local_names() {
        let prefixes = Prefixes::new().with("ex", "http://ex.org/");
        assert_eq!(prefixes.compact("http://ex.org/label").as_deref(), Some("ex:label"));
        assert_eq!(prefixes.compact("http://ex.org/1st"), None);
        assert_eq!(prefixes.compact("http://other.org/x"), None);
    }

    #[test]
    fn turtle_output_parses_back_to_the_same_triples() {
        let original = store();
        let prefixes = Prefixes::new()
            .with("ex", "http://ex.org/")
            .with("xsd", crate::vocab::XSD_NS);
        let text = original.to_turtle(&prefixes);
        assert!(text.starts_with("@prefix ex: <http://ex.org/> ."));
        assert!(text.contains(";\n    a ex:Thing"));

        let reparsed = parse_turtle(&text).expect("reparse");
        let ground = |s: &GraphStore| -> BTreeSet<Triple> {
            s.triples().filter(|t| !t.has_blank_node()).cloned().collect()
        };
        assert_eq!(ground(&reparsed), ground(&original));
        assert_eq!(reparsed.len(), original.len());
    }

    #[test]
    fn ntriples_output_is_deterministic_and_line_based() {
        let text = store().to_ntriples();
        assert_eq!(text, store().to_ntriples());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.ends_with(" .")));
        assert!(lines[0].starts_with("<http://ex.org/a> "));
    }
}
