//! SPARQL text rendering of the pattern algebra.

use std::fmt::{self, Write as _};

use crate::pattern::{GroupPattern, PatternTerm, TriplePattern, Variable, Verb};

const INDENT: &str = "  ";

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name())
    }
}

impl fmt::Display for PatternTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternTerm::Var(v) => v.fmt(f),
            PatternTerm::Term(t) => t.fmt(f),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Term(t) => t.fmt(f),
            Verb::Var(v) => v.fmt(f),
            Verb::OneOrMore(t) => write!(f, "{t}+"),
        }
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.verb, self.object)
    }
}

impl GroupPattern {
    /// Render the group body (without the enclosing braces) at `depth`.
    pub fn write_body(&self, out: &mut String, depth: usize) {
        let pad = INDENT.repeat(depth);
        for pattern in &self.patterns {
            let _ = writeln!(out, "{pad}{pattern}");
        }
        for optional in &self.optionals {
            let _ = writeln!(out, "{pad}OPTIONAL {{");
            optional.write_body(out, depth + 1);
            let _ = writeln!(out, "{pad}}}");
        }
    }
}

/// `{ ... }` with nested `OPTIONAL { ... }` blocks.
impl fmt::Display for GroupPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut body = String::new();
        self.write_body(&mut body, 1);
        write!(f, "{{\n{body}}}")
    }
}

/// Render a template block body, one pattern per line.
pub fn render_template(template: &[TriplePattern], depth: usize) -> String {
    let pad = INDENT.repeat(depth);
    let mut out = String::new();
    for pattern in template {
        let _ = writeln!(out, "{pad}{pattern}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    #[test]
    fn renders_nested_optionals() {
        let s = Variable::new("s");
        let group = GroupPattern::new()
            .with(TriplePattern::new(&s, Term::iri("http://ex.org/p"), Variable::new("o")))
            .with_optional(GroupPattern::new().with_optional(GroupPattern::new().with(
                TriplePattern::new(&s, Verb::OneOrMore(Term::iri("http://ex.org/q")), Term::literal("x")),
            )));
        let expected = "{\n  ?s <http://ex.org/p> ?o .\n  OPTIONAL {\n    OPTIONAL {\n      ?s <http://ex.org/q>+ \"x\" .\n    }\n  }\n}";
        assert_eq!(group.to_string(), expected);
    }
}
