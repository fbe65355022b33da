//! Declarative paths and their resolved chains.

use formgraph_rdf::Term;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Inverse,
}

/// One predicate hop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathStep {
    pub predicate: Term,
    pub direction: Direction,
}

impl PathStep {
    pub fn forward(predicate: Term) -> Self {
        Self {
            predicate,
            direction: Direction::Forward,
        }
    }

    pub fn inverse(predicate: Term) -> Self {
        Self {
            predicate,
            direction: Direction::Inverse,
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Forward => write!(f, "{}", self.predicate),
            Direction::Inverse => write!(f, "^{}", self.predicate),
        }
    }
}

/// A field's path as declared in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Path {
    /// `sh:path <p>`
    Simple(Term),
    /// `sh:path ( <p> [ sh:inversePath <q> ] ... )`
    List(Vec<PathStep>),
}

impl Path {
    pub fn chain(&self) -> PathChain {
        match self {
            Path::Simple(p) => PathChain::new(vec![PathStep::forward(p.clone())]),
            Path::List(steps) => PathChain::new(steps.clone()),
        }
    }
}

/// Resolved hops from the entity root to the field value, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathChain(Vec<PathStep>);

impl PathChain {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This chain followed by one more hop.
    pub fn then(&self, step: PathStep) -> PathChain {
        let mut steps = self.0.clone();
        steps.push(step);
        PathChain(steps)
    }
}

/// SPARQL property-path notation: `<p> / ^<q>`.
impl fmt::Display for PathChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Identifies one resolved field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKey {
    /// A declared `form:Field`.
    Field { field: Term },
    /// A predicate written by a generator's prototype shape.
    Generated { generator: Term, predicate: Term },
}

impl FieldKey {
    pub fn field(field: Term) -> Self {
        FieldKey::Field { field }
    }

    pub fn generated(generator: Term, predicate: Term) -> Self {
        FieldKey::Generated {
            generator,
            predicate,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Field { field } => write!(f, "{field}"),
            FieldKey::Generated {
                generator,
                predicate,
            } => write!(f, "{generator} -> {predicate}"),
        }
    }
}

pub type PathMap = BTreeMap<FieldKey, PathChain>;
