//! RDF graph store for the form core.
//!
//! This crate is the leaf of the workspace:
//!
//! - an owned term/triple model (`term`),
//! - a named-graph partitioned in-memory store (`store`),
//! - a small pattern-matching query algebra evaluated in memory and rendered
//!   as SPARQL for remote stores (`pattern`, `render`),
//! - document parsing via **Sophia** (`parse`) and deterministic writers
//!   (`serialize`).
//!
//! Nothing here knows about forms; see `formgraph-forms` for that.

pub mod parse;
pub mod pattern;
pub mod render;
pub mod serialize;
pub mod store;
pub mod term;
pub mod vocab;

pub use parse::{parse_document, parse_turtle, RdfFormat};
pub use pattern::{Bindings, GroupPattern, PatternTerm, TriplePattern, Variable, Verb};
pub use serialize::Prefixes;
pub use store::GraphStore;
pub use term::{GraphName, Literal, Term, Triple};

#[derive(Debug, thiserror::Error)]
pub enum RdfError {
    #[error("failed to parse {format} document: {message}")]
    Parse { format: RdfFormat, message: String },

    #[error("unsupported RDF format: {0}")]
    UnsupportedFormat(String),
}
