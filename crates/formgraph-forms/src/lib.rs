//! Form core: schema paths, instance queries, snapshot deltas and schema
//! extension.
//!
//! A form schema is an RDF graph declaring fields (`form:Field`) whose values
//! live at the end of a SHACL-style path from the instance root. This crate:
//!
//! - resolves every field's declared path into an ordered chain of hops
//!   (`resolve`),
//! - synthesizes the extraction/deletion statement for one instance from those
//!   chains (`query`),
//! - diffs two instance snapshots into a minimal update (`delta`),
//! - folds an extension schema into its base form (`merge`).
//!
//! All four are pure functions over in-memory stores from `formgraph-rdf`;
//! nothing here performs I/O. Submitting statements to a remote store is the
//! caller's job.

pub mod cache;
pub mod config;
pub mod delta;
pub mod error;
pub mod field;
pub mod instance;
pub mod merge;
pub mod path;
pub mod query;
pub mod resolve;
pub mod vocab;

pub use cache::{CachedSchema, SchemaCache};
pub use config::FormsConfig;
pub use delta::{compute_delta, diff_stores, Delta, DeltaOutcome};
pub use error::{FormError, PathDefect};
pub use field::{add_field, describe_fields, FieldDefinition, FieldInfo};
pub use instance::{field_values, follow_chain};
pub use merge::{merge_documents, merge_schemas};
pub use path::{Direction, FieldKey, Path, PathChain, PathMap, PathStep};
pub use query::{build_query, FormQuery, QueryMode, QueryRoot};
pub use resolve::{resolve_paths, resolve_paths_detailed, PathResolution, RootKind};
