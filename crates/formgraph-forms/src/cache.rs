//! Parsed-schema cache for services that resolve many instances against the
//! same schemas. Owned by the caller and passed where needed; the core
//! operations never consult it on their own.

use std::collections::HashMap;
use std::sync::Arc;

use formgraph_rdf::{GraphStore, Term};
use parking_lot::RwLock;

use crate::error::FormError;
use crate::path::PathMap;
use crate::resolve::{resolve_paths, RootKind};

/// A schema with its field paths resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSchema {
    pub id: String,
    pub uri: Term,
    pub graph: GraphStore,
    pub field_paths: PathMap,
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<String, Arc<CachedSchema>>,
    by_uri: HashMap<Term, Arc<CachedSchema>>,
}

/// Schemas by identifier and by URI. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<Entries>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and cache `graph`, replacing any entry with the same id or URI.
    pub fn insert(
        &self,
        id: impl Into<String>,
        uri: Term,
        graph: GraphStore,
    ) -> Result<Arc<CachedSchema>, FormError> {
        let field_paths = resolve_paths(&graph, RootKind::Field)?;
        let schema = Arc::new(CachedSchema {
            id: id.into(),
            uri,
            graph,
            field_paths,
        });

        let mut entries = self.entries.write();
        if let Some(old) = entries.by_id.remove(&schema.id) {
            entries.by_uri.remove(&old.uri);
        }
        if let Some(old) = entries.by_uri.remove(&schema.uri) {
            entries.by_id.remove(&old.id);
        }
        entries.by_id.insert(schema.id.clone(), Arc::clone(&schema));
        entries.by_uri.insert(schema.uri.clone(), Arc::clone(&schema));
        tracing::debug!(id = %schema.id, uri = %schema.uri, "cached schema");
        Ok(schema)
    }

    pub fn get_by_id(&self, id: &str) -> Option<Arc<CachedSchema>> {
        self.entries.read().by_id.get(id).cloned()
    }

    pub fn get_by_uri(&self, uri: &Term) -> Option<Arc<CachedSchema>> {
        self.entries.read().by_uri.get(uri).cloned()
    }

    /// Drop the schema with `uri`; call whenever that schema is mutated.
    pub fn invalidate(&self, uri: &Term) -> bool {
        let mut entries = self.entries.write();
        match entries.by_uri.remove(uri) {
            Some(old) => {
                entries.by_id.remove(&old.id);
                tracing::debug!(id = %old.id, uri = %uri, "invalidated cached schema");
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.by_id.clear();
        entries.by_uri.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
