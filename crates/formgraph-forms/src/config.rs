use std::collections::BTreeMap;

use formgraph_rdf::{vocab, Prefixes, Term};
use serde::{Deserialize, Serialize};

use crate::vocab::{DCT_NS, EXT_NS, FORM_NS, MU_NS, SH_NS};

// ============================================================================
// Forms Configuration
// ============================================================================

/// Graph names and output settings for the forms core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Named graph that delta updates are scoped to
    pub target_graph: String,
    /// Scratch graph name used while merging schemas
    pub merge_graph: String,
    /// Turtle prefixes for serialized schemas (`prefix -> namespace`)
    pub prefixes: BTreeMap<String, String>,
}

impl Default for FormsConfig {
    fn default() -> Self {
        let prefixes = [
            ("dct", DCT_NS),
            ("ext", EXT_NS),
            ("form", FORM_NS),
            ("mu", MU_NS),
            ("rdf", vocab::RDF_NS),
            ("sh", SH_NS),
            ("xsd", vocab::XSD_NS),
        ]
        .into_iter()
        .map(|(p, ns)| (p.to_string(), ns.to_string()))
        .collect();
        Self {
            target_graph: "http://mu.semte.ch/graphs/application".to_string(),
            merge_graph: "http://mu.semte.ch/graphs/form-merge".to_string(),
            prefixes,
        }
    }
}

impl FormsConfig {
    /// Parse a JSON config; missing keys keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn target_graph(&self) -> Term {
        Term::iri(&self.target_graph)
    }

    pub fn merge_graph(&self) -> Term {
        Term::iri(&self.merge_graph)
    }

    pub fn prefixes(&self) -> Prefixes {
        self.prefixes
            .iter()
            .fold(Prefixes::new(), |acc, (p, ns)| acc.with(p.as_str(), ns.as_str()))
    }
}
