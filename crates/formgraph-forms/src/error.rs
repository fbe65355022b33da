use formgraph_rdf::RdfError;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A path step uses a modifier other than `sh:inversePath`. Fatal for the
    /// whole resolution: dropping the hop would corrupt extraction.
    #[error("unsupported path modifier <{modifier}> in path of {field}")]
    UnsupportedModifier { modifier: String, field: String },

    #[error("schema {schema} is missing required relation <{relation}>")]
    MissingRequiredRelation { schema: String, relation: String },

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error(transparent)]
    Rdf(#[from] RdfError),
}

/// Why a field's path could not be resolved. The field is left out of the
/// resolved mapping; other fields are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathDefect {
    #[error("path value is neither an IRI nor a list")]
    NotAPath,
    #[error("path list has no first element")]
    MissingHead,
    #[error("path step {step} resolves to no predicate")]
    UnresolvableStep { step: String },
    #[error("path has more than one candidate at {at}")]
    Ambiguous { at: String },
    #[error("path list is cyclic")]
    Cycle,
    #[error("path list does not terminate in rdf:nil")]
    Unterminated,
    #[error("generator scope declares no path")]
    MissingScopePath,
}
