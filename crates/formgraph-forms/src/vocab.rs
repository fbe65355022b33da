//! Form, SHACL and mu vocabulary used by schema documents.

pub const FORM_NS: &str = "http://lblod.data.gift/vocabularies/forms/";
pub const FORM_FORM: &str = "http://lblod.data.gift/vocabularies/forms/Form";
pub const FORM_EXTENSION: &str = "http://lblod.data.gift/vocabularies/forms/Extension";
pub const FORM_FIELD: &str = "http://lblod.data.gift/vocabularies/forms/Field";
pub const FORM_GENERATOR: &str = "http://lblod.data.gift/vocabularies/forms/Generator";
pub const FORM_INCLUDES: &str = "http://lblod.data.gift/vocabularies/forms/includes";
pub const FORM_DISPLAY_TYPE: &str = "http://lblod.data.gift/vocabularies/forms/displayType";
pub const FORM_TARGET_TYPE: &str = "http://lblod.data.gift/vocabularies/forms/targetType";
pub const FORM_TARGET_LABEL: &str = "http://lblod.data.gift/vocabularies/forms/targetLabel";
pub const FORM_PROTOTYPE: &str = "http://lblod.data.gift/vocabularies/forms/prototype";
pub const FORM_SHAPE: &str = "http://lblod.data.gift/vocabularies/forms/shape";
pub const FORM_SCOPE: &str = "http://lblod.data.gift/vocabularies/forms/scope";

pub const SH_NS: &str = "http://www.w3.org/ns/shacl#";
pub const SH_PATH: &str = "http://www.w3.org/ns/shacl#path";
pub const SH_INVERSE_PATH: &str = "http://www.w3.org/ns/shacl#inversePath";
pub const SH_GROUP: &str = "http://www.w3.org/ns/shacl#group";
pub const SH_ORDER: &str = "http://www.w3.org/ns/shacl#order";
pub const SH_NAME: &str = "http://www.w3.org/ns/shacl#name";

pub const MU_NS: &str = "http://mu.semte.ch/vocabularies/core/";
pub const MU_UUID: &str = "http://mu.semte.ch/vocabularies/core/uuid";

pub const EXT_NS: &str = "http://mu.semte.ch/vocabularies/ext/";
pub const EXT_EXTENDS_FORM: &str = "http://mu.semte.ch/vocabularies/ext/extendsForm";
pub const EXT_EXTENDS_GROUP: &str = "http://mu.semte.ch/vocabularies/ext/extendsGroup";
pub const EXT_PREFIX: &str = "http://mu.semte.ch/vocabularies/ext/prefix";

pub const DCT_NS: &str = "http://purl.org/dc/terms/";
pub const DCT_MODIFIED: &str = "http://purl.org/dc/terms/modified";

/// Top-level schema predicates an extension may override on its base.
pub const OVERRIDABLE_SCHEMA_PREDICATES: [&str; 3] =
    [FORM_TARGET_TYPE, FORM_TARGET_LABEL, EXT_PREFIX];
