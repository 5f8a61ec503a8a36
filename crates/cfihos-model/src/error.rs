//! Domain errors for loading, merging and building CFIHOS models.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CfihosError>;

/// Coarse failure class, used by callers that only need to know who has to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or incomplete configuration, detected before any data is read.
    Configuration,
    /// Source data that cannot be translated through the fixed vocabularies.
    Mapping,
    /// Merged tables that violate a uniqueness or eligibility rule.
    Consistency,
    /// Reading or decoding a sheet failed.
    Io,
}

#[derive(Debug, Error)]
pub enum CfihosError {
    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------
    #[error("Missing required keys in configuration: {}", .0.join(", "))]
    MissingConfigKeys(Vec<String>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid model type '{0}', expected one of: containers, views")]
    InvalidModelType(String),

    #[error("Unsupported CFIHOS source type '{found}', expected one of: {}", .supported.join(", "))]
    UnsupportedSourceType {
        found: String,
        supported: Vec<String>,
    },

    #[error("Unknown processor type '{0}', expected one of: sparse")]
    UnknownProcessorType(String),

    #[error("Scope '{0}' not found.")]
    ScopeNotFound(String),

    // ------------------------------------------------------------------
    // Mapping
    // ------------------------------------------------------------------
    #[error("Missing conversion for '{0}'")]
    MissingTypeConversion(String),

    #[error("Could not map property field '{field}' - '{value}'")]
    UnmappableFlag { field: &'static str, value: String },

    #[error("Entity relation '{0}' not found in mapping table.")]
    RelationTargetNotFound(String),

    #[error("Name '{name}' cannot be shortened below {max_length} characters")]
    NameTooLong { name: String, max_length: usize },

    #[error("Missing column '{column}' in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    // ------------------------------------------------------------------
    // Consistency
    // ------------------------------------------------------------------
    #[error("Processed Entities has overlapping ids: {}", .0.join(", "))]
    DuplicateEntityIds(Vec<String>),

    #[error("Processed Entities has overlapping DMS Names: {}", .0.join(", "))]
    DuplicateDmsNames(Vec<String>),

    #[error("Processed Properties has overlapping entity-property-ids: {}", .0.join(", "))]
    DuplicateValidationIds(Vec<String>),

    #[error("Found properties '{column}' with lacking or multiple values: {}", .ids.join(", "))]
    InconsistentProperty { column: String, ids: Vec<String> },

    #[error("Reverse property {0} has a through property that is not a first class citizen")]
    IneligibleReverseTarget(String),

    #[error("Edge property {0} has a source or target type that is not a first class citizen")]
    IneligibleEdgeEndpoint(String),

    #[error("Found duplicate cfihos entity id: {0}")]
    DuplicateModelEntity(String),

    #[error("Found duplicate property id '{property}' in {scope}{entity}")]
    DuplicateModelProperty {
        property: String,
        entity: String,
        /// Empty for the regular namespace, `"FCC "` for first-class-citizen properties.
        scope: &'static str,
    },

    #[error("Entity '{entity}' inherits from unknown entity '{parent}'")]
    UnknownParent { entity: String, parent: String },

    #[error("Inheritance cycle detected at entity '{0}'")]
    InheritanceCycle(String),

    // ------------------------------------------------------------------
    // I/O
    // ------------------------------------------------------------------
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CfihosError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingConfigKeys(_)
            | Self::InvalidConfig(_)
            | Self::InvalidModelType(_)
            | Self::UnsupportedSourceType { .. }
            | Self::UnknownProcessorType(_)
            | Self::ScopeNotFound(_) => ErrorKind::Configuration,
            Self::MissingTypeConversion(_)
            | Self::UnmappableFlag { .. }
            | Self::RelationTargetNotFound(_)
            | Self::NameTooLong { .. }
            | Self::MissingColumn { .. } => ErrorKind::Mapping,
            Self::DuplicateEntityIds(_)
            | Self::DuplicateDmsNames(_)
            | Self::DuplicateValidationIds(_)
            | Self::InconsistentProperty { .. }
            | Self::IneligibleReverseTarget(_)
            | Self::IneligibleEdgeEndpoint(_)
            | Self::DuplicateModelEntity(_)
            | Self::DuplicateModelProperty { .. }
            | Self::UnknownParent { .. }
            | Self::InheritanceCycle(_) => ErrorKind::Consistency,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}
