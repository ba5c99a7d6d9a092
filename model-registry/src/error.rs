use std::path::PathBuf;

/// Errors produced by registry loading and lookups.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The input is not well-formed structured data.
    #[error("parse error: {0}")]
    Parse(String),

    /// The input parsed but describes an invalid registry.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No definition claims the requested alias or model name.
    #[error("no model definition for '{0}'")]
    NotFound(String),

    /// The requested feature flag does not exist.
    #[error("unknown feature '{0}'")]
    InvalidFeature(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }
}

impl From<serde_yaml::Error> for RegistryError {
    fn from(err: serde_yaml::Error) -> Self {
        RegistryError::Parse(err.to_string())
    }
}

/// Semantic problems found while building a registry.
///
/// `entry` fields are 1-based positions in the source sequence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("entry {entry}: missing required field `{field}`")]
    MissingField { entry: usize, field: String },

    #[error("entry {entry}: `{field}` must not be blank")]
    BlankField { entry: usize, field: String },

    #[error("model '{alias}': unknown provider '{provider}'")]
    UnknownProvider { alias: String, provider: String },

    #[error("model '{alias}': `model_names` must not be empty")]
    EmptyModelNames { alias: String },

    #[error("model '{alias}': unknown feature flag `{feature}`")]
    UnknownFeature { alias: String, feature: String },

    #[error("model '{alias}': pricing `{field}` must be a non-negative number, got {value}")]
    InvalidPrice {
        alias: String,
        field: &'static str,
        value: f64,
    },

    #[error("duplicate alias '{alias}'")]
    DuplicateAlias { alias: String },

    #[error("model name '{model_name}' is claimed by both '{first}' and '{second}'")]
    DuplicateModelName {
        model_name: String,
        first: String,
        second: String,
    },

    #[error("alias '{alias}' collides with a model name owned by '{owner}'")]
    AliasShadowsModelName { alias: String, owner: String },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
