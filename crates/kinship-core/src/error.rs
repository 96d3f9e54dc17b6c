use std::time::Duration;

use thiserror::Error;

/// Rejected input: malformed attribute maps or missing identities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing identity: entity and relation endpoints need a non-empty name")]
    MissingIdentity,

    #[error("Entity {entity} has an attribute with an empty key")]
    EmptyAttributeKey { entity: String },

    #[error("Entity {entity} sets reserved attribute '{key}'")]
    ReservedAttribute { entity: String, key: String },

    #[error("Entity {entity} attribute '{key}' is not a finite number")]
    NonFiniteAttribute { entity: String, key: String },

    #[error("Invalid relation kind '{0}': expected [A-Z][A-Z0-9_]*")]
    InvalidKind(String),
}

/// The bounded execution context ended before the operation did.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("Deadline exceeded after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },

    #[error("Operation canceled")]
    Canceled,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
