//! kinship-core: Data model, execution context, configuration, and error types
//! shared by the Kinship crates.
//!
//! - Entity / Relation / Batch types with upsert-time validation
//! - Graph snapshots and paths returned by path queries
//! - The bounded execution context (deadline + cancellation)
//! - Settings loading

pub mod config;
pub mod context;
pub mod error;
pub mod types;

pub use context::ExecutionContext;
pub use error::{ConfigError, ContextError, ValidationError};
pub use types::{AttributeValue, Attributes, Batch, Entity, GraphSnapshot, Path, Relation};
