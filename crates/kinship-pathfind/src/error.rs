//! Error types for the kinship-pathfind crate.

use thiserror::Error;

use kinship_core::ContextError;
use kinship_graph::GraphError;

#[derive(Error, Debug)]
pub enum PathfindError {
    #[error("Graph error: {0}")]
    Graph(GraphError),

    #[error("Vertex not found: {name}")]
    VertexNotFound { name: String },

    #[error("No path found between {start} and {end}")]
    NoPathFound { start: String, end: String },

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Context errors raised while talking to the store surface as
/// `PathfindError::Context`, not as a wrapped graph error.
impl From<GraphError> for PathfindError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Context(e) => Self::Context(e),
            other => Self::Graph(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PathfindError>;
