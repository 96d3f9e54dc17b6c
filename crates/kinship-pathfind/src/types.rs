//! Result types for path queries.

use serde::Serialize;

use kinship_core::{ContextError, Path};

/// Why a longest-path search stopped before exhausting the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    DeadlineExceeded,
    Canceled,
}

impl From<ContextError> for TruncationReason {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::DeadlineExceeded { .. } => Self::DeadlineExceeded,
            ContextError::Canceled => Self::Canceled,
        }
    }
}

/// Whether a longest path is proven maximal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchStatus {
    /// The search space was exhausted; no simple path is longer.
    Complete,
    /// Best effort: the context ended first and a longer path may exist.
    Truncated { reason: TruncationReason },
}

/// A longest simple path together with its optimality status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestPath {
    pub path: Path,
    pub status: SearchStatus,
    pub expansions: usize,
}

impl LongestPath {
    pub fn is_truncated(&self) -> bool {
        matches!(self.status, SearchStatus::Truncated { .. })
    }
}

/// JSON shape printed by the CLI for path queries.
#[derive(Debug, Clone, Serialize)]
pub struct PathReport {
    pub start: String,
    pub end: String,
    pub nodes: Vec<String>,
    pub length: usize,
    #[serde(flatten)]
    pub status: SearchStatus,
    pub computation_ms: u64,
}

impl PathReport {
    pub fn new(
        start: &str,
        end: &str,
        path: Path,
        status: SearchStatus,
        computation_ms: u64,
    ) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            length: path.len(),
            nodes: path.nodes,
            status,
            computation_ms,
        }
    }
}
