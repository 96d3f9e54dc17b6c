//! Snapshot fetching through a `GraphStore`.

use kinship_core::{ExecutionContext, GraphSnapshot};
use kinship_graph::GraphStore;

use crate::error::Result;

/// Fetch every committed entity and relation, bounded by `ctx`.
///
/// Path queries load the whole graph and search in memory; the people graph
/// is small enough that repeated neighbor round-trips would cost more.
pub async fn fetch_snapshot<S: GraphStore>(
    store: &S,
    ctx: &ExecutionContext,
) -> Result<GraphSnapshot> {
    let snapshot = ctx.run(store.snapshot()).await?;
    tracing::debug!(
        entities = snapshot.entity_count(),
        relations = snapshot.relation_count(),
        "Fetched graph snapshot"
    );
    Ok(snapshot)
}
