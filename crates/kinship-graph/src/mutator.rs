//! Atomic batch commits.
//!
//! A batch is validated up front, then applied inside one store transaction:
//! every entity upsert first, then every relation upsert. Each operation is
//! raced against the execution context. Any failure rolls the transaction
//! back, or abandons it when an operation was interrupted mid-flight, so a
//! batch is either fully visible or not at all.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use kinship_core::{Batch, ExecutionContext};

use crate::client::GraphError;
use crate::store::{GraphStore, WriteTxn};

/// Summary of a committed batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub entities: usize,
    pub relations: usize,
    pub committed_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Commits batches against a caller-owned store handle.
pub struct GraphMutator<'a, S: GraphStore> {
    store: &'a S,
}

impl<'a, S: GraphStore> GraphMutator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    #[tracing::instrument(
        name = "commit_batch",
        skip(self, batch, ctx),
        fields(
            batch_id = tracing::field::Empty,
            entities = batch.entities.len(),
            relations = batch.relations.len(),
        )
    )]
    pub async fn commit_batch(
        &self,
        batch: &Batch,
        ctx: &ExecutionContext,
    ) -> Result<BatchReport, GraphError> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4();
        tracing::Span::current().record("batch_id", tracing::field::display(batch_id));

        batch.validate()?;
        ctx.check()?;

        let mut txn = ctx.run(self.store.begin_write()).await?;

        if let Err(e) = apply(&mut txn, batch, ctx).await {
            if matches!(e, GraphError::Context(_)) {
                // The interrupted operation may have left a reply unread, so
                // the transaction is abandoned by dropping it.
                tracing::debug!(error = %e, "Batch interrupted, abandoning transaction");
                drop(txn);
            } else {
                tracing::debug!(error = %e, "Batch failed, rolling back");
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
            }
            return Err(e);
        }

        // Last chance to abandon cleanly. The commit itself is not raced: an
        // interrupted commit would leave the outcome unknown.
        if let Err(e) = ctx.check() {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            return Err(e.into());
        }
        txn.commit().await?;

        let report = BatchReport {
            batch_id,
            entities: batch.entities.len(),
            relations: batch.relations.len(),
            committed_at: Utc::now(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        tracing::info!(
            entities = report.entities,
            relations = report.relations,
            elapsed_ms = report.elapsed_ms,
            "Committed batch"
        );
        Ok(report)
    }
}

async fn apply<T: WriteTxn>(
    txn: &mut T,
    batch: &Batch,
    ctx: &ExecutionContext,
) -> Result<(), GraphError> {
    for entity in &batch.entities {
        ctx.run(txn.upsert_entity(entity)).await?;
    }
    for relation in &batch.relations {
        ctx.run(txn.upsert_relation(relation)).await?;
    }
    Ok(())
}
