//! Store collaborator interface.
//!
//! A [`GraphStore`] hands out write transactions (the unit of work for
//! upserts) and read snapshots. Implementations own persistence and write
//! serialization; callers own the store handle and pass it explicitly.

use async_trait::async_trait;

use kinship_core::{Entity, GraphSnapshot, Relation};

use crate::client::GraphError;

/// One write unit of work. Nothing is visible to readers until `commit`.
///
/// Dropping a transaction without committing abandons it. An operation future
/// dropped mid-flight may leave the transaction unusable, so after that only
/// dropping is safe; `rollback` is for transactions whose last operation ran
/// to completion.
#[async_trait]
pub trait WriteTxn: Send {
    /// Create the entity, or replace the attributes of the existing one.
    async fn upsert_entity(&mut self, entity: &Entity) -> Result<(), GraphError>;

    /// Create the relation unless the exact triple exists. Both endpoints must
    /// be visible to this transaction.
    async fn upsert_relation(&mut self, relation: &Relation) -> Result<(), GraphError>;

    async fn commit(self) -> Result<(), GraphError>;

    async fn rollback(self) -> Result<(), GraphError>;
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    type Txn: WriteTxn;

    async fn begin_write(&self) -> Result<Self::Txn, GraphError>;

    /// All committed entities and relations, in insertion order.
    async fn snapshot(&self) -> Result<GraphSnapshot, GraphError>;

    /// Entities reachable from `name` over one outgoing `kind` relation.
    async fn friends_of(&self, name: &str, kind: &str) -> Result<Vec<Entity>, GraphError>;

    async fn entity_count(&self) -> Result<usize, GraphError>;

    async fn relation_count(&self) -> Result<usize, GraphError>;
}
