//! In-process `GraphStore`.
//!
//! Writers are serialized by an owned async mutex. Each transaction works on a
//! private copy of the committed state and swaps it in on commit, so readers
//! only ever observe whole batches.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use kinship_core::{Entity, GraphSnapshot, Relation};

use crate::client::GraphError;
use crate::store::{GraphStore, WriteTxn};

#[derive(Debug, Clone, Default)]
struct GraphState {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    relations: Vec<Relation>,
    relation_set: HashSet<Relation>,
}

impl GraphState {
    fn upsert_entity(&mut self, entity: &Entity) {
        match self.index.get(&entity.name) {
            Some(&i) => self.entities[i].attributes = entity.attributes.clone(),
            None => {
                self.index.insert(entity.name.clone(), self.entities.len());
                self.entities.push(entity.clone());
            }
        }
    }

    fn upsert_relation(&mut self, relation: &Relation) -> Result<(), GraphError> {
        for name in [&relation.from, &relation.to] {
            if !self.index.contains_key(name) {
                return Err(GraphError::EntityNotFound { name: name.clone() });
            }
        }
        if self.relation_set.insert(relation.clone()) {
            self.relations.push(relation.clone());
        }
        Ok(())
    }

    fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            entities: self.entities.clone(),
            relations: self.relations.clone(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    committed: Arc<RwLock<GraphState>>,
    writer: Arc<Mutex<()>>,
    op_latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every transactional operation, to stand in for a remote store.
    pub fn with_op_latency(mut self, latency: Duration) -> Self {
        self.op_latency = Some(latency);
        self
    }
}

pub struct MemoryTxn {
    staged: GraphState,
    committed: Arc<RwLock<GraphState>>,
    op_latency: Option<Duration>,
    _writer: OwnedMutexGuard<()>,
}

impl MemoryTxn {
    async fn simulate_latency(&self) {
        if let Some(latency) = self.op_latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl WriteTxn for MemoryTxn {
    async fn upsert_entity(&mut self, entity: &Entity) -> Result<(), GraphError> {
        self.simulate_latency().await;
        self.staged.upsert_entity(entity);
        Ok(())
    }

    async fn upsert_relation(&mut self, relation: &Relation) -> Result<(), GraphError> {
        self.simulate_latency().await;
        self.staged.upsert_relation(relation)
    }

    async fn commit(self) -> Result<(), GraphError> {
        let mut committed = self.committed.write().await;
        *committed = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), GraphError> {
        Ok(())
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    type Txn = MemoryTxn;

    async fn begin_write(&self) -> Result<MemoryTxn, GraphError> {
        let writer = self.writer.clone().lock_owned().await;
        let staged = self.committed.read().await.clone();
        Ok(MemoryTxn {
            staged,
            committed: self.committed.clone(),
            op_latency: self.op_latency,
            _writer: writer,
        })
    }

    async fn snapshot(&self) -> Result<GraphSnapshot, GraphError> {
        Ok(self.committed.read().await.snapshot())
    }

    async fn friends_of(&self, name: &str, kind: &str) -> Result<Vec<Entity>, GraphError> {
        let state = self.committed.read().await;
        if !state.index.contains_key(name) {
            return Err(GraphError::EntityNotFound {
                name: name.to_string(),
            });
        }
        Ok(state
            .relations
            .iter()
            .filter(|r| r.from == name && r.kind == kind)
            .filter_map(|r| state.index.get(&r.to).map(|&i| state.entities[i].clone()))
            .collect())
    }

    async fn entity_count(&self) -> Result<usize, GraphError> {
        Ok(self.committed.read().await.entities.len())
    }

    async fn relation_count(&self) -> Result<usize, GraphError> {
        Ok(self.committed.read().await.relations.len())
    }
}
