//! Write operations for the Neo4j store.
//!
//! All mutations use MERGE (upsert) semantics. Entities are identified by
//! `name` and relations by the `(from, to, kind)` triple, so replaying a batch
//! never creates duplicates.

use async_trait::async_trait;
use neo4rs::{query, BoltMap, BoltString, BoltType, Query, Row};

use kinship_core::types::IDENTITY_KEY;
use kinship_core::{AttributeValue, Entity, Relation};

use crate::client::{GraphClient, GraphError};
use crate::store::WriteTxn;

/// Node label for entities.
pub const PERSON_LABEL: &str = "Person";

impl GraphClient {
    /// Create the uniqueness constraint that makes concurrent MERGEs on the
    /// same name converge to one node.
    pub async fn ensure_schema(&self) -> Result<(), GraphError> {
        let cypher = format!(
            "CREATE CONSTRAINT person_name IF NOT EXISTS
             FOR (n:{PERSON_LABEL}) REQUIRE n.name IS UNIQUE"
        );
        self.run(query(&cypher)).await?;
        tracing::debug!(label = PERSON_LABEL, "Ensured uniqueness constraint");
        Ok(())
    }
}

/// A Neo4j write transaction.
///
/// Dropped uncommitted, it goes back to the pool with the transaction still
/// open; the pool resets the connection before reuse, which makes the server
/// roll it back.
pub struct Neo4jTxn {
    txn: neo4rs::Txn,
}

impl Neo4jTxn {
    pub(crate) fn new(txn: neo4rs::Txn) -> Self {
        Self { txn }
    }

    async fn endpoint_presence(
        &mut self,
        relation: &Relation,
    ) -> Result<(bool, bool), GraphError> {
        let cypher = format!(
            "OPTIONAL MATCH (a:{PERSON_LABEL} {{name: $from}})
             OPTIONAL MATCH (b:{PERSON_LABEL} {{name: $to}})
             RETURN a IS NOT NULL AS has_from, b IS NOT NULL AS has_to
             LIMIT 1"
        );
        let q = query(&cypher)
            .param("from", relation.from.clone())
            .param("to", relation.to.clone());

        // Drain the stream so the connection is free for the MERGE that follows.
        let mut presence = (false, false);
        let mut stream = self.txn.execute(q).await?;
        while let Some(row) = stream.next(self.txn.handle()).await? {
            presence = (read_flag(&row, "has_from")?, read_flag(&row, "has_to")?);
        }
        Ok(presence)
    }
}

fn read_flag(row: &Row, key: &str) -> Result<bool, GraphError> {
    row.get::<bool>(key)
        .map_err(|e| GraphError::Serialization(format!("Failed to read {key}: {e}")))
}

#[async_trait]
impl WriteTxn for Neo4jTxn {
    async fn upsert_entity(&mut self, entity: &Entity) -> Result<(), GraphError> {
        self.txn.run(entity_upsert_query(entity)).await?;
        Ok(())
    }

    async fn upsert_relation(&mut self, relation: &Relation) -> Result<(), GraphError> {
        match self.endpoint_presence(relation).await? {
            (false, _) => {
                return Err(GraphError::EntityNotFound {
                    name: relation.from.clone(),
                })
            }
            (_, false) => {
                return Err(GraphError::EntityNotFound {
                    name: relation.to.clone(),
                })
            }
            _ => {}
        }
        self.txn.run(relation_upsert_query(relation)).await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), GraphError> {
        self.txn.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), GraphError> {
        self.txn.rollback().await?;
        Ok(())
    }
}

// ── Queries ──────────────────────────────────────────────────────

/// `SET n = $props` replaces the whole property map, which gives the
/// attribute-replacement half of the upsert contract. The identity is written
/// back as part of the map.
fn entity_upsert_query(entity: &Entity) -> Query {
    let cypher = format!(
        "MERGE (n:{PERSON_LABEL} {{name: $name}})
         SET n = $props"
    );

    query(&cypher)
        .param("name", entity.name.clone())
        .param("props", entity_props(entity))
}

/// The relation kind is interpolated as a relationship type; it has already
/// been checked against `[A-Z][A-Z0-9_]*` by batch validation.
fn relation_upsert_query(relation: &Relation) -> Query {
    let kind = &relation.kind;
    let cypher = format!(
        "MATCH (a:{PERSON_LABEL} {{name: $from}})
         MATCH (b:{PERSON_LABEL} {{name: $to}})
         MERGE (a)-[:{kind}]->(b)"
    );

    query(&cypher)
        .param("from", relation.from.clone())
        .param("to", relation.to.clone())
}

fn entity_props(entity: &Entity) -> BoltType {
    let mut props = BoltMap::new();
    props.put(
        BoltString::from(IDENTITY_KEY),
        BoltType::from(entity.name.as_str()),
    );
    for (key, value) in &entity.attributes {
        props.put(BoltString::from(key.as_str()), attribute_to_bolt(value));
    }
    BoltType::Map(props)
}

fn attribute_to_bolt(value: &AttributeValue) -> BoltType {
    match value {
        AttributeValue::Bool(v) => BoltType::from(*v),
        AttributeValue::Int(v) => BoltType::from(*v),
        AttributeValue::Float(v) => BoltType::from(*v),
        AttributeValue::Text(v) => BoltType::from(v.as_str()),
    }
}
