//! Read operations for the Neo4j store, and its `GraphStore` implementation.

use async_trait::async_trait;
use neo4rs::{query, Query, Row};

use kinship_core::types::IDENTITY_KEY;
use kinship_core::{Attributes, Entity, GraphSnapshot, Relation};

use crate::client::{GraphClient, GraphError};
use crate::mutations::{Neo4jTxn, PERSON_LABEL};
use crate::store::GraphStore;

impl GraphClient {
    /// Run several read queries inside one transaction so they observe the
    /// same committed state.
    async fn read_consistent(&self, queries: Vec<Query>) -> Result<Vec<Vec<Row>>, GraphError> {
        let mut txn = self.begin().await?;
        let mut results = Vec::with_capacity(queries.len());
        for q in queries {
            let mut stream = txn.execute(q).await?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next(txn.handle()).await? {
                rows.push(row);
            }
            results.push(rows);
        }
        txn.commit().await?;
        Ok(results)
    }

    async fn count(&self, cypher: &str) -> Result<usize, GraphError> {
        match self.fetch_first(query(cypher)).await? {
            Some(row) => read_count(&row),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl GraphStore for GraphClient {
    type Txn = Neo4jTxn;

    async fn begin_write(&self) -> Result<Neo4jTxn, GraphError> {
        Ok(Neo4jTxn::new(self.begin().await?))
    }

    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<GraphSnapshot, GraphError> {
        // Internal ids grow with creation, which keeps the insertion order
        // that path tie-breaking depends on.
        let nodes = query(&format!(
            "MATCH (n:{PERSON_LABEL})
             RETURN n.name AS name, properties(n) AS props
             ORDER BY id(n)"
        ));
        let edges = query(&format!(
            "MATCH (a:{PERSON_LABEL})-[r]->(b:{PERSON_LABEL})
             RETURN a.name AS source, b.name AS target, type(r) AS kind
             ORDER BY id(r)"
        ));

        let mut results = self.read_consistent(vec![nodes, edges]).await?.into_iter();
        let node_rows = results.next().unwrap_or_default();
        let edge_rows = results.next().unwrap_or_default();

        let mut entities = Vec::with_capacity(node_rows.len());
        for row in &node_rows {
            entities.push(row_to_entity(row)?);
        }

        let mut relations = Vec::with_capacity(edge_rows.len());
        for row in &edge_rows {
            relations.push(row_to_relation(row)?);
        }

        tracing::debug!(
            entities = entities.len(),
            relations = relations.len(),
            "Fetched snapshot"
        );
        Ok(GraphSnapshot {
            entities,
            relations,
        })
    }

    async fn friends_of(&self, name: &str, kind: &str) -> Result<Vec<Entity>, GraphError> {
        kinship_core::types::validate_kind(kind)?;
        let q = query(&format!(
            "MATCH (a:{PERSON_LABEL} {{name: $name}})
             OPTIONAL MATCH (a)-[r:{kind}]->(friend:{PERSON_LABEL})
             RETURN friend.name AS name, properties(friend) AS props
             ORDER BY id(r)"
        ))
        .param("name", name.to_string());

        let rows = self.fetch_all(q).await?;
        if rows.is_empty() {
            return Err(GraphError::EntityNotFound {
                name: name.to_string(),
            });
        }

        let mut friends = Vec::new();
        for row in &rows {
            // OPTIONAL MATCH yields a single null row when there are no friends.
            if row.get::<Option<String>>("name").ok().flatten().is_some() {
                friends.push(row_to_entity(row)?);
            }
        }
        Ok(friends)
    }

    async fn entity_count(&self) -> Result<usize, GraphError> {
        self.count(&format!("MATCH (n:{PERSON_LABEL}) RETURN count(n) AS cnt"))
            .await
    }

    async fn relation_count(&self) -> Result<usize, GraphError> {
        self.count(&format!(
            "MATCH (:{PERSON_LABEL})-[r]->(:{PERSON_LABEL}) RETURN count(r) AS cnt"
        ))
        .await
    }
}

fn read_count(row: &Row) -> Result<usize, GraphError> {
    let cnt: i64 = row
        .get("cnt")
        .map_err(|e| GraphError::Serialization(format!("Failed to read count: {e}")))?;
    usize::try_from(cnt)
        .map_err(|_| GraphError::Serialization(format!("Count out of range: {cnt}")))
}

/// Convert a `name` / `props` row into an Entity.
fn row_to_entity(row: &Row) -> Result<Entity, GraphError> {
    let name: String = row
        .get("name")
        .map_err(|e| GraphError::Serialization(format!("Failed to read entity name: {e}")))?;
    let mut props: Attributes = row.get("props").map_err(|e| {
        GraphError::Serialization(format!("Failed to read properties of {name}: {e}"))
    })?;
    props.remove(IDENTITY_KEY);

    Ok(Entity {
        name,
        attributes: props,
    })
}

fn row_to_relation(row: &Row) -> Result<Relation, GraphError> {
    let field = |key: &str| {
        row.get::<String>(key)
            .map_err(|e| GraphError::Serialization(format!("Failed to read relation {key}: {e}")))
    };
    Ok(Relation {
        from: field("source")?,
        to: field("target")?,
        kind: field("kind")?,
    })
}
