//! Neo4j connection management and shared graph client.

use neo4rs::{ConfigBuilder, Graph, Query, Row};

use kinship_core::config::Neo4jSettings;
use kinship_core::{ContextError, ValidationError};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Store failure: {0}")]
    Store(#[from] neo4rs::Error),

    #[error("Entity not found: {name}")]
    EntityNotFound { name: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Neo4jSettings::default().into()
    }
}

impl From<Neo4jSettings> for GraphConfig {
    fn from(settings: Neo4jSettings) -> Self {
        Self {
            uri: settings.uri,
            user: settings.user,
            password: settings.password,
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Clone is cheap (inner Arc). The client is created by the caller and passed
/// to the mutator and path engine explicitly.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Open the connection pool. Fails fast on a bad URI or credentials so the
    /// CLI reports the problem before any batch is read.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let connection_error = |e: neo4rs::Error| GraphError::Connection(e.to_string());

        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(connection_error)?;
        let graph = Graph::connect(neo_config).await.map_err(connection_error)?;

        tracing::info!(uri = %config.uri, user = %config.user, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Auto-commit statement with no result rows. Batches never use this; it
    /// is for schema setup and housekeeping.
    pub async fn run(&self, statement: Query) -> Result<(), GraphError> {
        self.graph.run(statement).await?;
        Ok(())
    }

    /// Auto-commit read returning every row.
    pub async fn fetch_all(&self, read: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(read).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Auto-commit read for single-row aggregates.
    pub async fn fetch_first(&self, read: Query) -> Result<Option<Row>, GraphError> {
        let mut stream = self.graph.execute(read).await?;
        Ok(stream.next().await?)
    }

    /// Explicit transaction for batch writes and consistent multi-query reads.
    pub async fn begin(&self) -> Result<neo4rs::Txn, GraphError> {
        Ok(self.graph.start_txn().await?)
    }
}
