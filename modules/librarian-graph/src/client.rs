use neo4rs::{ConfigBuilder, Graph};
use tracing::info;

use librarian_common::Config;

/// Thin wrapper around neo4rs::Graph providing connection setup.
///
/// Cloning is cheap: clones share the same connection pool. The pool is
/// closed when the last clone is dropped.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given credentials.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()?;
        let graph = Graph::connect(config).await?;
        info!(uri, "Connected to graph database");
        Ok(Self { graph })
    }

    /// Connect using the application configuration.
    pub async fn from_config(config: &Config) -> Result<Self, neo4rs::Error> {
        Self::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password).await
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}
