use neo4rs::query;
use tracing::{info, warn};

use crate::GraphClient;

/// Name of the vector index over `Page.embedding`.
pub const PAGE_EMBEDDING_INDEX: &str = "page_embedding";

/// Run idempotent schema migrations: constraints, indexes.
/// Statements use IF NOT EXISTS; "already exists" errors from equivalent
/// schema under another name are ignored as well.
pub async fn migrate(client: &GraphClient, embedding_dimensions: usize) -> Result<(), neo4rs::Error> {
    let g = &client.graph;

    info!("Running schema migrations...");

    // --- Uniqueness constraints (upsert keys) ---
    let constraints = [
        "CREATE CONSTRAINT page_url IF NOT EXISTS FOR (p:Page) REQUIRE p.url IS UNIQUE",
        "CREATE CONSTRAINT category_key IF NOT EXISTS FOR (c:Category) REQUIRE c.key IS UNIQUE",
        "CREATE CONSTRAINT keyword_key IF NOT EXISTS FOR (k:Keyword) REQUIRE k.key IS UNIQUE",
    ];

    for c in &constraints {
        run_ignoring_exists(g, c).await?;
    }
    info!("Uniqueness constraints created");

    // --- Property indexes ---
    let indexes = [
        "CREATE INDEX page_title IF NOT EXISTS FOR (p:Page) ON (p.title)",
        "CREATE INDEX category_name IF NOT EXISTS FOR (c:Category) ON (c.name)",
    ];

    for idx in &indexes {
        run_ignoring_exists(g, idx).await?;
    }
    info!("Property indexes created");

    // --- Vector index over page summaries ---
    let vector = vector_index_statement(embedding_dimensions);
    run_ignoring_exists(g, &vector).await?;
    info!(dimensions = embedding_dimensions, "Vector index created");

    Ok(())
}

fn vector_index_statement(dimensions: usize) -> String {
    format!(
        "CREATE VECTOR INDEX {PAGE_EMBEDDING_INDEX} IF NOT EXISTS
         FOR (p:Page) ON (p.embedding)
         OPTIONS {{indexConfig: {{`vector.dimensions`: {dimensions}, `vector.similarity_function`: 'cosine'}}}}"
    )
}

async fn run_ignoring_exists(g: &neo4rs::Graph, cypher: &str) -> Result<(), neo4rs::Error> {
    match g.run(query(cypher)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("already exists") || msg.contains("equivalent") {
                warn!(
                    "Already exists (skipped): {}",
                    cypher.chars().take(80).collect::<String>()
                );
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_index_uses_configured_dimensions() {
        let stmt = vector_index_statement(1536);
        assert!(stmt.contains("`vector.dimensions`: 1536"));
        assert!(stmt.contains("CREATE VECTOR INDEX page_embedding IF NOT EXISTS"));
        assert!(stmt.contains("'cosine'"));
    }
}
