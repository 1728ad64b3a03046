use neo4rs::{query, Query};
use tracing::{debug, info, warn};

use librarian_common::{CategoryNode, KeywordNode, PageNode};

use crate::records::{embedding_to_f64, format_datetime};
use crate::GraphClient;

/// Write-side wrapper for the graph. Used by the ingestion pipeline only.
///
/// Every public write is one transaction. A failing statement rolls the
/// whole transaction back and the error is returned to the caller.
#[derive(Clone)]
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Upsert a Page by URL.
    pub async fn save_page(
        &self,
        page: &PageNode,
        embedding: Option<&[f32]>,
    ) -> Result<(), neo4rs::Error> {
        let statements = vec![page_statement(page, embedding)];
        self.run_atomic("save_page", statements).await?;
        info!(url = page.url.as_str(), "Page saved");
        Ok(())
    }

    /// Upsert a Category, link it from its Page, and upsert + link each
    /// Keyword, all inside one transaction.
    pub async fn save_category(
        &self,
        page_url: &str,
        category: &CategoryNode,
        keywords: &[KeywordNode],
    ) -> Result<(), neo4rs::Error> {
        let statements = category_statements(page_url, category, keywords);
        self.run_atomic("save_category", statements).await?;
        info!(
            category = category.name.as_str(),
            keywords = keywords.len(),
            "Category saved"
        );
        Ok(())
    }

    /// Run `statements` in order inside a single transaction.
    ///
    /// On the first failing statement the transaction is rolled back and
    /// the statement's error is returned. A rollback failure is logged and
    /// does not replace the original error.
    pub async fn run_atomic(
        &self,
        label: &str,
        statements: Vec<Query>,
    ) -> Result<(), neo4rs::Error> {
        let mut txn = self.client.graph.start_txn().await?;
        let total = statements.len();

        for (i, q) in statements.into_iter().enumerate() {
            if let Err(e) = txn.run(q).await {
                warn!(
                    unit = label,
                    statement = i + 1,
                    total,
                    error = %e,
                    "Graph write failed, rolling back"
                );
                if let Err(rb) = txn.rollback().await {
                    warn!(unit = label, error = %rb, "Rollback failed");
                }
                return Err(e);
            }
        }

        txn.commit().await?;
        debug!(unit = label, statements = total, "Transaction committed");
        Ok(())
    }
}

/// MERGE a Page by URL. `created_at` is set once; title (when non-empty),
/// summary, embedding (when given) and `last_updated` are refreshed.
pub fn page_statement(page: &PageNode, embedding: Option<&[f32]>) -> Query {
    let set_embedding = if embedding.is_some() {
        ", p.embedding = $embedding"
    } else {
        ""
    };
    let cypher = format!(
        "MERGE (p:Page {{url: $url}})
         ON CREATE SET p.created_at = datetime($created_at), p.title = $title
         SET p.summary = $summary,
             p.title = CASE WHEN $title = '' THEN coalesce(p.title, '') ELSE $title END,
             p.last_updated = datetime($now){set_embedding}"
    );
    let q = query(&cypher)
        .param("url", page.url.as_str())
        .param("title", page.title.as_str())
        .param("summary", page.summary.as_str())
        .param("created_at", format_datetime(&page.created_at))
        .param("now", format_datetime(&page.last_updated));
    match embedding {
        Some(e) => q.param("embedding", embedding_to_f64(e)),
        None => q,
    }
}

/// MERGE a Category by key. The description is overwritten on every write.
pub fn category_statement(category: &CategoryNode) -> Query {
    query(
        "MERGE (c:Category {key: $key})
         ON CREATE SET c.name = $name, c.created_at = datetime($created_at)
         SET c.description = $description,
             c.last_updated = datetime($now)",
    )
    .param("key", category.key.as_str())
    .param("name", category.name.as_str())
    .param("description", category.description.as_str())
    .param("created_at", format_datetime(&category.created_at))
    .param("now", format_datetime(&category.last_updated))
}

/// MERGE the Page→Category edge. A missing Page matches nothing and the
/// statement is a no-op.
pub fn page_category_statement(page_url: &str, category_key: &str) -> Query {
    query(
        "MATCH (p:Page {url: $url})
         MATCH (c:Category {key: $key})
         MERGE (p)-[:HAS_CATEGORY]->(c)",
    )
    .param("url", page_url)
    .param("key", category_key)
}

/// MERGE a Keyword by key and the Category→Keyword edge.
pub fn keyword_statement(category_key: &str, keyword: &KeywordNode) -> Query {
    query(
        "MATCH (c:Category {key: $category_key})
         MERGE (k:Keyword {key: $key})
         ON CREATE SET k.name = $name, k.created_at = datetime($created_at)
         SET k.last_updated = datetime($now)
         MERGE (c)-[:HAS_KEYWORD]->(k)",
    )
    .param("category_key", category_key)
    .param("key", keyword.key.as_str())
    .param("name", keyword.name.as_str())
    .param("created_at", format_datetime(&keyword.created_at))
    .param("now", format_datetime(&keyword.last_updated))
}

/// The full statement list for one category unit of work, in execution
/// order: category, page edge, then one statement per keyword.
pub fn category_statements(
    page_url: &str,
    category: &CategoryNode,
    keywords: &[KeywordNode],
) -> Vec<Query> {
    let mut statements = Vec::with_capacity(keywords.len() + 2);
    statements.push(category_statement(category));
    statements.push(page_category_statement(page_url, &category.key));
    for keyword in keywords {
        statements.push(keyword_statement(&category.key, keyword));
    }
    statements
}
