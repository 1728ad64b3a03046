use neo4rs::query;

use librarian_common::{normalize_key, CategoryNode, KeywordNode, PageNode, SearchHit, SearchLeg};

use crate::migrate::PAGE_EMBEDDING_INDEX;
use crate::records::{
    category_from_row, embedding_to_f64, hit_from_row, keyword_from_row, page_from_row,
};
use crate::GraphClient;

/// Read-side wrapper for the graph. Serves the query tool and inspection
/// commands.
#[derive(Clone)]
pub struct GraphReader {
    client: GraphClient,
}

impl GraphReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub async fn get_page(&self, url: &str) -> Result<Option<PageNode>, neo4rs::Error> {
        let q = query(
            "MATCH (p:Page {url: $url})
             RETURN p.url AS url, p.title AS title, p.summary AS summary,
                    toString(p.created_at) AS created_at,
                    toString(p.last_updated) AS last_updated",
        )
        .param("url", url);

        let mut stream = self.client.graph.execute(q).await?;
        Ok(match stream.next().await? {
            Some(row) => page_from_row(&row),
            None => None,
        })
    }

    /// Look up a Category by name. The name is normalized to its key first.
    pub async fn get_category(&self, name: &str) -> Result<Option<CategoryNode>, neo4rs::Error> {
        let q = query(
            "MATCH (c:Category {key: $key})
             RETURN c.key AS key, c.name AS name, c.description AS description,
                    toString(c.created_at) AS created_at,
                    toString(c.last_updated) AS last_updated",
        )
        .param("key", normalize_key(name));

        let mut stream = self.client.graph.execute(q).await?;
        Ok(match stream.next().await? {
            Some(row) => category_from_row(&row),
            None => None,
        })
    }

    /// Number of Category nodes whose key matches `name`. Anything other
    /// than 0 or 1 means the uniqueness constraint is missing.
    pub async fn count_categories(&self, name: &str) -> Result<i64, neo4rs::Error> {
        let q = query("MATCH (c:Category {key: $key}) RETURN count(c) AS n")
            .param("key", normalize_key(name));

        let mut stream = self.client.graph.execute(q).await?;
        Ok(match stream.next().await? {
            Some(row) => row.get("n").unwrap_or(0),
            None => 0,
        })
    }

    pub async fn categories_for_page(&self, url: &str) -> Result<Vec<CategoryNode>, neo4rs::Error> {
        let q = query(
            "MATCH (:Page {url: $url})-[:HAS_CATEGORY]->(c:Category)
             RETURN c.key AS key, c.name AS name, c.description AS description,
                    toString(c.created_at) AS created_at,
                    toString(c.last_updated) AS last_updated
             ORDER BY c.key",
        )
        .param("url", url);

        let mut stream = self.client.graph.execute(q).await?;
        let mut categories = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Some(c) = category_from_row(&row) {
                categories.push(c);
            }
        }
        Ok(categories)
    }

    pub async fn keywords_for_category(&self, name: &str) -> Result<Vec<KeywordNode>, neo4rs::Error> {
        let q = query(
            "MATCH (:Category {key: $key})-[:HAS_KEYWORD]->(k:Keyword)
             RETURN k.key AS key, k.name AS name,
                    toString(k.created_at) AS created_at,
                    toString(k.last_updated) AS last_updated
             ORDER BY k.key",
        )
        .param("key", normalize_key(name));

        let mut stream = self.client.graph.execute(q).await?;
        let mut keywords = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Some(k) = keyword_from_row(&row) {
                keywords.push(k);
            }
        }
        Ok(keywords)
    }

    /// Case-insensitive containment match of `text` against every
    /// non-embedding property of every node.
    pub async fn text_matches(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>, neo4rs::Error> {
        let q = query(
            "MATCH (n)
             WHERE any(k IN keys(n) WHERE k <> 'embedding'
                       AND toLower(toString(n[k])) CONTAINS toLower($text))
             RETURN labels(n) AS labels,
                    [k IN keys(n) WHERE k <> 'embedding' | [k, toString(n[k])]] AS pairs
             LIMIT $limit",
        )
        .param("text", text)
        .param("limit", limit as i64);

        let mut stream = self.client.graph.execute(q).await?;
        let mut hits = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Some(hit) = hit_from_row(&row, SearchLeg::TextMatch) {
                hits.push(hit);
            }
        }
        Ok(hits)
    }

    /// Top-k Pages by cosine similarity of their summary embedding.
    pub async fn similar_pages(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchHit>, neo4rs::Error> {
        let q = query(
            "CALL db.index.vector.queryNodes($index_name, $k, $embedding)
             YIELD node, score
             RETURN labels(node) AS labels,
                    [p IN keys(node) WHERE p <> 'embedding' | [p, toString(node[p])]] AS pairs,
                    score
             ORDER BY score DESC",
        )
        .param("index_name", PAGE_EMBEDDING_INDEX)
        .param("k", k as i64)
        .param("embedding", embedding_to_f64(embedding));

        let mut stream = self.client.graph.execute(q).await?;
        let mut hits = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Some(hit) = hit_from_row(&row, SearchLeg::Vector) {
                hits.push(hit);
            }
        }
        Ok(hits)
    }
}
