use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use librarian_common::{Outcome, SearchHit};

use crate::embedder::TextEmbedder;
use crate::traits::KnowledgeSearch;

pub const TOOL_NAME: &str = "knowledge_graph_search";
pub const TOOL_DESCRIPTION: &str = "Search the bookmark knowledge graph. Matches the query text \
    against pages, categories and keywords, and finds pages whose summaries are semantically \
    similar to the query.";

pub const DEFAULT_TEXT_LIMIT: usize = 25;
pub const DEFAULT_VECTOR_TOP_K: usize = 5;

/// Text-match plus vector search over the knowledge graph.
pub struct KnowledgeGraphTool {
    search: Arc<dyn KnowledgeSearch>,
    embedder: Arc<dyn TextEmbedder>,
    text_limit: usize,
    vector_top_k: usize,
}

impl KnowledgeGraphTool {
    pub fn new(search: Arc<dyn KnowledgeSearch>, embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            search,
            embedder,
            text_limit: DEFAULT_TEXT_LIMIT,
            vector_top_k: DEFAULT_VECTOR_TOP_K,
        }
    }

    pub fn with_limits(mut self, text_limit: usize, vector_top_k: usize) -> Self {
        self.text_limit = text_limit;
        self.vector_top_k = vector_top_k;
        self
    }

    /// Text-match hits followed by vector hits, not de-duplicated.
    ///
    /// One failing leg is logged and the other leg's hits are returned.
    /// Errors only when both legs fail.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let text_leg = self.search.text_matches(query, self.text_limit).await;
        let vector_leg = self.vector_leg(query).await;

        match (text_leg, vector_leg) {
            (Ok(mut text_hits), Ok(vector_hits)) => {
                debug!(text = text_hits.len(), vector = vector_hits.len(), "Search hits");
                text_hits.extend(vector_hits);
                Ok(text_hits)
            }
            (Ok(text_hits), Err(e)) => {
                warn!(error = %e, "Vector search failed, returning text matches only");
                Ok(text_hits)
            }
            (Err(e), Ok(vector_hits)) => {
                warn!(error = %e, "Text match failed, returning vector hits only");
                Ok(vector_hits)
            }
            (Err(text_err), Err(vector_err)) => Err(anyhow!(
                "knowledge graph search failed: text match: {text_err:#}; vector: {vector_err:#}"
            )),
        }
    }

    /// Tool entry point: rendered hits separated by blank lines.
    pub async fn run(&self, query: &str) -> Outcome<String> {
        let query = query.trim();
        if query.is_empty() {
            return Outcome::empty("empty query");
        }

        match self.search(query).await {
            Ok(hits) if hits.is_empty() => Outcome::empty(format!("no results for {query:?}")),
            Ok(hits) => Outcome::Success(render_hits(&hits)),
            Err(e) => {
                warn!(query, error = %e, "Knowledge graph search failed");
                Outcome::failed(format!("{e:#}"))
            }
        }
    }

    async fn vector_leg(&self, query: &str) -> Result<Vec<SearchHit>> {
        let embedding = self.embedder.embed(query).await?;
        self.search.similar_pages(&embedding, self.vector_top_k).await
    }
}

pub fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(SearchHit::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page_hit, FixedEmbedder, MockSearch};
    use librarian_common::SearchLeg;

    fn tool(search: MockSearch) -> KnowledgeGraphTool {
        KnowledgeGraphTool::new(Arc::new(search), Arc::new(FixedEmbedder::new(8)))
    }

    #[tokio::test]
    async fn text_hits_come_before_vector_hits() {
        let search = MockSearch::new()
            .with_text_hits(vec![page_hit(SearchLeg::TextMatch, "https://example.com/a")])
            .with_vector_hits(vec![
                page_hit(SearchLeg::Vector, "https://example.com/a"),
                page_hit(SearchLeg::Vector, "https://example.com/b"),
            ]);

        let hits = tool(search).search("cats").await.unwrap();
        let legs: Vec<SearchLeg> = hits.iter().map(|h| h.leg).collect();
        assert_eq!(legs, vec![SearchLeg::TextMatch, SearchLeg::Vector, SearchLeg::Vector]);
    }

    #[tokio::test]
    async fn one_failing_leg_returns_the_other() {
        let search = MockSearch::new()
            .failing_text()
            .with_vector_hits(vec![page_hit(SearchLeg::Vector, "https://example.com/b")]);
        let hits = tool(search).search("cats").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].property("url"), Some("https://example.com/b"));

        let search = MockSearch::new()
            .failing_vector()
            .with_text_hits(vec![page_hit(SearchLeg::TextMatch, "https://example.com/a")]);
        let hits = tool(search).search("cats").await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn embedding_failure_counts_as_vector_failure() {
        let search = MockSearch::new()
            .with_text_hits(vec![page_hit(SearchLeg::TextMatch, "https://example.com/a")]);
        let tool = KnowledgeGraphTool::new(Arc::new(search), Arc::new(FixedEmbedder::failing()));
        assert_eq!(tool.search("cats").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn both_legs_failing_is_an_error() {
        let tool = tool(MockSearch::new().failing_text().failing_vector());
        assert!(tool.search("cats").await.is_err());
        assert!(matches!(tool.run("cats").await, Outcome::Failed(_)));
    }

    #[tokio::test]
    async fn run_renders_hits_with_blank_lines() {
        let search = MockSearch::new().with_text_hits(vec![
            page_hit(SearchLeg::TextMatch, "https://example.com/a"),
            page_hit(SearchLeg::TextMatch, "https://example.com/b"),
        ]);
        let text = tool(search).run("cats").await.success().unwrap();
        let blocks: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("url: https://example.com/a"));
    }

    #[tokio::test]
    async fn no_hits_or_blank_query_is_empty() {
        let search = Arc::new(MockSearch::new());
        let tool = KnowledgeGraphTool::new(search.clone(), Arc::new(FixedEmbedder::new(8)));
        assert!(matches!(tool.run("giraffe").await, Outcome::Empty(_)));
        assert!(matches!(tool.run("   ").await, Outcome::Empty(_)));
        assert_eq!(search.text_queries(), vec!["giraffe".to_string()]);
    }

    #[tokio::test]
    async fn limits_reach_the_search() {
        let search = Arc::new(MockSearch::new());
        let tool = KnowledgeGraphTool::new(search.clone(), Arc::new(FixedEmbedder::new(8)))
            .with_limits(10, 3);
        tool.search("cats").await.unwrap();
        assert_eq!(search.last_limits(), Some((10, 3)));
    }
}
