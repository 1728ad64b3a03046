// Trait abstractions for the pipeline's external collaborators.
//
// PageFetcher: raw page bytes over HTTP.
// LanguageModel: one chat completion per call.
// KnowledgeStore: the write side of the graph (Graph Materializer).
// KnowledgeSearch: the two read legs used by the query tool.
//
// These enable deterministic testing with the mocks in `testing`:
// no network, no database, no Docker.

use anyhow::Result;
use async_trait::async_trait;

use ai_client::{Claude, CompletionParams, OpenAi};
use librarian_common::{CategoryNode, KeywordNode, LibrarianError, PageNode, SearchHit};
use librarian_graph::{GraphReader, GraphWriter};

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw HTML of a page.
    async fn fetch(&self, url: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// LanguageModel
// ---------------------------------------------------------------------------

/// One completion call. `task` names the pipeline step for logs and mocks.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub task: &'static str,
    /// Overrides the provider's default model for this call.
    pub model: Option<String>,
    pub system: String,
    pub user: String,
    pub params: CompletionParams,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
impl LanguageModel for OpenAi {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.chat_completion_with(
            request.model.as_deref(),
            request.system.as_str(),
            request.user.as_str(),
            &request.params,
        )
        .await
        .map_err(|e| LibrarianError::LanguageModel(format!("{e:#}")).into())
    }
}

#[async_trait]
impl LanguageModel for Claude {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.chat_completion_with(
            request.model.as_deref(),
            request.system.as_str(),
            request.user.as_str(),
            &request.params,
        )
        .await
        .map_err(|e| LibrarianError::LanguageModel(format!("{e:#}")).into())
    }
}

// ---------------------------------------------------------------------------
// KnowledgeStore: Graph Materializer
// ---------------------------------------------------------------------------

/// Each method is one transaction: it either fully applies or returns an
/// error with nothing written.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn save_page(&self, page: &PageNode, embedding: Option<&[f32]>) -> Result<()>;

    async fn save_category(
        &self,
        page_url: &str,
        category: &CategoryNode,
        keywords: &[KeywordNode],
    ) -> Result<()>;
}

#[async_trait]
impl KnowledgeStore for GraphWriter {
    async fn save_page(&self, page: &PageNode, embedding: Option<&[f32]>) -> Result<()> {
        GraphWriter::save_page(self, page, embedding)
            .await
            .map_err(|e| LibrarianError::Graph(e.to_string()).into())
    }

    async fn save_category(
        &self,
        page_url: &str,
        category: &CategoryNode,
        keywords: &[KeywordNode],
    ) -> Result<()> {
        GraphWriter::save_category(self, page_url, category, keywords)
            .await
            .map_err(|e| LibrarianError::Graph(e.to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// KnowledgeSearch: query tool legs
// ---------------------------------------------------------------------------

#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// Containment match of `text` over node properties.
    async fn text_matches(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Top-k pages by embedding similarity.
    async fn similar_pages(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchHit>>;
}

#[async_trait]
impl KnowledgeSearch for GraphReader {
    async fn text_matches(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        GraphReader::text_matches(self, text, limit)
            .await
            .map_err(|e| LibrarianError::Graph(e.to_string()).into())
    }

    async fn similar_pages(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        GraphReader::similar_pages(self, embedding, k)
            .await
            .map_err(|e| LibrarianError::Graph(e.to_string()).into())
    }
}
