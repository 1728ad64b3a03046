use ai_client::{EmbedAgent, OpenAi};
use anyhow::Result;
use librarian_common::LibrarianError;

// --- TextEmbedder trait ---

#[async_trait::async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Summary and query embeddings via the OpenAI embeddings API.
pub struct Embedder {
    client: OpenAi,
}

impl Embedder {
    /// The vector index is sized for `model`'s output, so the same model
    /// must embed pages and queries.
    pub fn new(api_key: &str, model: &str) -> Self {
        let client = OpenAi::new(api_key, model).with_embedding_model(model);
        Self { client }
    }
}

#[async_trait::async_trait]
impl TextEmbedder for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed(text.to_string())
            .await
            .map_err(|e| LibrarianError::Embedding(format!("{e:#}")).into())
    }
}
