mod client;
pub(crate) mod types;

use crate::error::AiError;
use crate::params::CompletionParams;
use crate::traits::EmbedAgent;
use anyhow::Result;
use async_trait::async_trait;

use client::OpenAiClient;

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    embedding_model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: None,
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub(crate) fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    // =========================================================================
    // Convenience methods
    // =========================================================================

    /// Chat completion with explicit sampling parameters.
    ///
    /// `model` overrides the agent's default model for this call only.
    pub async fn chat_completion_with(
        &self,
        model: Option<&str>,
        system: impl Into<String>,
        user: impl Into<String>,
        params: &CompletionParams,
    ) -> Result<String> {
        let request = types::ChatRequest::new(model.unwrap_or(&self.model))
            .message(types::WireMessage::system(system))
            .message(types::WireMessage::user(user))
            .params(params);

        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::EmptyResponse("OpenAI").into())
    }

    /// Simple chat completion (convenience method).
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let params = CompletionParams::new().max_tokens(4096).temperature(0.0);
        self.chat_completion_with(None, system, user, &params).await
    }
}

// =============================================================================
// EmbedAgent Implementation
// =============================================================================

#[async_trait]
impl EmbedAgent for OpenAi {
    async fn embed(&self, text: impl Into<String> + Send) -> Result<Vec<f32>> {
        self.client()
            .embed(&self.embedding_model, &text.into())
            .await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.client()
            .embed_batch(&self.embedding_model, &texts)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_new() {
        let ai = OpenAi::new("sk-test", "gpt-4o-mini");
        assert_eq!(ai.model, "gpt-4o-mini");
        assert_eq!(ai.api_key, "sk-test");
        assert_eq!(ai.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_openai_with_embedding_model() {
        let ai = OpenAi::new("sk-test", "gpt-4o-mini")
            .with_embedding_model("text-embedding-3-large");
        assert_eq!(ai.embedding_model(), "text-embedding-3-large");
    }

    #[test]
    fn test_openai_with_base_url() {
        let ai = OpenAi::new("sk-test", "gpt-4o-mini").with_base_url("http://localhost:11434/v1");
        assert_eq!(ai.base_url, Some("http://localhost:11434/v1".to_string()));
    }

    #[test]
    fn unreachable_endpoint_is_an_error() {
        let ai = OpenAi::new("sk-test", "gpt-4o-mini").with_base_url("http://127.0.0.1:9/v1");
        let result = tokio_test::block_on(ai.chat_completion("system", "user"));
        assert!(result.is_err());
    }
}
