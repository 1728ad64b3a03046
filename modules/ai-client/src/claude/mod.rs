mod client;
pub(crate) mod types;

use crate::error::AiError;
use crate::params::CompletionParams;
use anyhow::Result;

use client::ClaudeClient;
use types::*;

// =============================================================================
// Claude Agent
// =============================================================================

#[derive(Clone)]
pub struct Claude {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
}

impl Claude {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> ClaudeClient {
        let client = ClaudeClient::new(&self.api_key);
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
        let request = ChatRequest::new(model.unwrap_or(&self.model))
            .system(system)
            .message(WireMessage::user(user))
            .params(params);

        let response = self.client().chat(&request).await?;

        response
            .text()
            .ok_or_else(|| AiError::EmptyResponse("Claude").into())
    }

    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let params = CompletionParams::new().max_tokens(4096).temperature(0.0);
        self.chat_completion_with(None, system, user, &params).await
    }
}
