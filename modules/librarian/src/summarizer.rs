use std::sync::Arc;

use ai_client::{truncate_to_char_boundary, CompletionParams};
use tracing::{info, warn};

use librarian_common::Outcome;

use crate::prompts::{self, PromptTemplate};
use crate::traits::{CompletionRequest, LanguageModel};

pub const NO_CONTENT: &str = "No content provided to summarize.";

/// Page text past this many bytes is cut before it reaches the model.
pub const MAX_INPUT_BYTES: usize = 24_000;

pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    prompt: PromptTemplate,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompt: prompts::summarize(),
        }
    }

    pub async fn summarize(&self, text: &str) -> Outcome<String> {
        self.summarize_with(text, None, None).await
    }

    /// Summarize with an optional model override and sampling overrides
    /// layered over the prompt's defaults.
    pub async fn summarize_with(
        &self,
        text: &str,
        model: Option<&str>,
        overrides: Option<&CompletionParams>,
    ) -> Outcome<String> {
        let text = text.trim();
        if text.is_empty() {
            return Outcome::empty(NO_CONTENT);
        }

        let input = truncate_to_char_boundary(text, MAX_INPUT_BYTES);
        if input.len() < text.len() {
            info!(original = text.len(), kept = input.len(), "Truncated page text for summary");
        }

        let params = match overrides {
            Some(o) => self.prompt.params.merged(o),
            None => self.prompt.params.clone(),
        };
        let request = CompletionRequest {
            task: self.prompt.task,
            model: model.map(String::from),
            system: self.prompt.system.to_string(),
            user: self.prompt.render(&[("text", input)]),
            params,
        };

        match self.model.complete(&request).await {
            Ok(summary) => {
                let summary = summary.trim();
                if summary.is_empty() {
                    Outcome::empty("model returned an empty summary")
                } else {
                    Outcome::Success(summary.to_string())
                }
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                Outcome::failed(format!("summarization failed: {e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn blank_input_skips_the_model() {
        let model = Arc::new(ScriptedModel::new());
        let summarizer = Summarizer::new(model.clone());

        assert_eq!(summarizer.summarize("   \n ").await, Outcome::empty(NO_CONTENT));
        assert_eq!(model.call_count("summarize"), 0);
    }

    #[tokio::test]
    async fn summary_is_trimmed() {
        let model = Arc::new(ScriptedModel::new().on("summarize", "  Cats purr.\n"));
        let summarizer = Summarizer::new(model);
        assert_eq!(
            summarizer.summarize("Cats are popular pets.").await,
            Outcome::Success("Cats purr.".to_string())
        );
    }

    #[tokio::test]
    async fn model_error_is_failed_not_text() {
        let model = Arc::new(ScriptedModel::new().fail("summarize", "rate limited"));
        let summarizer = Summarizer::new(model);
        let outcome = summarizer.summarize("Cats are popular pets.").await;
        assert!(matches!(outcome, Outcome::Failed(ref r) if r.contains("rate limited")));
    }

    #[tokio::test]
    async fn overrides_reach_the_model() {
        let model = Arc::new(ScriptedModel::new().on("summarize", "ok"));
        let summarizer = Summarizer::new(model.clone());

        let overrides = CompletionParams::new().temperature(0.9);
        summarizer
            .summarize_with("Some text", Some("gpt-4o"), Some(&overrides))
            .await;

        let call = model.last_call("summarize").unwrap();
        assert_eq!(call.model.as_deref(), Some("gpt-4o"));
        assert_eq!(call.params.temperature, Some(0.9));
        assert_eq!(call.params.max_tokens, Some(400));
        assert!(call.user.ends_with("Some text"));
    }

    #[tokio::test]
    async fn long_input_is_truncated() {
        let model = Arc::new(ScriptedModel::new().on("summarize", "ok"));
        let summarizer = Summarizer::new(model.clone());

        let text = "é".repeat(MAX_INPUT_BYTES);
        summarizer.summarize(&text).await;

        let call = model.last_call("summarize").unwrap();
        assert!(call.user.len() < text.len());
    }
}
