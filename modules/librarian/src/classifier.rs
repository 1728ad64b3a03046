use std::sync::Arc;

use ai_client::{strip_code_blocks, strip_list_label};
use tracing::warn;

use librarian_common::Outcome;

use crate::prompts::{self, PromptTemplate};
use crate::traits::{CompletionRequest, LanguageModel};

/// Split a comma-separated model answer into trimmed, non-empty items.
/// Order is kept and duplicates pass through.
pub fn split_list(raw: &str) -> Vec<String> {
    let body = strip_list_label(strip_code_blocks(raw));
    body.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Send a list-style prompt for `summary` and split the answer.
pub(crate) async fn ask_for_list(
    model: &dyn LanguageModel,
    prompt: &PromptTemplate,
    summary: &str,
) -> Outcome<Vec<String>> {
    let request = CompletionRequest {
        task: prompt.task,
        model: None,
        system: prompt.system.to_string(),
        user: prompt.render(&[("summary", summary)]),
        params: prompt.params.clone(),
    };

    match model.complete(&request).await {
        Ok(raw) => {
            let items = split_list(&raw);
            if items.is_empty() {
                Outcome::empty(format!("model returned no {}", prompt.task))
            } else {
                Outcome::Success(items)
            }
        }
        Err(e) => {
            warn!(task = prompt.task, error = %e, "List completion failed");
            Outcome::failed(format!("{} failed: {e:#}", prompt.task))
        }
    }
}

pub struct CategoryClassifier {
    model: Arc<dyn LanguageModel>,
    prompt: PromptTemplate,
}

impl CategoryClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompt: prompts::categorize(),
        }
    }

    /// Category labels for a page summary, exactly as the model named them.
    pub async fn classify(&self, summary: &str) -> Outcome<Vec<String>> {
        ask_for_list(self.model.as_ref(), &self.prompt, summary).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[test]
    fn labels_are_split_and_trimmed() {
        assert_eq!(split_list("Pets, Animals"), vec!["Pets", "Animals"]);
        assert_eq!(split_list(" Pets ,, Animals ,"), vec!["Pets", "Animals"]);
    }

    #[test]
    fn fences_and_leading_label_are_ignored() {
        assert_eq!(
            split_list("```\nCategories: Pets, Animals\n```"),
            vec!["Pets", "Animals"]
        );
    }

    #[test]
    fn duplicates_and_odd_labels_pass_through() {
        assert_eq!(split_list("Pets, pets, ???"), vec!["Pets", "pets", "???"]);
    }

    #[tokio::test]
    async fn classify_uses_the_summary() {
        let model = Arc::new(ScriptedModel::new().on("categorize", "Pets, Animals"));
        let classifier = CategoryClassifier::new(model.clone());

        let labels = classifier.classify("Cats are popular pets.").await;
        assert_eq!(labels, Outcome::Success(vec!["Pets".into(), "Animals".into()]));

        let call = model.last_call("categorize").unwrap();
        assert!(call.user.contains("Cats are popular pets."));
        assert_eq!(call.params.max_tokens, Some(60));
    }

    #[tokio::test]
    async fn blank_answer_is_empty() {
        let model = Arc::new(ScriptedModel::new().on("categorize", " , "));
        let classifier = CategoryClassifier::new(model);
        assert!(matches!(classifier.classify("x").await, Outcome::Empty(_)));
    }

    #[tokio::test]
    async fn failure_is_failed() {
        let model = Arc::new(ScriptedModel::new().fail("categorize", "timeout"));
        let classifier = CategoryClassifier::new(model);
        assert!(matches!(classifier.classify("x").await, Outcome::Failed(_)));
    }
}
