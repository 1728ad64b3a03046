use std::sync::Arc;

use tracing::{info, warn};

use librarian_common::Outcome;

use crate::prompts::{self, PromptTemplate};
use crate::search_tool::KnowledgeGraphTool;
use crate::traits::{CompletionRequest, LanguageModel};

pub const NOTHING_FOUND: &str = "Sorry, I couldn't find anything relevant.";

/// Answers questions from what the knowledge graph holds.
pub struct Librarian {
    tool: KnowledgeGraphTool,
    model: Arc<dyn LanguageModel>,
    prompt: PromptTemplate,
}

impl Librarian {
    pub fn new(tool: KnowledgeGraphTool, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            tool,
            model,
            prompt: prompts::answer(),
        }
    }

    pub async fn answer(&self, question: &str) -> String {
        let context = match self.tool.run(question).await {
            Outcome::Success(context) => context,
            Outcome::Empty(reason) => {
                info!(question, reason = reason.as_str(), "No graph results");
                return NOTHING_FOUND.to_string();
            }
            Outcome::Failed(reason) => {
                warn!(question, reason = reason.as_str(), "Graph search failed");
                return NOTHING_FOUND.to_string();
            }
        };

        let request = CompletionRequest {
            task: self.prompt.task,
            model: None,
            system: self.prompt.system.to_string(),
            user: self
                .prompt
                .render(&[("question", question.trim()), ("context", context.as_str())]),
            params: self.prompt.params.clone(),
        };

        match self.model.complete(&request).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => {
                warn!(question, "Model returned an empty answer");
                NOTHING_FOUND.to_string()
            }
            Err(e) => {
                warn!(question, error = %e, "Answer completion failed");
                NOTHING_FOUND.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page_hit, FixedEmbedder, MockSearch, ScriptedModel};
    use librarian_common::SearchLeg;

    fn librarian(search: MockSearch, model: Arc<ScriptedModel>) -> Librarian {
        let tool = KnowledgeGraphTool::new(Arc::new(search), Arc::new(FixedEmbedder::new(8)));
        Librarian::new(tool, model)
    }

    #[tokio::test]
    async fn no_results_apologizes_without_calling_the_model() {
        let model = Arc::new(ScriptedModel::new().on("answer", "should not be used"));
        let answer = librarian(MockSearch::new(), model.clone())
            .answer("Which pets purr?")
            .await;
        assert_eq!(answer, NOTHING_FOUND);
        assert_eq!(model.call_count("answer"), 0);
    }

    #[tokio::test]
    async fn graph_results_are_sent_as_context() {
        let model = Arc::new(ScriptedModel::new().on("answer", "Cats purr. See https://example.com/a"));
        let search = MockSearch::new()
            .with_text_hits(vec![page_hit(SearchLeg::TextMatch, "https://example.com/a")]);

        let answer = librarian(search, model.clone()).answer("Which pets purr?").await;
        assert_eq!(answer, "Cats purr. See https://example.com/a");

        let call = model.last_call("answer").unwrap();
        assert!(call.user.contains("Question: Which pets purr?"));
        assert!(call.user.contains("url: https://example.com/a"));
    }

    #[tokio::test]
    async fn model_failure_apologizes() {
        let model = Arc::new(ScriptedModel::new().fail("answer", "overloaded"));
        let search = MockSearch::new()
            .with_text_hits(vec![page_hit(SearchLeg::TextMatch, "https://example.com/a")]);
        assert_eq!(librarian(search, model).answer("Cats?").await, NOTHING_FOUND);
    }
}
