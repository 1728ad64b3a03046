use ai_client::CompletionParams;

/// A prompt for one model-backed pipeline step.
///
/// `template` holds `{name}` slots that `render` fills in.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub task: &'static str,
    pub system: &'static str,
    pub template: &'static str,
    pub params: CompletionParams,
}

impl PromptTemplate {
    /// Fill slots in one left-to-right pass. Inserted values are never
    /// rescanned, and unknown slots are kept verbatim.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let slot = after
                .find('}')
                .map(|close| &after[..close])
                .and_then(|name| vars.iter().find(|(n, _)| *n == name).map(|(_, v)| (name, *v)));
            match slot {
                Some((name, value)) => {
                    out.push_str(value);
                    rest = &after[name.len() + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

pub fn summarize() -> PromptTemplate {
    PromptTemplate {
        task: "summarize",
        system: "You are a research librarian. You write short, factual summaries of web pages \
                 for a personal reference library.",
        template: "Summarize the following page text in three to five sentences. \
                   Say what the page is about and what a reader would learn from it. \
                   Reply with the summary only.\n\n{text}",
        params: CompletionParams::new().temperature(0.3).max_tokens(400),
    }
}

pub fn categorize() -> PromptTemplate {
    PromptTemplate {
        task: "categorize",
        system: "You file library entries under broad subject categories.",
        template: "Suggest one to three broad subject categories for the page summarized below. \
                   Reply with the category names only, separated by commas.\n\n\
                   Summary:\n{summary}",
        params: CompletionParams::new()
            .temperature(0.2)
            .max_tokens(60)
            .top_p(1.0)
            .frequency_penalty(0.0)
            .presence_penalty(0.0),
    }
}

pub fn keywords() -> PromptTemplate {
    PromptTemplate {
        task: "keywords",
        system: "You index library entries with precise search keywords.",
        template: "List up to ten keywords for the page summarized below. Prefer nouns, \
                   proper names, organizations and places. Reply with the keywords only, \
                   separated by commas.\n\nSummary:\n{summary}",
        params: CompletionParams::new()
            .temperature(0.2)
            .max_tokens(120)
            .top_p(1.0)
            .frequency_penalty(0.0)
            .presence_penalty(0.0),
    }
}

pub fn answer() -> PromptTemplate {
    PromptTemplate {
        task: "answer",
        system: "You are a helpful librarian. Answer questions using only the knowledge graph \
                 results you are given. Mention the URLs of the pages you rely on. If the \
                 results do not answer the question, say so.",
        template: "Question: {question}\n\nKnowledge graph results:\n\n{context}",
        params: CompletionParams::new().temperature(0.2).max_tokens(800),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_every_slot() {
        let prompt = answer().render(&[("question", "Who purrs?"), ("context", "url: a")]);
        assert!(prompt.starts_with("Question: Who purrs?"));
        assert!(prompt.ends_with("url: a"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        let prompt = answer().render(&[
            ("question", "What does {context} mean?"),
            ("context", "url: a"),
        ]);
        assert!(prompt.starts_with("Question: What does {context} mean?"));
        assert_eq!(prompt.matches("url: a").count(), 1);
    }

    #[test]
    fn unknown_slots_are_left_alone() {
        let prompt = categorize().render(&[("text", "ignored")]);
        assert!(prompt.contains("{summary}"));
    }
}
