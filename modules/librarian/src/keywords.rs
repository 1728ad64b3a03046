use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use librarian_common::{normalize_key, Outcome};

use crate::classifier::ask_for_list;
use crate::prompts::{self, PromptTemplate};
use crate::tagger::{EntityKind, LexiconTagger, PartOfSpeech, TermTagger};
use crate::traits::LanguageModel;

/// Compared case-sensitively, so "The" is not a stop word.
const STOP_WORDS: &[&str] = &["and", "or", "the", "an", "a", "with", "to", "of"];

/// Keep terms that are longer than two characters, not stop words, and read
/// as a noun, proper noun or adjective, or as a person, organization or
/// geo-political entity.
pub fn is_valid_keyword(term: &str, tagger: &dyn TermTagger) -> bool {
    if term.chars().count() <= 2 || STOP_WORDS.contains(&term) {
        return false;
    }

    let tag = tagger.tag(term);
    matches!(
        tag.pos,
        PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Adjective
    ) || matches!(
        tag.entity,
        Some(EntityKind::Person | EntityKind::Organization | EntityKind::Gpe)
    )
}

pub struct KeywordExtractor {
    model: Arc<dyn LanguageModel>,
    tagger: Arc<dyn TermTagger>,
    prompt: PromptTemplate,
}

impl KeywordExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self::with_tagger(model, Arc::new(LexiconTagger::new()))
    }

    pub fn with_tagger(model: Arc<dyn LanguageModel>, tagger: Arc<dyn TermTagger>) -> Self {
        Self {
            model,
            tagger,
            prompt: prompts::keywords(),
        }
    }

    /// Model-proposed keywords that pass the validity filter, first
    /// occurrence of each normalized key only.
    pub async fn extract(&self, summary: &str) -> Outcome<Vec<String>> {
        let terms = match ask_for_list(self.model.as_ref(), &self.prompt, summary).await {
            Outcome::Success(terms) => terms,
            Outcome::Empty(r) => return Outcome::Empty(r),
            Outcome::Failed(r) => return Outcome::Failed(r),
        };

        let proposed = terms.len();
        let mut seen = HashSet::new();
        let keywords: Vec<String> = terms
            .into_iter()
            .filter(|t| is_valid_keyword(t, self.tagger.as_ref()))
            .filter(|t| seen.insert(normalize_key(t)))
            .collect();

        debug!(proposed, kept = keywords.len(), "Filtered keywords");
        if keywords.is_empty() {
            return Outcome::empty("no valid keywords");
        }
        Outcome::Success(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::TermTag;
    use crate::testing::ScriptedModel;

    #[test]
    fn short_terms_and_stop_words_are_rejected() {
        let tagger = LexiconTagger::new();
        assert!(!is_valid_keyword("AI", &tagger));
        assert!(!is_valid_keyword("of", &tagger));
        assert!(!is_valid_keyword("the", &tagger));
        assert!(!is_valid_keyword("with", &tagger));
        assert!(is_valid_keyword("cats", &tagger));
    }

    #[test]
    fn stop_words_are_case_sensitive() {
        struct NounTagger;
        impl TermTagger for NounTagger {
            fn tag(&self, _term: &str) -> TermTag {
                TermTag {
                    pos: PartOfSpeech::Noun,
                    entity: None,
                }
            }
        }
        assert!(!is_valid_keyword("the", &NounTagger));
        assert!(is_valid_keyword("The", &NounTagger));
    }

    #[test]
    fn entity_rescues_non_noun_tag() {
        struct EntityOnly;
        impl TermTagger for EntityOnly {
            fn tag(&self, _term: &str) -> TermTag {
                TermTag {
                    pos: PartOfSpeech::Other,
                    entity: Some(EntityKind::Organization),
                }
            }
        }
        assert!(is_valid_keyword("Acme", &EntityOnly));
    }

    #[test]
    fn verbs_and_adverbs_are_rejected() {
        let tagger = LexiconTagger::new();
        assert!(!is_valid_keyword("quickly", &tagger));
        assert!(!is_valid_keyword("optimize", &tagger));
        assert!(!is_valid_keyword("through", &tagger));
        assert!(is_valid_keyword("beautiful", &tagger));
        assert!(is_valid_keyword("London", &tagger));
    }

    #[tokio::test]
    async fn extract_filters_and_dedupes() {
        let model = Arc::new(
            ScriptedModel::new().on("keywords", "Keywords: cats, of, pets, Cats, quickly, purring"),
        );
        let extractor = KeywordExtractor::new(model);

        let keywords = extractor.extract("Cats are popular pets.").await;
        assert_eq!(
            keywords,
            Outcome::Success(vec!["cats".into(), "pets".into(), "purring".into()])
        );
    }

    #[tokio::test]
    async fn nothing_valid_is_empty() {
        let model = Arc::new(ScriptedModel::new().on("keywords", "of, to, quickly"));
        let extractor = KeywordExtractor::new(model);
        assert!(matches!(extractor.extract("x").await, Outcome::Empty(_)));
    }

    #[tokio::test]
    async fn model_failure_is_failed() {
        let model = Arc::new(ScriptedModel::new().fail("keywords", "boom"));
        let extractor = KeywordExtractor::new(model);
        assert!(matches!(extractor.extract("x").await, Outcome::Failed(_)));
    }
}
