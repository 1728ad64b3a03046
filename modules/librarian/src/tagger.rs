//! Heuristic part-of-speech and named-entity tagging for short terms.
//!
//! Keywords arrive one term at a time with no sentence around them, so the
//! tagger works from closed-class word lists, suffixes, capitalization and a
//! small gazetteer. Multi-word terms are tagged by their head (last) word.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Adjective,
    Verb,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Numeral,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Organization,
    /// Geo-political entity: countries, cities, states.
    Gpe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermTag {
    pub pos: PartOfSpeech,
    pub entity: Option<EntityKind>,
}

pub trait TermTagger: Send + Sync {
    fn tag(&self, term: &str) -> TermTag;
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "all", "both", "either", "neither", "another", "such",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "you", "your", "yours", "he", "him", "his", "she", "her", "hers",
    "it", "its", "we", "us", "our", "ours", "they", "them", "their", "theirs", "who", "whom",
    "whose", "which", "what", "myself", "yourself", "itself", "themselves", "something",
    "anything", "everything", "nothing", "someone", "anyone", "everyone",
];

const PREPOSITIONS: &[&str] = &[
    "about", "above", "across", "after", "against", "along", "among", "around", "at", "before",
    "behind", "below", "beneath", "beside", "between", "beyond", "by", "down", "during",
    "except", "for", "from", "in", "inside", "into", "near", "of", "off", "on", "onto", "out",
    "outside", "over", "past", "since", "through", "throughout", "toward", "towards", "under",
    "until", "up", "upon", "via", "with", "within", "without",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "while", "whereas",
    "unless", "if", "whether",
];

const VERBS: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "have", "has", "had", "do", "does",
    "did", "can", "could", "will", "would", "shall", "should", "may", "might", "must", "make",
    "makes", "get", "gets", "got", "go", "goes", "went", "gone", "take", "takes", "took", "see",
    "saw", "seen", "know", "knew", "known", "think", "thought", "say", "says", "said", "give",
    "gave", "given", "find", "found", "become", "became", "show", "shows", "shown", "let", "put",
];

const ADVERBS: &[&str] = &[
    "very", "really", "quite", "just", "also", "often", "always", "never", "sometimes", "soon",
    "here", "there", "now", "then", "again", "already", "still", "too", "almost", "perhaps",
    "maybe", "rather", "however", "therefore",
];

const ADJECTIVES: &[&str] = &[
    "good", "bad", "new", "old", "big", "small", "large", "great", "high", "low", "long",
    "short", "best", "better", "important", "popular", "modern", "free", "open", "early",
    "late", "young", "main", "common", "public", "private", "local", "global", "digital",
];

/// Words the suffix rules would mis-tag.
const NOUN_EXCEPTIONS: &[&str] = &[
    "family", "supply", "reply", "italy", "july", "assembly", "butterfly", "anomaly",
    "monopoly", "ally", "belly", "jelly", "rally", "exercise", "enterprise", "expertise",
    "franchise", "premise", "promise", "noise", "merchandise", "paradise", "speed", "breed",
    "greed", "creed", "hundred", "seed", "feed", "need", "bed",
];

const ADVERB_SUFFIXES: &[&str] = &["ly"];
const VERB_SUFFIXES: &[&str] = &["ize", "ise", "ify", "ed"];
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "al", "ic", "less", "ish",
];

const ORGANIZATION_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "co", "ltd", "llc", "plc", "gmbh", "company", "group",
    "university", "college", "institute", "foundation", "association", "society", "agency",
    "ministry", "council", "labs", "bank", "museum", "library", "press",
];

const GEO_POLITICAL: &[&str] = &[
    "africa", "america", "asia", "australia", "brazil", "california", "canada", "chicago",
    "china", "egypt", "england", "europe", "france", "germany", "greece", "india", "ireland",
    "italy", "japan", "kenya", "london", "los angeles", "mexico", "minneapolis", "minnesota",
    "new york", "nigeria", "paris", "russia", "san francisco", "scotland", "spain", "texas",
    "tokyo", "uk", "united kingdom", "united states", "usa", "washington",
];

/// Default tagger backed by fixed word lists.
#[derive(Debug, Default, Clone)]
pub struct LexiconTagger;

impl LexiconTagger {
    pub fn new() -> Self {
        Self
    }
}

impl TermTagger for LexiconTagger {
    fn tag(&self, term: &str) -> TermTag {
        let words: Vec<&str> = term
            .split_whitespace()
            .map(strip_punctuation)
            .filter(|w| !w.is_empty())
            .collect();

        let Some(head) = words.last() else {
            return TermTag {
                pos: PartOfSpeech::Other,
                entity: None,
            };
        };

        let pos = if words.len() > 1 && words.iter().all(|w| is_capitalized(w)) {
            PartOfSpeech::ProperNoun
        } else {
            tag_word(head)
        };

        TermTag {
            pos,
            entity: entity_kind(&words),
        }
    }
}

fn tag_word(word: &str) -> PartOfSpeech {
    let lower = word.to_lowercase();

    if lower.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return PartOfSpeech::Numeral;
    }
    if DETERMINERS.contains(&lower.as_str()) {
        return PartOfSpeech::Determiner;
    }
    if PRONOUNS.contains(&lower.as_str()) {
        return PartOfSpeech::Pronoun;
    }
    if PREPOSITIONS.contains(&lower.as_str()) {
        return PartOfSpeech::Preposition;
    }
    if CONJUNCTIONS.contains(&lower.as_str()) {
        return PartOfSpeech::Conjunction;
    }
    if VERBS.contains(&lower.as_str()) {
        return PartOfSpeech::Verb;
    }
    if ADVERBS.contains(&lower.as_str()) {
        return PartOfSpeech::Adverb;
    }
    if ADJECTIVES.contains(&lower.as_str()) {
        return PartOfSpeech::Adjective;
    }
    if is_capitalized(word) {
        return PartOfSpeech::ProperNoun;
    }
    if NOUN_EXCEPTIONS.contains(&lower.as_str()) {
        return PartOfSpeech::Noun;
    }
    if has_suffix(&lower, ADVERB_SUFFIXES) {
        return PartOfSpeech::Adverb;
    }
    if has_suffix(&lower, VERB_SUFFIXES) {
        return PartOfSpeech::Verb;
    }
    if has_suffix(&lower, ADJECTIVE_SUFFIXES) {
        return PartOfSpeech::Adjective;
    }
    PartOfSpeech::Noun
}

fn entity_kind(words: &[&str]) -> Option<EntityKind> {
    let joined = words.join(" ").to_lowercase();
    if GEO_POLITICAL.contains(&joined.as_str()) {
        return Some(EntityKind::Gpe);
    }

    let last = words.last()?.to_lowercase();
    if words.len() >= 2 && ORGANIZATION_SUFFIXES.contains(&last.as_str()) {
        return Some(EntityKind::Organization);
    }

    if words.len() == 1 && is_acronym(words[0]) {
        return Some(EntityKind::Organization);
    }

    if (2..=3).contains(&words.len())
        && words.iter().all(|w| is_capitalized(w))
        && words.iter().all(|w| tag_word(w) == PartOfSpeech::ProperNoun)
    {
        return Some(EntityKind::Person);
    }

    None
}

/// Suffix match that leaves at least three characters of stem.
fn has_suffix(word: &str, suffixes: &[&str]) -> bool {
    suffixes
        .iter()
        .any(|s| word.len() >= s.len() + 3 && word.ends_with(s))
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_uppercase())
}

fn is_acronym(word: &str) -> bool {
    (2..=6).contains(&word.len()) && word.chars().all(|c| c.is_ascii_uppercase())
}

fn strip_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(term: &str) -> PartOfSpeech {
        LexiconTagger::new().tag(term).pos
    }

    fn entity(term: &str) -> Option<EntityKind> {
        LexiconTagger::new().tag(term).entity
    }

    #[test]
    fn closed_classes() {
        assert_eq!(pos("through"), PartOfSpeech::Preposition);
        assert_eq!(pos("they"), PartOfSpeech::Pronoun);
        assert_eq!(pos("those"), PartOfSpeech::Determiner);
        assert_eq!(pos("because"), PartOfSpeech::Conjunction);
        assert_eq!(pos("were"), PartOfSpeech::Verb);
        assert_eq!(pos("42"), PartOfSpeech::Numeral);
    }

    #[test]
    fn suffix_rules() {
        assert_eq!(pos("quickly"), PartOfSpeech::Adverb);
        assert_eq!(pos("optimize"), PartOfSpeech::Verb);
        assert_eq!(pos("published"), PartOfSpeech::Verb);
        assert_eq!(pos("beautiful"), PartOfSpeech::Adjective);
        assert_eq!(pos("cats"), PartOfSpeech::Noun);
        assert_eq!(pos("family"), PartOfSpeech::Noun);
        assert_eq!(pos("speed"), PartOfSpeech::Noun);
    }

    #[test]
    fn multi_word_terms_use_the_head() {
        assert_eq!(pos("machine learning"), PartOfSpeech::Noun);
        assert_eq!(pos("grow quickly"), PartOfSpeech::Adverb);
        assert_eq!(pos("Ada Lovelace"), PartOfSpeech::ProperNoun);
    }

    #[test]
    fn named_entities() {
        assert_eq!(entity("London"), Some(EntityKind::Gpe));
        assert_eq!(entity("New York"), Some(EntityKind::Gpe));
        assert_eq!(entity("Acme Corp."), Some(EntityKind::Organization));
        assert_eq!(entity("NASA"), Some(EntityKind::Organization));
        assert_eq!(entity("Ada Lovelace"), Some(EntityKind::Person));
        assert_eq!(entity("cats"), None);
    }

    #[test]
    fn blank_term_is_other() {
        assert_eq!(pos("  ... "), PartOfSpeech::Other);
    }
}
