//! Default fixed-vocabulary intent and entity classifier
//!
//! Each category is a case-insensitive whole-word pattern over a closed
//! vocabulary. This is a crude stand-in for natural-language understanding.

use super::{Entity, Intent, IntentClassifier};
use once_cell::sync::Lazy;
use regex::Regex;

static INTENT_PATTERNS: Lazy<Vec<(Intent, Regex)>> = Lazy::new(|| {
    [
        (Intent::Create, r"create|make|build|generate|write|add"),
        (Intent::Validate, r"validate|check|verify|review|audit|confirm"),
        (Intent::Fix, r"fix|debug|repair|resolve|solve|patch"),
        (
            Intent::Analyze,
            r"analy[sz]e|investigate|examine|understand|explain|research",
        ),
        (Intent::Improve, r"improve|optimi[sz]e|refactor|enhance|upgrade|clean up"),
        (Intent::Test, r"test|tests|testing|qa"),
        (Intent::Plan, r"plan|design|architect|roadmap|strategy|organi[sz]e"),
    ]
    .into_iter()
    .map(|(intent, words)| (intent, word_pattern(words)))
    .collect()
});

static ENTITY_PATTERNS: Lazy<Vec<(Entity, Regex)>> = Lazy::new(|| {
    [
        (Entity::Prd, r"prds?|requirements?|product requirements"),
        (
            Entity::Architecture,
            r"architecture|architectural|system design|technical design|tech stack",
        ),
        (
            Entity::Code,
            r"code|codebase|implementation|functions?|modules?|endpoints?|api",
        ),
        (Entity::Tests, r"tests?|testing|test suite|coverage"),
        (
            Entity::Bug,
            r"bugs?|issues?|errors?|defects?|crash(?:es)?|regressions?",
        ),
        (
            Entity::Documentation,
            r"docs?|documentation|readme|guides?|manual",
        ),
        (Entity::Story, r"stor(?:y|ies)|user stor(?:y|ies)|epics?"),
    ]
    .into_iter()
    .map(|(entity, words)| (entity, word_pattern(words)))
    .collect()
});

fn word_pattern(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("vocabulary pattern is valid")
}

/// Classifier backed by fixed regex vocabularies
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn detect_intents(&self, text: &str) -> Vec<Intent> {
        INTENT_PATTERNS
            .iter()
            .filter(|(_, pattern)| pattern.is_match(text))
            .map(|(intent, _)| *intent)
            .collect()
    }

    fn detect_entities(&self, text: &str) -> Vec<Entity> {
        ENTITY_PATTERNS
            .iter()
            .filter(|(_, pattern)| pattern.is_match(text))
            .map(|(entity, _)| *entity)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_follow_declaration_order() {
        let classifier = KeywordIntentClassifier::new();
        // "plan" appears before "create" in the text
        let intents = classifier.detect_intents("plan then create the thing");
        assert_eq!(intents, vec![Intent::Create, Intent::Plan]);
    }

    #[test]
    fn test_whole_word_matching() {
        let classifier = KeywordIntentClassifier::new();
        // "address" contains "add" and "fixture" contains "fix"
        assert!(classifier.detect_intents("address fixture").is_empty());
        assert_eq!(classifier.detect_intents("ADD a fixture"), vec![Intent::Create]);
    }

    #[test]
    fn test_entity_detection() {
        let classifier = KeywordIntentClassifier::new();
        let entities = classifier.detect_entities("Write user stories and a PRD for the API");
        assert_eq!(entities, vec![Entity::Prd, Entity::Code, Entity::Story]);
    }

    #[test]
    fn test_british_spellings() {
        let classifier = KeywordIntentClassifier::new();
        assert_eq!(classifier.detect_intents("analyse logs"), vec![Intent::Analyze]);
        assert_eq!(classifier.detect_intents("optimise queries"), vec![Intent::Improve]);
    }

    #[test]
    fn test_multi_word_vocabulary() {
        let classifier = KeywordIntentClassifier::new();
        assert_eq!(
            classifier.detect_entities("draft the system design"),
            vec![Entity::Architecture]
        );
        assert_eq!(classifier.detect_intents("clean up imports"), vec![Intent::Improve]);
    }
}
