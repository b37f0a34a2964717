//! Input Parser
//!
//! Converts free-text requests into intents, entities, keywords and a clarity
//! rating. Intent and entity detection sit behind the [`IntentClassifier`]
//! trait so a model-based classifier can replace the fixed vocabularies
//! without touching matching or scoring.

mod classifier;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use classifier::KeywordIntentClassifier;

/// Words removed during keyword extraction
const STOP_WORDS: [&str; 13] = [
    "the", "and", "for", "with", "from", "this", "that", "into", "are", "was", "but", "not",
    "our",
];

/// Tokens shorter than this are dropped from keywords
const MIN_KEYWORD_LEN: usize = 3;

/// Inputs longer than this (in characters) count toward high clarity
const CLARITY_MIN_LEN: usize = 10;

/// Coarse action category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Create,
    Validate,
    Fix,
    Analyze,
    Improve,
    Test,
    Plan,
    /// Fallback when no category matches
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Validate => "validate",
            Intent::Fix => "fix",
            Intent::Analyze => "analyze",
            Intent::Improve => "improve",
            Intent::Test => "test",
            Intent::Plan => "plan",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse subject category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Prd,
    Architecture,
    Code,
    Tests,
    Bug,
    Documentation,
    Story,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Prd => "prd",
            Entity::Architecture => "architecture",
            Entity::Code => "code",
            Entity::Tests => "tests",
            Entity::Bug => "bug",
            Entity::Documentation => "documentation",
            Entity::Story => "story",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approximate clarity of a request
///
/// Derived from the presence of an intent verb and the input length only; it
/// says nothing about whether the request is semantically unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clarity {
    High,
    Medium,
    Low,
}

/// Detects intent and entity categories in free text
pub trait IntentClassifier: Send + Sync {
    /// Matching intents in category declaration order (may be empty)
    fn detect_intents(&self, text: &str) -> Vec<Intent>;

    /// Matching entities in category declaration order
    fn detect_entities(&self, text: &str) -> Vec<Entity>;
}

/// Structured view of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedInput {
    pub raw_text: String,
    /// Never empty; `[General]` when nothing matched
    pub intents: Vec<Intent>,
    pub entities: Vec<Entity>,
    /// Lowercased tokens in input order, duplicates retained
    pub keywords: Vec<String>,
    pub clarity: Clarity,
}

impl ParsedInput {
    pub fn has_intent(&self, intent: Intent) -> bool {
        self.intents.contains(&intent)
    }

    pub fn has_entity(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }
}

/// Parses requests using a pluggable classifier
pub struct InputParser {
    classifier: Box<dyn IntentClassifier>,
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new(Box::new(KeywordIntentClassifier::new()))
    }
}

impl fmt::Debug for InputParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputParser").finish_non_exhaustive()
    }
}

impl InputParser {
    pub fn new(classifier: Box<dyn IntentClassifier>) -> Self {
        Self { classifier }
    }

    /// Parse a request. Never fails.
    pub fn parse(&self, raw_input: &str) -> ParsedInput {
        let detected = self.classifier.detect_intents(raw_input);
        let has_intent_verb = !detected.is_empty();
        let intents = if has_intent_verb {
            detected
        } else {
            vec![Intent::General]
        };

        let entities = self.classifier.detect_entities(raw_input);
        let keywords = extract_keywords(raw_input);
        let clarity = assess_clarity(has_intent_verb, raw_input.chars().count());

        debug!(
            intents = ?intents,
            entities = ?entities,
            keyword_count = keywords.len(),
            clarity = ?clarity,
            "Parsed routing input"
        );

        ParsedInput {
            raw_text: raw_input.to_string(),
            intents,
            entities,
            keywords,
            clarity,
        }
    }
}

/// Split on whitespace, strip edge punctuation, drop short tokens and stop words
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| token.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

fn assess_clarity(has_intent_verb: bool, length: usize) -> Clarity {
    match (has_intent_verb, length > CLARITY_MIN_LEN) {
        (true, true) => Clarity::High,
        (true, false) | (false, true) => Clarity::Medium,
        (false, false) => Clarity::Low,
    }
}
