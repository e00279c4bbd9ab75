use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod validation;

pub use validation::{
    MAX_BODY_CHARS, MAX_TAG_CHARS, MAX_TAGS, MAX_TITLE_CHARS, ValidationError, is_valid_tag,
    validate_body, validate_tags, validate_title,
};

pub type NoteId = i64;

/// Ordered set of tags. Equality ignores order, iteration keeps insertion order.
pub type TagSet = IndexSet<String>;

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionState {
    #[default]
    Plain,
    Encrypted,
}

impl EncryptionState {
    pub fn is_encrypted(self) -> bool {
        matches!(self, Self::Encrypted)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    #[default]
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLabel {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 2 => Self::VeryPositive,
            s if s > 0 => Self::Positive,
            0 => Self::Neutral,
            s if s >= -2 => Self::Negative,
            _ => Self::VeryNegative,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryNegative => "very_negative",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::VeryPositive => "very_positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SentimentReport {
    pub score: i32,
    pub comparative: f64,
    pub label: SentimentLabel,
    #[serde(default)]
    pub positive_matches: Vec<String>,
    #[serde(default)]
    pub negative_matches: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicReport {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub places: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub nouns: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
}

impl TopicReport {
    pub fn has_entities(&self) -> bool {
        !(self.people.is_empty() && self.places.is_empty() && self.organizations.is_empty())
    }
}

/// Derived content annotation. Only ever produced by a [`TextAnnotator`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub sentiment: SentimentReport,
    pub topics: TopicReport,
    pub word_count: usize,
    pub reading_time_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// SHA-256 of the body this annotation was computed from.
    pub body_digest: String,
}

impl Annotation {
    pub fn is_current_for(&self, body: &str) -> bool {
        self.body_digest == body_digest(body)
    }
}

pub fn body_digest(body: &str) -> String {
    format!("{:x}", Sha256::digest(body.as_bytes()))
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: TagSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    #[serde(default)]
    pub encryption: EncryptionState,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Note {
    pub fn new(id: NoteId, title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            body: body.into(),
            category: default_category(),
            tags: TagSet::new(),
            created_at: now,
            updated_at: now,
            annotation: None,
            encryption: EncryptionState::Plain,
        }
    }

    /// Word count from the annotation, falling back to counting the body.
    pub fn word_count(&self) -> usize {
        self.annotation
            .as_ref()
            .map(|annotation| annotation.word_count)
            .unwrap_or_else(|| word_count(&self.body))
    }

    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.trim().to_lowercase()
    }

    pub fn has_current_annotation(&self) -> bool {
        self.annotation
            .as_ref()
            .is_some_and(|annotation| annotation.is_current_for(&self.body))
    }
}

/// Pluggable text analysis used by the record store on every body change.
pub trait TextAnnotator: Send + Sync {
    fn annotate(&self, text: &str) -> Annotation;

    fn suggest_tags(&self, text: &str) -> Vec<String>;

    fn suggest_category(&self, text: &str) -> String;
}
