//! Deterministic content intelligence: lexicon sentiment, entity and topic
//! extraction, auto-tagging, category rules, extractive summaries and
//! note similarity. Everything here is a pure function of its input.

pub mod annotator;
pub mod category;
pub mod sentiment;
pub mod similarity;
pub mod summary;
pub mod tags;
pub mod tokenize;
pub mod topics;
pub mod words;

pub use annotator::{AnnotatorOptions, HeuristicAnnotator, reading_time_minutes};
pub use category::suggest_category;
pub use sentiment::analyze_sentiment;
pub use similarity::{
    DEFAULT_SIMILARITY_THRESHOLD, ScoredNote, find_similar, find_similar_with_threshold,
    similarity_score,
};
pub use summary::{DEFAULT_SUMMARY_LEN, generate_summary};
pub use tags::{DEFAULT_MAX_TAGS, generate_tags, length_bucket, normalize_tag};
pub use topics::extract_topics;
