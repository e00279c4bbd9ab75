use core_types::{Annotation, TextAnnotator, body_digest, word_count};

use crate::category::suggest_category;
use crate::sentiment::analyze_sentiment;
use crate::summary::{DEFAULT_SUMMARY_LEN, generate_summary};
use crate::tags::{DEFAULT_MAX_TAGS, generate_tags};
use crate::topics::extract_topics;

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatorOptions {
    pub max_tags: usize,
    pub summary_max_len: usize,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        Self {
            max_tags: DEFAULT_MAX_TAGS,
            summary_max_len: DEFAULT_SUMMARY_LEN,
        }
    }
}

/// Lexicon-backed [`TextAnnotator`].
#[derive(Debug, Clone, Default)]
pub struct HeuristicAnnotator {
    options: AnnotatorOptions,
}

impl HeuristicAnnotator {
    pub fn new(options: AnnotatorOptions) -> Self {
        Self { options }
    }
}

pub fn reading_time_minutes(words: usize) -> u32 {
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}

impl TextAnnotator for HeuristicAnnotator {
    fn annotate(&self, text: &str) -> Annotation {
        let words = word_count(text);
        let summary = (text.trim().chars().count() > self.options.summary_max_len)
            .then(|| generate_summary(text, self.options.summary_max_len));

        Annotation {
            sentiment: analyze_sentiment(text),
            topics: extract_topics(text),
            word_count: words,
            reading_time_minutes: reading_time_minutes(words),
            summary,
            body_digest: body_digest(text),
        }
    }

    fn suggest_tags(&self, text: &str) -> Vec<String> {
        generate_tags(text, self.options.max_tags)
    }

    fn suggest_category(&self, text: &str) -> String {
        suggest_category(text)
    }
}
