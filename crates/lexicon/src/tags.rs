use core_types::{MAX_TAG_CHARS, TopicReport, word_count};
use indexmap::IndexSet;

use crate::sentiment::analyze_sentiment;
use crate::topics::extract_topics;

pub const DEFAULT_MAX_TAGS: usize = 5;

/// Subject tags (topics, then nouns) placed ahead of the descriptive tags.
const LEADING_SUBJECT_TAGS: usize = 2;

const SHORT_WORDS: usize = 50;
const MEDIUM_WORDS: usize = 200;

pub fn length_bucket(words: usize) -> &'static str {
    if words < SHORT_WORDS {
        "short"
    } else if words < MEDIUM_WORDS {
        "medium"
    } else {
        "long"
    }
}

/// Lowercases and rewrites a phrase into the tag grammar (`[a-z0-9_-]`).
pub fn normalize_tag(raw: &str) -> Option<String> {
    let mut tag = String::new();
    for c in raw.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            tag.push(c);
        } else if c.is_whitespace() && !tag.ends_with('-') {
            tag.push('-');
        }
    }
    let tag: String = tag.trim_matches('-').chars().take(MAX_TAG_CHARS).collect();
    (!tag.is_empty()).then_some(tag)
}

fn entity_tags(topics: &TopicReport) -> impl Iterator<Item = &'static str> {
    [
        (!topics.people.is_empty()).then_some("people"),
        (!topics.places.is_empty()).then_some("places"),
        (!topics.organizations.is_empty()).then_some("organizations"),
    ]
    .into_iter()
    .flatten()
}

/// Tags in discovery order: leading subjects, sentiment label, length bucket,
/// entity presence, remaining subjects. Truncated to `max`.
pub fn generate_tags(text: &str, max: usize) -> Vec<String> {
    if max == 0 || text.trim().is_empty() {
        return Vec::new();
    }

    let sentiment = analyze_sentiment(text);
    let topics = extract_topics(text);

    let mut subjects = topics
        .topics
        .iter()
        .chain(topics.nouns.iter())
        .filter_map(|subject| normalize_tag(subject));

    let mut tags = IndexSet::new();
    while tags.len() < LEADING_SUBJECT_TAGS {
        let Some(subject) = subjects.next() else {
            break;
        };
        tags.insert(subject);
    }

    tags.insert(sentiment.label.as_str().to_string());
    tags.insert(length_bucket(word_count(text)).to_string());
    tags.extend(entity_tags(&topics).map(String::from));
    tags.extend(subjects);

    tags.into_iter().take(max).collect()
}
