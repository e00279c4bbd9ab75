//! Read-only statistics over a note collection.
//!
//! Everything here is a pure function of the notes (and a clock or time zone
//! passed in by the caller); [`AnalyticsSnapshot::from_store`] is the only
//! entry point that touches storage.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};
use core_types::Note;
use indexmap::IndexMap;
use note_store::{NoteStore, StoreResult};
use serde::Serialize;

pub const TOP_NOUNS: usize = 10;

pub fn total_notes(notes: &[Note]) -> usize {
    notes.len()
}

pub fn total_words(notes: &[Note]) -> usize {
    notes.iter().map(Note::word_count).sum()
}

/// Notes created in the half-open window `(now - days, now]`.
pub fn notes_in_window(notes: &[Note], days: i64, now: DateTime<Utc>) -> usize {
    let start = now - Duration::days(days);
    notes
        .iter()
        .filter(|note| note.created_at > start && note.created_at <= now)
        .count()
}

pub fn category_histogram(notes: &[Note]) -> HashMap<String, usize> {
    let mut histogram = HashMap::new();
    for note in notes {
        *histogram.entry(note.category.clone()).or_insert(0) += 1;
    }
    histogram
}

pub fn tag_histogram(notes: &[Note]) -> HashMap<String, usize> {
    let mut histogram = HashMap::new();
    for tag in notes.iter().flat_map(|note| note.tags.iter()) {
        *histogram.entry(tag.clone()).or_insert(0) += 1;
    }
    histogram
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCountStats {
    pub min: usize,
    pub max: usize,
    pub average: f64,
    /// Lower-middle element for even-sized collections.
    pub median: usize,
}

pub fn word_count_stats(notes: &[Note]) -> Option<WordCountStats> {
    let mut counts: Vec<usize> = notes.iter().map(Note::word_count).collect();
    if counts.is_empty() {
        return None;
    }
    counts.sort_unstable();

    let total: usize = counts.iter().sum();
    Some(WordCountStats {
        min: counts[0],
        max: counts[counts.len() - 1],
        average: total as f64 / counts.len() as f64,
        median: counts[(counts.len() - 1) / 2],
    })
}

/// Notes per local hour of creation.
pub fn hour_of_day_histogram(notes: &[Note]) -> [usize; 24] {
    hour_of_day_histogram_in(notes, &Local)
}

pub fn hour_of_day_histogram_in<Tz: TimeZone>(notes: &[Note], tz: &Tz) -> [usize; 24] {
    let mut histogram = [0; 24];
    for note in notes {
        let hour = note.created_at.with_timezone(tz).hour() as usize;
        histogram[hour] += 1;
    }
    histogram
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NounCount {
    pub noun: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WritingPatterns {
    /// Mean body length in characters.
    pub average_length: f64,
    /// Sentiment scores ordered by creation time. Unannotated notes count as 0.
    pub sentiment_trend: Vec<i32>,
    pub top_nouns: Vec<NounCount>,
}

pub fn writing_patterns(notes: &[Note]) -> WritingPatterns {
    let average_length = if notes.is_empty() {
        0.0
    } else {
        let chars: usize = notes.iter().map(|note| note.body.chars().count()).sum();
        chars as f64 / notes.len() as f64
    };

    let mut by_time: Vec<&Note> = notes.iter().collect();
    by_time.sort_by_key(|note| note.created_at);
    let sentiment_trend = by_time
        .iter()
        .map(|note| {
            note.annotation
                .as_ref()
                .map_or(0, |annotation| annotation.sentiment.score)
        })
        .collect();

    let mut nouns: IndexMap<&str, usize> = IndexMap::new();
    for annotation in notes.iter().filter_map(|note| note.annotation.as_ref()) {
        for noun in &annotation.topics.nouns {
            *nouns.entry(noun.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = nouns.into_iter().collect();
    // Stable: equal counts keep first-occurrence order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let top_nouns = ranked
        .into_iter()
        .take(TOP_NOUNS)
        .map(|(noun, count)| NounCount {
            noun: noun.to_string(),
            count,
        })
        .collect();

    WritingPatterns {
        average_length,
        sentiment_trend,
        top_nouns,
    }
}

pub fn encrypted_notes(notes: &[Note]) -> usize {
    notes
        .iter()
        .filter(|note| note.encryption.is_encrypted())
        .count()
}

/// Notes per sentiment label. Unannotated notes are not counted.
pub fn sentiment_distribution(notes: &[Note]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for annotation in notes.iter().filter_map(|note| note.annotation.as_ref()) {
        *distribution
            .entry(annotation.sentiment.label.to_string())
            .or_insert(0) += 1;
    }
    distribution
}

/// Every statistic at once, with maps sorted for stable output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub generated_at: DateTime<Utc>,
    pub total_notes: usize,
    pub total_words: usize,
    pub notes_last_7_days: usize,
    pub notes_last_30_days: usize,
    pub encrypted_notes: usize,
    pub categories: BTreeMap<String, usize>,
    pub tags: BTreeMap<String, usize>,
    pub word_counts: Option<WordCountStats>,
    pub hour_of_day: [usize; 24],
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub writing_patterns: WritingPatterns,
}

impl AnalyticsSnapshot {
    pub fn compute(notes: &[Note], now: DateTime<Utc>) -> Self {
        Self::compute_in(notes, now, &Local)
    }

    pub fn compute_in<Tz: TimeZone>(notes: &[Note], now: DateTime<Utc>, tz: &Tz) -> Self {
        Self {
            generated_at: now,
            total_notes: total_notes(notes),
            total_words: total_words(notes),
            notes_last_7_days: notes_in_window(notes, 7, now),
            notes_last_30_days: notes_in_window(notes, 30, now),
            encrypted_notes: encrypted_notes(notes),
            categories: category_histogram(notes).into_iter().collect(),
            tags: tag_histogram(notes).into_iter().collect(),
            word_counts: word_count_stats(notes),
            hour_of_day: hour_of_day_histogram_in(notes, tz),
            sentiment_distribution: sentiment_distribution(notes),
            writing_patterns: writing_patterns(notes),
        }
    }

    /// Loads the collection and summarises it. Store failures propagate.
    pub fn from_store(store: &NoteStore, now: DateTime<Utc>) -> StoreResult<Self> {
        Ok(Self::compute(&store.load()?, now))
    }
}
