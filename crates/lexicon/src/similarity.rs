use std::collections::HashSet;

use core_types::{Note, TopicReport};

/// Candidates must score strictly above this to count as similar. The value
/// is empirical; use [`find_similar_with_threshold`] to tune it.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.1;

const CATEGORY_WEIGHT: f64 = 0.3;
const TAG_WEIGHT: f64 = 0.2;
const NOUN_WEIGHT: f64 = 0.1;
const PEOPLE_WEIGHT: f64 = 0.2;
const PLACE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
pub struct ScoredNote<'a> {
    pub note: &'a Note,
    pub score: f64,
}

fn overlap(a: &[String], b: &[String]) -> usize {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    b.iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&a)
        .count()
}

fn topics(note: &Note) -> TopicReport {
    note.annotation
        .as_ref()
        .map(|annotation| annotation.topics.clone())
        .unwrap_or_default()
}

pub fn similarity_score(target: &Note, candidate: &Note) -> f64 {
    let target_topics = topics(target);
    let candidate_topics = topics(candidate);

    let category = if target.category == candidate.category {
        CATEGORY_WEIGHT
    } else {
        0.0
    };
    let tags = target.tags.intersection(&candidate.tags).count() as f64;

    category
        + TAG_WEIGHT * tags
        + NOUN_WEIGHT * overlap(&target_topics.nouns, &candidate_topics.nouns) as f64
        + PEOPLE_WEIGHT * overlap(&target_topics.people, &candidate_topics.people) as f64
        + PLACE_WEIGHT * overlap(&target_topics.places, &candidate_topics.places) as f64
}

pub fn find_similar<'a>(target: &Note, candidates: &'a [Note], limit: usize) -> Vec<ScoredNote<'a>> {
    find_similar_with_threshold(target, candidates, limit, DEFAULT_SIMILARITY_THRESHOLD)
}

/// Scores every candidate except the target itself, drops scores at or below
/// `threshold`, and sorts descending. Ties keep candidate order.
pub fn find_similar_with_threshold<'a>(
    target: &Note,
    candidates: &'a [Note],
    limit: usize,
    threshold: f64,
) -> Vec<ScoredNote<'a>> {
    let mut scored: Vec<ScoredNote<'a>> = candidates
        .iter()
        .filter(|candidate| candidate.id != target.id)
        .map(|note| ScoredNote {
            note,
            score: similarity_score(target, note),
        })
        .filter(|scored| scored.score > threshold)
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}
