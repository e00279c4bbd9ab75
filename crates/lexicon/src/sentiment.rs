use core_types::{SentimentLabel, SentimentReport};

use crate::tokenize::tokens;
use crate::words::{is_intensifier, polarity};

/// Lexicon sentiment. A word directly preceded by an intensifier counts double.
pub fn analyze_sentiment(text: &str) -> SentimentReport {
    let tokens = tokens(text);
    let mut score = 0;
    let mut positive_matches = Vec::new();
    let mut negative_matches = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let weight = polarity(token);
        if weight == 0 {
            continue;
        }

        let boosted = idx > 0 && is_intensifier(&tokens[idx - 1]);
        score += if boosted { weight * 2 } else { weight };

        if weight > 0 {
            positive_matches.push(token.clone());
        } else {
            negative_matches.push(token.clone());
        }
    }

    let comparative = if tokens.is_empty() {
        0.0
    } else {
        f64::from(score) / tokens.len() as f64
    };

    SentimentReport {
        score,
        comparative,
        label: SentimentLabel::from_score(score),
        positive_matches,
        negative_matches,
    }
}
