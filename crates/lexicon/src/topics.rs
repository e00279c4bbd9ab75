//! Entity and part-of-speech style extraction.
//!
//! Proper-noun runs are classified against the gazetteers in [`crate::words`];
//! everything else is scanned for noun phrases (the head word after a
//! determiner or preposition) and verbs (known forms and `-ed`/`-ing`).

use core_types::TopicReport;
use indexmap::IndexSet;

use crate::tokenize::{Word, words};
use crate::words::{
    has_noun_suffix, is_first_name, is_honorific, is_intensifier, is_known_verb, is_noun_cue,
    is_organization, is_organization_suffix, is_place, is_stopword, is_verb, starts_entity,
};

pub const MAX_NOUNS: usize = 10;
pub const MAX_VERBS: usize = 10;
const MAX_NAME_WORDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProperKind {
    Person,
    Place,
    Organization,
    Other,
}

#[derive(Default)]
struct Collected {
    people: IndexSet<String>,
    places: IndexSet<String>,
    organizations: IndexSet<String>,
    topics: IndexSet<String>,
    nouns: IndexSet<String>,
    verbs: IndexSet<String>,
    phrase: Vec<String>,
    in_phrase: bool,
}

impl Collected {
    fn proper(&mut self, name: String, kind: ProperKind) {
        match kind {
            ProperKind::Person => {
                self.people.insert(name.clone());
            }
            ProperKind::Place => {
                self.places.insert(name.clone());
            }
            ProperKind::Organization => {
                self.organizations.insert(name.clone());
            }
            ProperKind::Other => {}
        }
        self.topics.insert(name);
    }

    fn close_phrase(&mut self) {
        if let Some((head, modifiers)) = self.phrase.split_last() {
            for modifier in modifiers.iter().filter(|word| has_noun_suffix(word)) {
                self.nouns.insert(modifier.clone());
            }
            self.nouns.insert(head.clone());
        }
        self.phrase.clear();
        self.in_phrase = false;
    }

    fn ordinary(&mut self, word: &Word<'_>) {
        let lower = word.lower.as_str();

        if is_noun_cue(lower) {
            self.close_phrase();
            self.in_phrase = !word.ends_clause;
            return;
        }
        if is_intensifier(lower) && self.in_phrase {
            return;
        }
        if is_stopword(lower) || is_intensifier(lower) || !is_content_word(lower) {
            self.close_phrase();
            return;
        }

        if self.in_phrase {
            // Right after a cue the word is nominal ("the plan"); later, a verb ends the phrase.
            let verb_like = is_known_verb(lower) || (lower.ends_with("ed") && is_verb(lower));
            if self.phrase.is_empty() || !verb_like {
                self.phrase.push(lower.to_string());
                if word.ends_clause {
                    self.close_phrase();
                }
                return;
            }
        }

        self.close_phrase();
        if is_verb(lower) {
            self.verbs.insert(lower.to_string());
        } else if has_noun_suffix(lower) {
            self.nouns.insert(lower.to_string());
        }
    }

    /// Proper nouns sit inside noun phrases ("the Falcon launch") without closing them.
    fn after_proper(&mut self, run: &[Word<'_>]) {
        if run.last().is_some_and(|word| word.ends_clause) {
            self.close_phrase();
        }
    }

    fn finish(mut self) -> TopicReport {
        self.close_phrase();
        TopicReport {
            people: self.people.into_iter().collect(),
            places: self.places.into_iter().collect(),
            organizations: self.organizations.into_iter().collect(),
            topics: self.topics.into_iter().collect(),
            nouns: self.nouns.into_iter().take(MAX_NOUNS).collect(),
            verbs: self.verbs.into_iter().take(MAX_VERBS).collect(),
        }
    }
}

fn is_content_word(word: &str) -> bool {
    word.len() >= 3 && word.chars().all(char::is_alphabetic)
}

/// End (exclusive) of the capitalised run starting at `start`.
fn proper_run_end(words: &[Word<'_>], start: usize) -> usize {
    let mut end = start;
    while end < words.len() && end - start < MAX_NAME_WORDS {
        let word = &words[end];
        let continues = word.is_capitalized()
            && !is_stopword(&word.lower)
            && (end == start || !word.sentence_start);
        if !continues {
            break;
        }
        end += 1;
        if word.ends_clause {
            break;
        }
    }
    end
}

fn classify(run: &[Word<'_>]) -> ProperKind {
    let joined = join_lower(run);
    let first = run[0].lower.as_str();

    if is_organization(&joined)
        || (run.len() > 1 && run.iter().any(|word| is_organization_suffix(&word.lower)))
    {
        ProperKind::Organization
    } else if is_first_name(first) {
        ProperKind::Person
    } else if is_place(&joined) {
        ProperKind::Place
    } else {
        ProperKind::Other
    }
}

fn join_text(run: &[Word<'_>]) -> String {
    run.iter().map(|word| word.text).collect::<Vec<_>>().join(" ")
}

fn join_lower(run: &[Word<'_>]) -> String {
    run.iter()
        .map(|word| word.lower.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn extract_topics(text: &str) -> TopicReport {
    let words = words(text);
    let mut collected = Collected::default();
    let mut idx = 0;

    while idx < words.len() {
        let word = &words[idx];

        if is_honorific(&word.lower) && !word.ends_clause {
            let end = proper_run_end(&words, idx + 1);
            if end > idx + 1 && !words[idx + 1].sentence_start {
                collected.proper(join_text(&words[idx..end]), ProperKind::Person);
                collected.after_proper(&words[idx..end]);
                idx = end;
                continue;
            }
        }

        if word.is_capitalized() && !is_stopword(&word.lower) {
            let end = proper_run_end(&words, idx);
            let run = &words[idx..end];
            let kind = classify(run);
            // A capitalised first word of a sentence is only a name when it is a known entity.
            let accept = !word.sentence_start
                || (starts_entity(&word.lower) && kind != ProperKind::Other);
            if accept {
                collected.proper(join_text(run), kind);
                collected.after_proper(run);
                idx = end;
                continue;
            }
        }

        collected.ordinary(word);
        idx += 1;
    }

    collected.finish()
}
