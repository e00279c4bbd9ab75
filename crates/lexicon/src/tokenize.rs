use crate::words::is_honorific;

/// Lowercase word tokens: runs of alphanumerics and inner apostrophes.
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .map(|token| token.trim_matches(|c| c == '\'' || c == '’'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// A whitespace-delimited word with surrounding punctuation removed.
#[derive(Debug, Clone)]
pub(crate) struct Word<'a> {
    pub text: &'a str,
    pub lower: String,
    pub sentence_start: bool,
    /// Followed by clause punctuation (`.,;:!?`).
    pub ends_clause: bool,
}

impl Word<'_> {
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

pub(crate) fn words(text: &str) -> Vec<Word<'_>> {
    let mut out: Vec<Word<'_>> = Vec::new();
    let mut sentence_start = true;

    for piece in text.split_whitespace() {
        let trimmed = piece.trim_matches(|c: char| !c.is_alphanumeric());
        let trailing = &piece[piece.len() - trailing_len(piece)..];
        // "Dr." and friends do not end a sentence.
        let abbreviation = trailing == "." && is_honorific(&trimmed.to_lowercase());
        let ends_sentence = !abbreviation && trailing.contains(['.', '!', '?']);
        let ends_clause = !abbreviation && trailing.contains(['.', ',', ';', ':', '!', '?']);

        if trimmed.is_empty() {
            if let Some(last) = out.last_mut() {
                last.ends_clause |= ends_clause;
            }
            sentence_start |= ends_sentence;
            continue;
        }

        let text = strip_possessive(trimmed);
        out.push(Word {
            text,
            lower: text.to_lowercase(),
            sentence_start,
            ends_clause,
        });
        sentence_start = ends_sentence;
    }

    out
}

fn trailing_len(piece: &str) -> usize {
    piece
        .chars()
        .rev()
        .take_while(|c| !c.is_alphanumeric())
        .map(char::len_utf8)
        .sum()
}

fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("’s"))
        .unwrap_or(word)
}

/// Sentences ending at `.`, `!` or `?` followed by whitespace or end of text.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            let end = idx + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}
