use crate::tokenize::sentences;

pub const DEFAULT_SUMMARY_LEN: usize = 100;
const ELLIPSIS: &str = "...";

/// Extractive summary: the first sentence, then following sentences while the
/// running length stays under `max_len`. A first sentence longer than
/// `max_len` is cut at a word boundary. `...` marks an incomplete summary.
pub fn generate_summary(text: &str, max_len: usize) -> String {
    let sentences = sentences(text);
    let Some((first, rest)) = sentences.split_first() else {
        return String::new();
    };

    let mut summary;
    let mut complete = true;
    if first.chars().count() > max_len {
        summary = truncate_at_word(first, max_len);
        complete = false;
    } else {
        summary = (*first).to_string();
        for sentence in rest {
            let next_len = summary.chars().count() + 1 + sentence.chars().count();
            if next_len >= max_len {
                complete = false;
                break;
            }
            summary.push(' ');
            summary.push_str(sentence);
        }
    }

    if !complete {
        summary.push_str(ELLIPSIS);
    }
    summary
}

fn truncate_at_word(sentence: &str, max_len: usize) -> String {
    let mut out = String::new();
    for word in sentence.split_whitespace() {
        let extra = usize::from(!out.is_empty());
        if out.chars().count() + extra + word.chars().count() > max_len {
            break;
        }
        if extra == 1 {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        out = sentence.chars().take(max_len).collect();
    }
    out
}
