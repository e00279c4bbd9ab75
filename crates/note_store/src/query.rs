use core_types::{Note, NoteId};
use serde::Serialize;

/// Caller-supplied fields for a new note. `None` (or an empty value) lets
/// the annotator infer category and tags.
#[derive(Debug, Clone, Default)]
pub struct NewNoteOptions {
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Overrides the store's `encrypt_by_default`.
    pub encrypt: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub encrypt: Option<bool>,
}

impl NotePatch {
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteLookup {
    Id(NoteId),
    /// Case-insensitive exact title.
    Title(String),
}

impl NoteLookup {
    pub(crate) fn matches(&self, note: &Note) -> bool {
        match self {
            Self::Id(id) => note.id == *id,
            Self::Title(title) => note.title_matches(title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Body,
    Tags,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub fields: Vec<SearchField>,
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: vec![SearchField::Title, SearchField::Body, SearchField::Tags],
            case_sensitive: false,
        }
    }
}

impl SearchOptions {
    pub(crate) fn matches(&self, note: &Note, query: &str) -> bool {
        let needle = if self.case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        let contains = |haystack: &str| {
            if self.case_sensitive {
                haystack.contains(&needle)
            } else {
                haystack.to_lowercase().contains(&needle)
            }
        };

        self.fields.iter().any(|field| match field {
            SearchField::Title => contains(&note.title),
            SearchField::Body => contains(&note.body),
            SearchField::Tags => note.tags.iter().any(|tag| contains(tag)),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Mark every record as encrypted before writing.
    pub encrypt: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarNote {
    pub note: Note,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Note {
        let mut note = Note::new(1, "Grocery List", "Buy Apples and bread");
        note.tags = ["errands", "Food"].into_iter().map(String::from).collect();
        note
    }

    #[test]
    fn lookup_by_id_or_title() {
        let note = note();
        assert!(NoteLookup::Id(1).matches(&note));
        assert!(!NoteLookup::Id(2).matches(&note));
        assert!(NoteLookup::Title("grocery list".into()).matches(&note));
        assert!(!NoteLookup::Title("grocery".into()).matches(&note));
    }

    #[test]
    fn search_respects_fields_and_case() {
        let note = note();
        let all = SearchOptions::default();
        assert!(all.matches(&note, "apples"));
        assert!(all.matches(&note, "food"));
        assert!(!all.matches(&note, "milk"));

        let sensitive = SearchOptions {
            fields: vec![SearchField::Body],
            case_sensitive: true,
        };
        assert!(sensitive.matches(&note, "Apples"));
        assert!(!sensitive.matches(&note, "apples"));

        let titles = SearchOptions {
            fields: vec![SearchField::Title],
            case_sensitive: false,
        };
        assert!(!titles.matches(&note, "bread"));
        assert!(titles.matches(&note, "LIST"));
    }
}
