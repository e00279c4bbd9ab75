use std::collections::HashSet;

use core_types::DEFAULT_CATEGORY;

use crate::tokenize::tokens;
use crate::topics::extract_topics;
use crate::words::CATEGORY_RULES;

/// First matching rule wins: Work, Personal, Learning, Health, Finance, Travel.
/// Organizations count towards Work, people towards Personal, places towards Travel.
pub fn suggest_category(text: &str) -> String {
    let tokens: HashSet<String> = tokens(text).into_iter().collect();
    let topics = extract_topics(text);

    for (category, keywords) in CATEGORY_RULES {
        let by_entity = match *category {
            "Work" => !topics.organizations.is_empty(),
            "Personal" => !topics.people.is_empty(),
            "Travel" => !topics.places.is_empty(),
            _ => false,
        };
        if by_entity || keywords.iter().any(|keyword| tokens.contains(*keyword)) {
            return (*category).to_string();
        }
    }

    DEFAULT_CATEGORY.to_string()
}
