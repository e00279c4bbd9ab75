use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_BODY_CHARS: usize = 100_000;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_CHARS: usize = 50;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title is {0} characters, the limit is {MAX_TITLE_CHARS}")]
    TitleTooLong(usize),
    #[error("body must not be empty")]
    EmptyBody,
    #[error("body is {0} characters, the limit is {MAX_BODY_CHARS}")]
    BodyTooLong(usize),
    #[error("{0} tags given, the limit is {MAX_TAGS}")]
    TooManyTags(usize),
    #[error("invalid tag `{0}`: use 1-{MAX_TAG_CHARS} of A-Z, a-z, 0-9, `_` or `-`")]
    InvalidTag(String),
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong(len));
    }
    Ok(())
}

pub fn validate_body(body: &str) -> Result<(), ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::EmptyBody);
    }
    let len = body.chars().count();
    if len > MAX_BODY_CHARS {
        return Err(ValidationError::BodyTooLong(len));
    }
    Ok(())
}

pub fn validate_tags<'a>(tags: impl IntoIterator<Item = &'a String>) -> Result<(), ValidationError> {
    let mut count = 0;
    for tag in tags {
        if !is_valid_tag(tag) {
            return Err(ValidationError::InvalidTag(tag.clone()));
        }
        count += 1;
    }
    if count > MAX_TAGS {
        return Err(ValidationError::TooManyTags(count));
    }
    Ok(())
}

/// `[A-Za-z0-9_-]{1,50}`
pub fn is_valid_tag(tag: &str) -> bool {
    (1..=MAX_TAG_CHARS).contains(&tag.len())
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
