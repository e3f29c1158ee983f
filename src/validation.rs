//! Field checks that `validator`'s built-in rules don't cover. Used from
//! `#[validate(custom(function = ...))]` on request payloads; the message is
//! set at the use site.

use validator::ValidationError;

pub const MEDIA_TYPES: &[&str] = &["image", "video", "gif", "file"];
pub const MAX_TAG: usize = 50;

/// Trimmed value must not be empty.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub fn no_whitespace(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("whitespace"));
    }
    Ok(())
}

/// Blank means "no media" and passes.
pub fn media_type(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || MEDIA_TYPES.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("media_type"))
    }
}

pub fn tag_lengths(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|t| t.trim().chars().count() > MAX_TAG) {
        return Err(ValidationError::new("tag_length"));
    }
    Ok(())
}
