//! Length rules for thought messages.
//!
//! Both the server and the feed client go through this module, so the 5/140
//! bounds live in exactly one place. Lengths count `char`s, not bytes.

use thiserror::Error;

pub const MIN_MESSAGE_LEN: usize = 5;
pub const MAX_MESSAGE_LEN: usize = 140;

/// Why a message was refused. The `Display` text is what users see and
/// each one carries the keyword [`ValidationError::from_server_message`]
/// looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Your thought cannot be empty. Please write something!")]
    EmptyMessage,
    #[error("Your thought is too short. Please write at least 5 characters.")]
    TooShort,
    #[error("Your thought is too long. Please keep it under 140 characters.")]
    TooLong,
}

impl ValidationError {
    /// Maps a free-form rejection message back onto a validation category.
    pub fn from_server_message(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if has(&["empty", "required"]) {
            Some(Self::EmptyMessage)
        } else if has(&["short", "minimum"]) {
            Some(Self::TooShort)
        } else if has(&["long", "exceed"]) {
            Some(Self::TooLong)
        } else {
            None
        }
    }
}

/// Checks a raw message and returns it trimmed.
///
/// Order matters: blank input is `EmptyMessage` even though it is also short,
/// and the upper bound applies to the untrimmed text.
pub fn validate_message(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if trimmed.chars().count() < MIN_MESSAGE_LEN {
        return Err(ValidationError::TooShort);
    }
    if raw.chars().count() > MAX_MESSAGE_LEN {
        return Err(ValidationError::TooLong);
    }
    Ok(trimmed)
}
