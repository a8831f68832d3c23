use crate::utils::error::{AppError, AppResult};

pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Validates trimmed message content: non-empty, at most 1000 characters.
/// Returns the trimmed content that should actually be stored.
pub fn validate_message_content(content: &str) -> AppResult<&str> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Message content cannot be empty".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message content must be at most {} characters long",
            MAX_MESSAGE_CHARS
        )));
    }

    Ok(trimmed)
}
