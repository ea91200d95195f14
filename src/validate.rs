use crate::errors::SummarizeError;

pub const DEFAULT_MIN_TEXT_CHARS: usize = 100;

/// Rejects text shorter than `min_chars` characters (not bytes).
pub fn validate_text(text: &str, min_chars: usize) -> Result<&str, SummarizeError> {
    let chars = text.chars().count();
    if chars < min_chars {
        return Err(SummarizeError::TooShort {
            chars,
            min: min_chars,
        });
    }
    Ok(text)
}
