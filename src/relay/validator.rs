use crate::error::{RelayError, Result};
use crate::models::GenerationRequest;

pub const MISSING_PROMPT: &str = "The 'prompt' parameter is required";

/// Trims the raw prompt and rejects it when absent, blank or longer than
/// `max_chars` characters.
pub fn validate_prompt(raw: Option<&str>, max_chars: usize) -> Result<GenerationRequest> {
    let prompt = raw.map(str::trim).unwrap_or_default();

    if prompt.is_empty() {
        return Err(RelayError::ValidationError(MISSING_PROMPT.to_string()));
    }

    if prompt.chars().count() > max_chars {
        return Err(RelayError::ValidationError(format!(
            "The 'prompt' parameter must be at most {} characters",
            max_chars
        )));
    }

    Ok(GenerationRequest {
        prompt: prompt.to_string(),
    })
}
