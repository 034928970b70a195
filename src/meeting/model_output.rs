//! Pulling JSON out of language-model replies.
//
// Models wrap JSON in prose or ```json fences. Try the whole text, then the
// fenced block, then every balanced top-level object in order.

use crate::error::MeetingError;
use log::debug;
use serde::de::DeserializeOwned;

/// Deserialize the first JSON object in `text` that fits `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, MeetingError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MeetingError::MalformedModelOutput("empty reply".to_string()));
    }

    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Ok(value);
    }

    let unfenced = strip_code_fence(trimmed);
    if let Ok(value) = serde_json::from_str::<T>(unfenced) {
        return Ok(value);
    }

    let mut last_error = None;
    for candidate in balanced_objects(unfenced) {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!("Skipping JSON candidate: {}", e);
                last_error = Some(e.to_string());
            }
        }
    }

    Err(MeetingError::MalformedModelOutput(
        last_error.unwrap_or_else(|| "no JSON object found".to_string()),
    ))
}

/// Inner text of the first ``` fenced block, or the input when there is none.
fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_open = &text[open + 3..];
    // skip the language tag line
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Top-level `{...}` spans, string literals respected.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        spans.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    spans
}
