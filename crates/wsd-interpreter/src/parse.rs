//! Parsing raw interpreter output into a [`Proposal`].

use crate::error::InterpreterError;
use crate::types::Proposal;

/// Parse a proposal from bare JSON or a fenced ```` ```json ```` block.
///
/// # Errors
///
/// Returns `InterpreterError::Malformed` for anything else.
pub fn parse_proposal(raw: &str) -> Result<Proposal, InterpreterError> {
    let body = extract_json(raw);
    if body.is_empty() {
        return Err(InterpreterError::Malformed("empty output".into()));
    }
    serde_json::from_str(body).map_err(|e| InterpreterError::Malformed(e.to_string()))
}

/// Byte offset of the first ```` ``` ```` that opens a line.
fn fence_start(text: &str) -> Option<usize> {
    text.match_indices("```")
        .map(|(i, _)| i)
        .find(|&i| i == 0 || text[..i].ends_with('\n'))
}

fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    // Backticks inside a bare object's strings are content, not a fence.
    if trimmed.starts_with('{') {
        return trimmed;
    }
    let Some(start) = fence_start(trimmed) else {
        return trimmed;
    };
    let after_fence = &trimmed[start + 3..];
    // Skip the info string (`json`, `JSON`, or nothing) up to the newline.
    let body_start = after_fence.find('\n').map_or(after_fence.len(), |i| i + 1);
    let body = &after_fence[body_start..];
    fence_start(body).map_or(body, |end| &body[..end]).trim()
}
