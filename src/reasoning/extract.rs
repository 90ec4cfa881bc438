//! Structured-output recovery from free-text reasoning responses
//!
//! The preferred path is a direct parse of the whole response. When the
//! backend wraps the record in prose, the fenced or brace-delimited block
//! is extracted instead; that path is logged as degraded, never silent.

use serde_json::Value;
use tracing::warn;

/// Parse a reasoning response into a JSON value.
pub fn parse_structured(content: &str) -> Option<Value> {
    // Whole-response parse first
    if let Ok(value) = serde_json::from_str::<Value>(content.trim()) {
        return Some(value);
    }

    // Fenced ```json block
    if let Some(block) = fenced_block(content) {
        if let Ok(value) = serde_json::from_str::<Value>(block) {
            warn!("structured output recovered from fenced block");
            return Some(value);
        }
    }

    // Outermost brace-delimited span
    if let Some(block) = brace_span(content) {
        if let Ok(value) = serde_json::from_str::<Value>(block) {
            warn!("structured output recovered from embedded braces");
            return Some(value);
        }
    }

    None
}

fn fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```json").map(|i| i + "```json".len())
        .or_else(|| content.find("```").map(|i| i + "```".len()))?;
    let rest = &content[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn brace_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end > start {
        Some(&content[start..=end])
    } else {
        None
    }
}
