//! Strategy 1: direct JSON parse
//!
//! Handles the common case where the model returned (mostly) clean JSON,
//! possibly wrapped in a markdown code fence or surrounded by prose.

use super::ParsingStrategy;
use crate::error::{StrategyError, StrategyResult};
use crate::types::{MusicSegment, StrategyTag};
use crate::validators::SegmentValidator;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("valid code fence regex"));

#[derive(Debug, Clone)]
pub struct StructuredExtractor {
    validator: Arc<SegmentValidator>,
}

impl StructuredExtractor {
    pub fn new(validator: Arc<SegmentValidator>) -> Self {
        Self { validator }
    }
}

impl ParsingStrategy for StructuredExtractor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::CleanJsonDirect
    }

    fn extract(&self, text: &str, max_segments: usize) -> StrategyResult<Vec<MusicSegment>> {
        let cleaned = strip_code_fences(text);
        let span = find_json_span(&cleaned).ok_or(StrategyError::NoJsonSpan)?;
        let value: Value = serde_json::from_str(span)?;
        let items = segment_array(&value)?;

        let limit = items.len().min(max_segments);
        debug!(entries = items.len(), limit, "Parsed JSON segment array");

        let segments = self.validator.validate_and_normalize_segments(&items[..limit]);
        if segments.is_empty() {
            return Err(StrategyError::NoValidSegments);
        }
        Ok(segments)
    }
}

/// Remove markdown code-fence markers (with or without a language tag)
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").into_owned()
}

/// Locate the first balanced `{…}` or `[…]` span
///
/// Brackets inside string literals are ignored. If the opening bracket never
/// balances, the span runs to the last matching closing bracket in the text.
pub fn find_json_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let bytes = text.as_bytes();

    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.last() == Some(&b) {
                    stack.pop();
                    if stack.is_empty() {
                        return Some(&text[start..=start + offset]);
                    }
                }
            }
            _ => {}
        }
    }

    // Unbalanced: greedy fallback to the last matching closer
    let closer = if bytes[start] == b'{' { '}' } else { ']' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

/// Accept `[...]`, `{"segments": [...]}` or `{"data": [...]}`
fn segment_array(value: &Value) -> StrategyResult<&[Value]> {
    match value {
        Value::Array(items) => Ok(items.as_slice()),
        Value::Object(map) => ["segments", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                StrategyError::UnsupportedShape("object without segments or data array".to_string())
            }),
        other => Err(StrategyError::UnsupportedShape(format!(
            "top-level {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
