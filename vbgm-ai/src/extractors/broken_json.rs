//! Strategy 2: per-object recovery from damaged JSON
//!
//! When the document as a whole does not parse (truncated output, a stray
//! comma, Python-style quoting), individual segment objects usually still do.
//! Objects are located by their `start_time` key, repaired locally and parsed
//! one at a time so a single bad object never sinks the rest.

use super::ParsingStrategy;
use crate::error::{StrategyError, StrategyResult};
use crate::types::{MusicSegment, StrategyTag};
use crate::validators::{is_valid_segment, SegmentValidator};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

static START_TIME_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']start_time["']"#).expect("valid start_time regex"));

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing comma regex"));

#[derive(Debug, Clone)]
pub struct BrokenJsonRecoverer {
    validator: Arc<SegmentValidator>,
}

impl BrokenJsonRecoverer {
    pub fn new(validator: Arc<SegmentValidator>) -> Self {
        Self { validator }
    }
}

impl ParsingStrategy for BrokenJsonRecoverer {
    fn tag(&self) -> StrategyTag {
        StrategyTag::ValidSegmentExtraction
    }

    fn extract(&self, text: &str, max_segments: usize) -> StrategyResult<Vec<MusicSegment>> {
        let candidates = candidate_spans(text);
        if candidates.is_empty() {
            return Err(StrategyError::NoCandidates);
        }

        let mut segments = Vec::new();
        for (index, raw) in candidates.iter().enumerate() {
            if segments.len() >= max_segments {
                break;
            }

            let repaired = repair_candidate(raw);
            let value: Value = match serde_json::from_str(&repaired) {
                Ok(value) => value,
                Err(e) => {
                    debug!(index, error = %e, "Candidate unparseable after repair");
                    continue;
                }
            };
            if !is_valid_segment(&value) {
                debug!(index, "Recovered object failed segment checks");
                continue;
            }
            if let Some(segment) = self.validator.normalize_segment(&value) {
                segments.push(segment);
            }
        }

        debug!(
            candidates = candidates.len(),
            recovered = segments.len(),
            "Broken JSON recovery finished"
        );

        if segments.is_empty() {
            return Err(StrategyError::NoValidSegments);
        }
        Ok(segments)
    }
}

/// Object spans anchored on a `start_time` key, in document order
///
/// Each span runs from the nearest `{` before the key to the next `}` after
/// it. A span without a closing brace (output cut off mid-object) is dropped.
fn candidate_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut consumed = 0;

    for key in START_TIME_KEY.find_iter(text) {
        if key.start() < consumed {
            continue;
        }

        let Some(open) = text[consumed..key.start()].rfind('{').map(|i| i + consumed) else {
            debug!(offset = key.start(), "start_time key without opening brace");
            continue;
        };
        let Some(close) = text[key.end()..].find('}').map(|i| i + key.end()) else {
            debug!(offset = open, "Discarding truncated object");
            continue;
        };

        spans.push(&text[open..=close]);
        consumed = close + 1;
    }

    spans
}

/// Local repairs for one candidate object, applied in order:
/// single → double quotes, close a string cut off before `}`, drop trailing commas
pub fn repair_candidate(candidate: &str) -> String {
    let quoted = normalize_quotes(candidate);
    let closed = close_truncated_string(&quoted);
    TRAILING_COMMA.replace_all(&closed, "$1").into_owned()
}

/// Rewrite single-quoted strings as double-quoted ones
///
/// Apostrophes inside double-quoted strings are left alone.
fn normalize_quotes(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in candidate.chars() {
        let Some(q) = quote else {
            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    out.push('"');
                }
                _ => out.push(c),
            }
            continue;
        };

        if escaped {
            escaped = false;
            if q == '\'' && c == '\'' {
                // `\'` is not a JSON escape
                out.pop();
            }
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            _ if c == q => {
                quote = None;
                out.push('"');
            }
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }

    out
}

/// `{"reason": "cut off}` → `{"reason": "cut off"}`
fn close_truncated_string(candidate: &str) -> String {
    let Some(body) = candidate.strip_suffix('}') else {
        return candidate.to_string();
    };

    let mut in_string = false;
    let mut escaped = false;
    for c in body.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ => {}
        }
    }

    if in_string {
        format!("{}\"}}", body)
    } else {
        candidate.to_string()
    }
}
