//! Strategy 3: time ranges in free-form prose
//!
//! For responses like "0:00-0:30: quiet opening. 0:30 to 1:10 the chase
//! starts!" with no JSON at all. Each range takes the text that follows it
//! as context; intensity and type come from the keyword lexicon and the
//! description is synthesized from templates.

use super::{find_time_ranges, ParsingStrategy};
use crate::error::{StrategyError, StrategyResult};
use crate::types::{MusicSegment, StrategyTag};
use crate::validators::segment::DEFAULT_REASON;
use crate::validators::SegmentValidator;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Trailing characters examined after each time range
pub const CONTEXT_CHARS: usize = 100;

static TIMECODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,3}:\d{2}\b").expect("valid timecode regex"));

#[derive(Debug, Clone)]
pub struct TextPatternExtractor {
    validator: Arc<SegmentValidator>,
}

impl TextPatternExtractor {
    pub fn new(validator: Arc<SegmentValidator>) -> Self {
        Self { validator }
    }
}

impl ParsingStrategy for TextPatternExtractor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::RegexExtraction
    }

    fn extract(&self, text: &str, max_segments: usize) -> StrategyResult<Vec<MusicSegment>> {
        let ranges = find_time_ranges(text);
        if ranges.is_empty() {
            return Err(StrategyError::NoTimeRanges);
        }

        let lexicon = self.validator.lexicon();
        let mut segments = Vec::new();
        for range in &ranges {
            if segments.len() >= max_segments {
                break;
            }

            let context = context_after(text, range.match_end);
            let reason = first_sentence(context);
            let reason = reason.as_deref().unwrap_or(DEFAULT_REASON);

            let built = self.validator.build_segment(
                range.start,
                range.end,
                reason,
                lexicon.infer_intensity(context),
                lexicon.infer_type(context),
            );
            match built {
                Some(segment) => segments.push(segment),
                None => debug!(start = range.start, end = range.end, "Skipping invalid time range"),
            }
        }

        debug!(ranges = ranges.len(), extracted = segments.len(), "Text pattern extraction finished");

        if segments.is_empty() {
            return Err(StrategyError::NoValidSegments);
        }
        Ok(segments)
    }
}

/// Up to [`CONTEXT_CHARS`] characters after `offset`, cut at the next time code
fn context_after(text: &str, offset: usize) -> &str {
    let tail = &text[offset..];
    let limit = tail
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    let window = &tail[..limit];

    match TIMECODE.find(window) {
        Some(next) => &window[..next.start()],
        None => window,
    }
}

/// First sentence of the context, stripped of list/markdown punctuation
fn first_sentence(context: &str) -> Option<String> {
    let trimmed = context.trim_start_matches(|c: char| !c.is_alphanumeric());
    let end = trimmed.find(['.', '!', '?', '\n']).unwrap_or(trimmed.len());
    let sentence = trimmed[..end]
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .trim();

    if sentence.is_empty() {
        None
    } else {
        Some(sentence.to_string())
    }
}
