//! Extraction strategies
//!
//! Each strategy turns raw model output into validated segments in its own
//! way, from strict JSON parsing down to canned archetypes. The pipeline
//! tries them in order of decreasing fidelity.
//!
//! # Strategies
//!
//! 1. [`StructuredExtractor`]: whole-document JSON
//! 2. [`BrokenJsonRecoverer`]: per-object recovery from damaged JSON
//! 3. [`TextPatternExtractor`]: time ranges in prose
//! 4. [`EmergencyFallbackGenerator`]: archetypes, never fails

pub mod broken_json;
pub mod emergency;
pub mod structured;
pub mod text_pattern;

pub use broken_json::BrokenJsonRecoverer;
pub use emergency::EmergencyFallbackGenerator;
pub use structured::StructuredExtractor;
pub use text_pattern::TextPatternExtractor;

use crate::error::StrategyResult;
use crate::types::{MusicSegment, StrategyTag};
use once_cell::sync::Lazy;
use regex::Regex;
use vbgm_common::time::parse_time_to_seconds;

/// Uniform contract for extraction strategies
///
/// An `Ok` result may still be empty (nothing usable); the pipeline treats
/// that the same as an error and moves on.
pub trait ParsingStrategy: Send + Sync + std::fmt::Debug {
    /// Provenance tag reported when this strategy wins
    fn tag(&self) -> StrategyTag;

    /// Extract at most `max_segments` validated segments from `text`
    fn extract(&self, text: &str, max_segments: usize) -> StrategyResult<Vec<MusicSegment>>;
}

/// `M:SS to M:SS`, `M:SS - M:SS`, `M:SS – M:SS`
static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}:\d{2})\s*(?:to|-|–|—)\s*(\d{1,3}:\d{2})\b")
        .expect("valid time range regex")
});

/// A time range found in free text
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TimeRangeMatch {
    pub start: f64,
    pub end: f64,
    /// Byte offset just past the match
    pub match_end: usize,
}

/// All time ranges in document order, decoded leniently
pub(crate) fn find_time_ranges(text: &str) -> Vec<TimeRangeMatch> {
    TIME_RANGE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(TimeRangeMatch {
                start: parse_time_to_seconds(caps.get(1)?.as_str()),
                end: parse_time_to_seconds(caps.get(2)?.as_str()),
                match_end: whole.end(),
            })
        })
        .collect()
}
