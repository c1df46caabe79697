//! Error types for vbgm-ai
//!
//! Strategy failures are recoverable: the pipeline records the first
//! one for observability and moves on to the next strategy. None of these ever
//! reach a caller of [`crate::pipeline::SegmentPipeline::parse`] as an `Err`.

use thiserror::Error;

/// Why a single extraction strategy produced no segments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// No `{...}` or `[...]` span in the response
    #[error("no JSON object or array found in response")]
    NoJsonSpan,

    /// The located span is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(String),

    /// Valid JSON, but not one of the accepted top-level shapes
    #[error("unsupported JSON shape: {0}")]
    UnsupportedShape(String),

    /// No segment-shaped object blocks anchored on `start_time`
    #[error("no segment candidates found")]
    NoCandidates,

    /// Candidates were found but none survived validation
    #[error("no valid segments after validation")]
    NoValidSegments,

    /// Free text contains no `M:SS - M:SS` ranges
    #[error("no time ranges found in text")]
    NoTimeRanges,
}

impl From<serde_json::Error> for StrategyError {
    fn from(err: serde_json::Error) -> Self {
        StrategyError::Json(err.to_string())
    }
}

/// Result type for extraction strategies
pub type StrategyResult<T> = Result<T, StrategyError>;
