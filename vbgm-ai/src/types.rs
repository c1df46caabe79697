// Shared Types and Data Contracts
//
// Defines the contract between the extraction strategies, the validation layer
// and the downstream mixer. Every `MusicSegment` that leaves this crate has all
// fields populated and within range; the mixer performs no further checks.

use serde::{Deserialize, Serialize};
use vbgm_common::FadeCurve;

/// Minimum playable segment length (seconds)
pub const MIN_SEGMENT_SECONDS: f64 = 1.0;

// ============================================================================
// Segment Classification
// ============================================================================

/// Loudness class of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }

    /// Position in `[low, medium, high]` tables
    pub fn index(&self) -> usize {
        match self {
            Intensity::Low => 0,
            Intensity::Medium => 1,
            Intensity::High => 2,
        }
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Musical role of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Ambient,
    Rhythmic,
    Emotional,
    Dramatic,
    Energetic,
    Suspenseful,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Ambient => "ambient",
            SegmentType::Rhythmic => "rhythmic",
            SegmentType::Emotional => "emotional",
            SegmentType::Dramatic => "dramatic",
            SegmentType::Energetic => "energetic",
            SegmentType::Suspenseful => "suspenseful",
        }
    }

    pub fn all_variants() -> &'static [SegmentType] {
        &[
            SegmentType::Ambient,
            SegmentType::Rhythmic,
            SegmentType::Emotional,
            SegmentType::Dramatic,
            SegmentType::Energetic,
            SegmentType::Suspenseful,
        ]
    }
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Music Segment (pipeline output)
// ============================================================================

/// A time-bounded video interval recommended for background music
///
/// Invariants (enforced by `SegmentValidator`):
/// - `start_time >= 0`
/// - `end_time > start_time` and `end_time - start_time >= 1`
/// - `detailed_description` satisfies the dual-line contract
/// - `volume` in 0..=100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicSegment {
    /// Seconds from start of video
    pub start_time: f64,
    /// Seconds from start of video
    pub end_time: f64,
    pub reason: String,
    pub intensity: Intensity,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub music_summary: String,
    /// `Prompt: ...` line, newline, `Music Style: ...` line
    pub detailed_description: String,
    pub volume: u8,
    pub fade_algorithm: FadeCurve,
    /// Decimal seconds as text, e.g. `"2.0"`
    pub fadein_duration: String,
    /// Decimal seconds as text, e.g. `"2.0"`
    pub fadeout_duration: String,
}

impl MusicSegment {
    /// True if the two half-open ranges `[start, end)` intersect
    pub fn overlaps(&self, other: &MusicSegment) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

// ============================================================================
// Parse Result (pipeline provenance)
// ============================================================================

/// Which strategy produced the segments in a `ParseResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    CleanJsonDirect,
    ValidSegmentExtraction,
    RegexExtraction,
    EmergencyFallback,
}

impl StrategyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyTag::CleanJsonDirect => "clean_json_direct",
            StrategyTag::ValidSegmentExtraction => "valid_segment_extraction",
            StrategyTag::RegexExtraction => "regex_extraction",
            StrategyTag::EmergencyFallback => "emergency_fallback",
        }
    }
}

impl std::fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline run
///
/// `parse_error` carries the first strategy failure when a fallback path was
/// taken. It is informational only; `segments` is always usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub segments: Vec<MusicSegment>,
    #[serde(rename = "parseError")]
    pub parse_error: Option<String>,
    pub strategy: StrategyTag,
}

impl ParseResult {
    /// Extraction came from the model's own output rather than synthesis
    pub fn is_trustworthy(&self) -> bool {
        self.strategy != StrategyTag::EmergencyFallback
    }

    /// Index pairs `(i, j)`, `i < j`, of segments with overlapping ranges
    ///
    /// Overlaps are reported, never rejected or merged.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.segments.iter().enumerate() {
            for (j, b) in self.segments.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
