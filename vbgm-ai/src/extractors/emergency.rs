//! Strategy 4: emergency fallback
//!
//! Last resort when nothing in the response could be parsed. Produces a
//! usable soundtrack plan from canned archetypes so the caller always gets
//! segments. Any time ranges still visible in the text are honored; otherwise
//! archetypes are laid out on a fixed 30 second grid.

use super::{find_time_ranges, ParsingStrategy};
use crate::error::StrategyResult;
use crate::templates::Archetype;
use crate::types::{MusicSegment, StrategyTag};
use crate::validators::segment::DEFAULT_FADE_DURATION;
use crate::validators::{meets_time_invariants, DescriptionContext, SegmentValidator};
use std::sync::Arc;
use tracing::debug;
use vbgm_common::FadeCurve;

/// Length of each canonical fallback slot (seconds)
pub const CANONICAL_SLOT_SECONDS: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct EmergencyFallbackGenerator {
    validator: Arc<SegmentValidator>,
}

impl EmergencyFallbackGenerator {
    pub fn new(validator: Arc<SegmentValidator>) -> Self {
        Self { validator }
    }

    /// Infallible form of [`ParsingStrategy::extract`]
    pub fn generate(&self, text: &str, max_segments: usize) -> Vec<MusicSegment> {
        let archetypes = &self.validator.templates().archetypes;
        if archetypes.is_empty() || max_segments == 0 {
            return Vec::new();
        }

        // (a) time ranges from the text, archetypes assigned round-robin
        let from_ranges: Vec<MusicSegment> = find_time_ranges(text)
            .into_iter()
            .filter(|r| meets_time_invariants(r.start, r.end))
            .take(max_segments)
            .enumerate()
            .map(|(i, r)| self.from_archetype(&archetypes[i % archetypes.len()], r.start, r.end))
            .collect();

        if from_ranges.len() >= max_segments.min(2) {
            debug!(count = from_ranges.len(), "Fallback using time ranges from text");
            return from_ranges;
        }

        // (b) canonical grid, one slot per archetype
        let count = max_segments.min(archetypes.len());
        debug!(count, "Fallback using canonical archetype grid");
        archetypes
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, archetype)| {
                let start = i as f64 * CANONICAL_SLOT_SECONDS;
                self.from_archetype(archetype, start, start + CANONICAL_SLOT_SECONDS)
            })
            .collect()
    }

    fn from_archetype(&self, archetype: &Archetype, start: f64, end: f64) -> MusicSegment {
        let ctx = DescriptionContext {
            segment_type: archetype.segment_type,
            intensity: archetype.intensity,
            reason: &archetype.reason,
            duration_seconds: end - start,
        };
        // Pass-through for well-formed archetypes; repairs user-supplied tables
        let detailed_description = self
            .validator
            .description_repair()
            .repair(Some(&archetype.detailed_description), &ctx);

        MusicSegment {
            start_time: start,
            end_time: end,
            reason: archetype.reason.clone(),
            intensity: archetype.intensity,
            segment_type: archetype.segment_type,
            music_summary: archetype.music_summary.clone(),
            detailed_description,
            volume: archetype.volume.min(100),
            fade_algorithm: FadeCurve::default(),
            fadein_duration: DEFAULT_FADE_DURATION.to_string(),
            fadeout_duration: DEFAULT_FADE_DURATION.to_string(),
        }
    }
}

impl ParsingStrategy for EmergencyFallbackGenerator {
    fn tag(&self) -> StrategyTag {
        StrategyTag::EmergencyFallback
    }

    fn extract(&self, text: &str, max_segments: usize) -> StrategyResult<Vec<MusicSegment>> {
        Ok(self.generate(text, max_segments))
    }
}
