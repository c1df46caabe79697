//! Segment validation and normalization
//!
//! Turns loosely-typed JSON candidates into [`MusicSegment`]s:
//! decode times, normalize enums, fill defaults, repair the description and
//! finally enforce the time invariants. Candidates that fail are dropped
//! individually; the batch always survives.

use crate::lexicon::KeywordLexicon;
use crate::templates::TemplateTables;
use crate::types::{Intensity, MusicSegment, SegmentType, MIN_SEGMENT_SECONDS};
use crate::validators::description::{DescriptionContext, DescriptionRepair};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use vbgm_common::time::time_value_to_seconds;
use vbgm_common::FadeCurve;

pub const DEFAULT_VOLUME: u8 = 60;
pub const DEFAULT_FADE_DURATION: &str = "2.0";
pub const DEFAULT_REASON: &str = "Background music";

/// Cheap structural filter for a raw candidate object
///
/// Requires numeric (or time code) `start_time`/`end_time` with
/// `end > start` and `start >= 0`, plus non-null `reason`, `intensity` and
/// `type` fields. Does not check the minimum segment length.
pub fn is_valid_segment(candidate: &Value) -> bool {
    let Some(obj) = candidate.as_object() else {
        return false;
    };

    let (Some(start), Some(end)) = (time_field(obj, "start_time"), time_field(obj, "end_time")) else {
        return false;
    };

    start >= 0.0
        && end > start
        && ["reason", "intensity", "type"]
            .iter()
            .all(|key| obj.get(*key).map(|v| !v.is_null()).unwrap_or(false))
}

/// Time invariants every emitted segment satisfies
pub fn meets_time_invariants(start: f64, end: f64) -> bool {
    start.is_finite()
        && end.is_finite()
        && start >= 0.0
        && end > start
        && end - start >= MIN_SEGMENT_SECONDS
}

fn time_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        v @ (Value::Number(_) | Value::String(_)) => Some(time_value_to_seconds(v)),
        _ => None,
    }
}

/// Scalar JSON value as trimmed text (strings and numbers only)
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match obj.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match obj.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('s').trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn volume_field(obj: &Map<String, Value>) -> u8 {
    number_field(obj, "volume")
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(DEFAULT_VOLUME)
}

fn fade_duration_field(obj: &Map<String, Value>, key: &str) -> String {
    match number_field(obj, key) {
        Some(v) if v >= 0.0 => format!("{:.1}", v),
        _ => DEFAULT_FADE_DURATION.to_string(),
    }
}

/// Segment validator with injected lexicon and templates
///
/// Stateless apart from its immutable tables; safe to share across threads.
#[derive(Debug, Clone)]
pub struct SegmentValidator {
    lexicon: Arc<KeywordLexicon>,
    templates: Arc<TemplateTables>,
    repair: DescriptionRepair,
}

impl Default for SegmentValidator {
    fn default() -> Self {
        Self::new(
            Arc::new(KeywordLexicon::default()),
            Arc::new(TemplateTables::default()),
        )
    }
}

impl SegmentValidator {
    pub fn new(lexicon: Arc<KeywordLexicon>, templates: Arc<TemplateTables>) -> Self {
        let repair = DescriptionRepair::new(lexicon.clone(), templates.clone());
        Self {
            lexicon,
            templates,
            repair,
        }
    }

    pub fn lexicon(&self) -> &KeywordLexicon {
        &self.lexicon
    }

    pub fn templates(&self) -> &TemplateTables {
        &self.templates
    }

    pub fn description_repair(&self) -> &DescriptionRepair {
        &self.repair
    }

    /// Case-insensitive intensity keyword match (default `Medium`)
    pub fn normalize_intensity(&self, value: &str) -> Intensity {
        self.lexicon.infer_intensity(value)
    }

    /// Canonicalize a segment type keyword (default `Ambient`)
    pub fn normalize_type(&self, value: &str) -> SegmentType {
        self.lexicon.infer_type(value)
    }

    /// Normalize a batch, dropping candidates that fail the invariants
    ///
    /// Output preserves input order.
    pub fn validate_and_normalize_segments(&self, raw: &[Value]) -> Vec<MusicSegment> {
        let segments: Vec<MusicSegment> = raw
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let segment = self.normalize_segment(candidate);
                if segment.is_none() {
                    debug!(index, "Dropped invalid segment candidate");
                }
                segment
            })
            .collect();

        debug!(
            candidates = raw.len(),
            accepted = segments.len(),
            "Validated segment batch"
        );
        segments
    }

    /// Normalize one candidate object
    pub fn normalize_segment(&self, candidate: &Value) -> Option<MusicSegment> {
        let obj = candidate.as_object()?;

        let start = time_field(obj, "start_time").unwrap_or(0.0);
        let end = time_field(obj, "end_time").unwrap_or(0.0);
        if !meets_time_invariants(start, end) {
            debug!(start, end, "Segment violates time invariants");
            return None;
        }

        let intensity = text_field(obj, "intensity")
            .map(|v| self.normalize_intensity(&v))
            .unwrap_or(Intensity::Medium);
        let segment_type = text_field(obj, "type")
            .or_else(|| text_field(obj, "segment_type"))
            .map(|v| self.normalize_type(&v))
            .unwrap_or(SegmentType::Ambient);
        let reason = text_field(obj, "reason").unwrap_or_else(|| DEFAULT_REASON.to_string());
        let music_summary = text_field(obj, "music_summary")
            .unwrap_or_else(|| default_summary(intensity, segment_type));
        let fade_algorithm = text_field(obj, "fade_algorithm")
            .and_then(|v| FadeCurve::from_str(&v))
            .unwrap_or_default();

        let description_ctx = DescriptionContext {
            segment_type,
            intensity,
            reason: &reason,
            duration_seconds: end - start,
        };
        let raw_description = obj.get("detailed_description").and_then(Value::as_str);
        let detailed_description = self.repair.repair(raw_description, &description_ctx);

        Some(MusicSegment {
            start_time: start,
            end_time: end,
            reason,
            intensity,
            segment_type,
            music_summary,
            detailed_description,
            volume: volume_field(obj),
            fade_algorithm,
            fadein_duration: fade_duration_field(obj, "fadein_duration"),
            fadeout_duration: fade_duration_field(obj, "fadeout_duration"),
        })
    }

    /// Build a segment from already-decoded parts (free-text extraction)
    ///
    /// The description is always synthesized. Returns `None` if the times
    /// violate the invariants.
    pub fn build_segment(
        &self,
        start: f64,
        end: f64,
        reason: &str,
        intensity: Intensity,
        segment_type: SegmentType,
    ) -> Option<MusicSegment> {
        if !meets_time_invariants(start, end) {
            debug!(start, end, "Segment violates time invariants");
            return None;
        }

        let ctx = DescriptionContext {
            segment_type,
            intensity,
            reason,
            duration_seconds: end - start,
        };
        Some(MusicSegment {
            start_time: start,
            end_time: end,
            reason: reason.to_string(),
            intensity,
            segment_type,
            music_summary: default_summary(intensity, segment_type),
            detailed_description: self.repair.repair(None, &ctx),
            volume: DEFAULT_VOLUME,
            fade_algorithm: FadeCurve::default(),
            fadein_duration: DEFAULT_FADE_DURATION.to_string(),
            fadeout_duration: DEFAULT_FADE_DURATION.to_string(),
        })
    }
}

fn default_summary(intensity: Intensity, segment_type: SegmentType) -> String {
    let level = match intensity {
        Intensity::Low => "Low",
        Intensity::Medium => "Medium",
        Intensity::High => "High",
    };
    format!("{}-intensity {} background", level, segment_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::description::validate_dual_output_description;
    use serde_json::json;

    #[test]
    fn test_is_valid_segment() {
        let ok = json!({"start_time": "0:10", "end_time": "0:40", "reason": "r", "intensity": "low", "type": "ambient"});
        assert!(is_valid_segment(&ok));

        let numeric = json!({"start_time": 10, "end_time": 40.5, "reason": "r", "intensity": "low", "type": "ambient"});
        assert!(is_valid_segment(&numeric));
    }

    #[test]
    fn test_is_valid_segment_rejects() {
        // end before start
        assert!(!is_valid_segment(&json!({"start_time": "1:00", "end_time": "0:30", "reason": "r", "intensity": "low", "type": "x"})));
        // missing type
        assert!(!is_valid_segment(&json!({"start_time": "0:00", "end_time": "0:30", "reason": "r", "intensity": "low"})));
        // null reason
        assert!(!is_valid_segment(&json!({"start_time": "0:00", "end_time": "0:30", "reason": null, "intensity": "low", "type": "x"})));
        // non-scalar time
        assert!(!is_valid_segment(&json!({"start_time": [0], "end_time": "0:30", "reason": "r", "intensity": "low", "type": "x"})));
        assert!(!is_valid_segment(&json!("0:00 - 0:30")));
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let validator = SegmentValidator::default();
        let segment = validator
            .normalize_segment(&json!({"start_time": "0:05", "end_time": "0:35"}))
            .unwrap();

        assert_eq!(segment.start_time, 5.0);
        assert_eq!(segment.end_time, 35.0);
        assert_eq!(segment.reason, DEFAULT_REASON);
        assert_eq!(segment.intensity, Intensity::Medium);
        assert_eq!(segment.segment_type, SegmentType::Ambient);
        assert_eq!(segment.music_summary, "Medium-intensity ambient background");
        assert_eq!(segment.volume, 60);
        assert_eq!(segment.fade_algorithm, FadeCurve::Linear);
        assert_eq!(segment.fadein_duration, "2.0");
        assert_eq!(segment.fadeout_duration, "2.0");
        assert!(validate_dual_output_description(&segment.detailed_description));
    }

    #[test]
    fn test_normalize_coerces_fields() {
        let validator = SegmentValidator::default();
        let segment = validator
            .normalize_segment(&json!({
                "start_time": 12,
                "end_time": "1:05",
                "reason": "  Chase begins ",
                "intensity": "LOUD",
                "type": "Action",
                "volume": "140",
                "fade_algorithm": "S-Curve",
                "fadein_duration": 1.5,
                "fadeout_duration": "3s",
            }))
            .unwrap();

        assert_eq!(segment.end_time, 65.0);
        assert_eq!(segment.reason, "Chase begins");
        assert_eq!(segment.intensity, Intensity::High);
        assert_eq!(segment.segment_type, SegmentType::Energetic);
        assert_eq!(segment.volume, 100);
        assert_eq!(segment.fade_algorithm, FadeCurve::SCurve);
        assert_eq!(segment.fadein_duration, "1.5");
        assert_eq!(segment.fadeout_duration, "3.0");
    }

    #[test]
    fn test_unknown_fade_and_bad_durations_default() {
        let validator = SegmentValidator::default();
        let segment = validator
            .normalize_segment(&json!({
                "start_time": 0, "end_time": 10,
                "fade_algorithm": "swoosh",
                "fadein_duration": -1,
                "fadeout_duration": "soon",
                "volume": -20,
            }))
            .unwrap();
        assert_eq!(segment.fade_algorithm, FadeCurve::Linear);
        assert_eq!(segment.fadein_duration, "2.0");
        assert_eq!(segment.fadeout_duration, "2.0");
        assert_eq!(segment.volume, 0);
    }

    #[test]
    fn test_batch_drops_invalid_and_preserves_order() {
        let validator = SegmentValidator::default();
        let raw = vec![
            json!({"start_time": "0:30", "end_time": "1:00", "reason": "second in time"}),
            json!({"start_time": "1:00", "end_time": "0:30"}),
            json!({"start_time": "0:00", "end_time": "0:00.5"}),
            json!({"start_time": "0:10", "end_time": "0:10"}),
            json!("not an object"),
            json!({"start_time": "0:00", "end_time": "0:20", "reason": "first in time"}),
        ];

        let segments = validator.validate_and_normalize_segments(&raw);
        assert_eq!(segments.len(), 2);
        // No re-sorting: document order wins
        assert_eq!(segments[0].reason, "second in time");
        assert_eq!(segments[1].reason, "first in time");
    }

    #[test]
    fn test_sub_second_segment_dropped() {
        let validator = SegmentValidator::default();
        assert!(validator
            .normalize_segment(&json!({"start_time": 10.0, "end_time": 10.5}))
            .is_none());
        assert!(validator
            .normalize_segment(&json!({"start_time": 10.0, "end_time": 11.0}))
            .is_some());
    }

    #[test]
    fn test_invalid_seconds_field_coerced_to_zero() {
        let validator = SegmentValidator::default();
        // "1:60" decodes to 0, so the segment spans 0..30
        let segment = validator
            .normalize_segment(&json!({"start_time": "1:60", "end_time": "0:30"}))
            .unwrap();
        assert_eq!(segment.start_time, 0.0);
    }

    #[test]
    fn test_existing_description_kept() {
        let validator = SegmentValidator::default();
        let description = "Prompt: Fog rolling over a harbor\nMusic Style: 64 BPM, D minor, low strings";
        let segment = validator
            .normalize_segment(&json!({
                "start_time": 0, "end_time": 30,
                "detailed_description": description,
            }))
            .unwrap();
        assert_eq!(segment.detailed_description, description);
    }

    #[test]
    fn test_build_segment() {
        let validator = SegmentValidator::default();
        let segment = validator
            .build_segment(0.0, 15.0, "Intro", Intensity::Low, SegmentType::Suspenseful)
            .unwrap();
        assert!(validate_dual_output_description(&segment.detailed_description));
        assert!(segment.detailed_description.contains("70 BPM"));

        assert!(validator
            .build_segment(20.0, 10.0, "Bad", Intensity::Low, SegmentType::Ambient)
            .is_none());
    }

    #[test]
    fn test_normalize_helpers() {
        let validator = SegmentValidator::default();
        assert_eq!(validator.normalize_intensity("Gentle"), Intensity::Low);
        assert_eq!(validator.normalize_intensity("DRAMATIC"), Intensity::High);
        assert_eq!(validator.normalize_intensity("moderate"), Intensity::Medium);
        assert_eq!(validator.normalize_type("beat-driven"), SegmentType::Rhythmic);
        assert_eq!(validator.normalize_type("Suspense"), SegmentType::Suspenseful);
        assert_eq!(validator.normalize_type("unknown"), SegmentType::Ambient);
    }
}
