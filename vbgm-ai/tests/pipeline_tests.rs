//! End-to-end tests for the segment pipeline
//!
//! Each test feeds a realistic model response through `SegmentPipeline` and
//! checks which strategy won and what the caller receives.

mod helpers;

use helpers::{assert_segment_invariants, segment_array, segment_json};
use std::sync::Arc;
use vbgm_ai::{
    parse_music_segments, Intensity, KeywordLexicon, SegmentPipeline, SegmentType, StrategyTag,
};
use vbgm_common::config::TomlConfig;

#[test]
fn test_clean_array_returns_all_segments_in_order() {
    let result = parse_music_segments(&segment_array(5), 10);

    assert_eq!(result.strategy, StrategyTag::CleanJsonDirect);
    assert!(result.parse_error.is_none());
    assert_eq!(result.segments.len(), 5);
    for (i, segment) in result.segments.iter().enumerate() {
        assert_eq!(segment.reason, format!("Segment {}", i + 1));
        assert_eq!(segment.start_time, i as f64 * 20.0);
    }
    assert_segment_invariants(&result.segments);
}

#[test]
fn test_max_segments_keeps_first_in_document_order() {
    let result = parse_music_segments(&segment_array(10), 3);

    assert_eq!(result.segments.len(), 3);
    let reasons: Vec<&str> = result.segments.iter().map(|s| s.reason.as_str()).collect();
    assert_eq!(reasons, vec!["Segment 1", "Segment 2", "Segment 3"]);
}

#[test]
fn test_model_fields_are_preserved() {
    let result = parse_music_segments(&segment_array(1), 10);
    let segment = &result.segments[0];

    assert_eq!(segment.intensity, Intensity::Medium);
    assert_eq!(segment.segment_type, SegmentType::Emotional);
    assert_eq!(segment.music_summary, "Warm underscore");
    assert_eq!(segment.volume, 55);
    assert_eq!(segment.fadein_duration, "1.5");
    assert_eq!(segment.fadeout_duration, "2.5");
    assert!(segment
        .detailed_description
        .starts_with("Prompt: Two friends talking on a porch at sunset\n"));
}

#[test]
fn test_code_fenced_response() {
    let text = format!(
        "Sure! Here is the soundtrack plan:\n\n```json\n{}\n```\n\nLet me know if you want changes.",
        segment_array(2)
    );
    let result = parse_music_segments(&text, 10);

    assert_eq!(result.strategy, StrategyTag::CleanJsonDirect);
    assert_eq!(result.segments.len(), 2);
}

#[test]
fn test_wrapped_object_shapes() {
    for key in ["segments", "data"] {
        let text = format!(r#"{{"{}": {}}}"#, key, segment_array(2));
        let result = parse_music_segments(&text, 10);
        assert_eq!(result.strategy, StrategyTag::CleanJsonDirect, "shape '{}'", key);
        assert_eq!(result.segments.len(), 2, "shape '{}'", key);
    }
}

#[test]
fn test_truncated_response_recovers_complete_objects() {
    let text = format!(
        "[{},\n{},\n{},\n{{\"start_time\": \"1:00\", \"end_time\": \"1:2",
        segment_json("0:00", "0:20", "One"),
        segment_json("0:20", "0:40", "Two"),
        segment_json("0:40", "1:00", "Three"),
    );
    let result = parse_music_segments(&text, 10);

    assert_eq!(result.strategy, StrategyTag::ValidSegmentExtraction);
    assert_eq!(result.segments.len(), 3);
    assert_eq!(result.segments[2].reason, "Three");
    assert!(result.parse_error.is_some());
    assert_segment_invariants(&result.segments);
}

#[test]
fn test_trailing_comma_document_recovers() {
    let text = format!("[{},]", segment_json("0:00", "0:30", "Only"));
    let result = parse_music_segments(&text, 10);

    assert_eq!(result.strategy, StrategyTag::ValidSegmentExtraction);
    assert_eq!(result.segments[0].reason, "Only");
}

#[test]
fn test_prose_timestamps_use_regex_extraction() {
    let text = "I'd score the video like this:\n\
                - 0:00 to 0:25: calm, peaceful shots of the coastline.\n\
                - 0:25 - 1:05: dramatic storm rolls in, powerful waves.\n\
                - 1:05 – 1:30: quiet aftermath.";
    let result = parse_music_segments(text, 10);

    assert_eq!(result.strategy, StrategyTag::RegexExtraction);
    assert_eq!(result.segments.len(), 3);
    assert_eq!(result.segments[0].intensity, Intensity::Low);
    assert_eq!(result.segments[1].intensity, Intensity::High);
    assert_eq!(result.segments[1].segment_type, SegmentType::Dramatic);
    assert_eq!(result.segments[2].end_time, 90.0);
    assert_segment_invariants(&result.segments);
}

#[test]
fn test_garbage_uses_emergency_fallback() {
    let result = parse_music_segments("I'm sorry, I can't help with that video.", 10);

    assert_eq!(result.strategy, StrategyTag::EmergencyFallback);
    assert!(result.segments.len() >= 2);
    assert!(!result.is_trustworthy());
    assert_eq!(
        result.parse_error.as_deref(),
        Some("no JSON object or array found in response")
    );
    assert_segment_invariants(&result.segments);
}

#[test]
fn test_empty_input_uses_emergency_fallback() {
    let result = parse_music_segments("", 2);
    assert_eq!(result.strategy, StrategyTag::EmergencyFallback);
    assert_eq!(result.segments.len(), 2);
}

#[test]
fn test_missing_fields_are_defaulted() {
    let text = r#"[{"start_time": 0, "end_time": 45, "reason": "Sunrise", "intensity": "soft", "type": "ambient"}]"#;
    let result = parse_music_segments(text, 10);
    let segment = &result.segments[0];

    assert_eq!(result.strategy, StrategyTag::CleanJsonDirect);
    assert_eq!(segment.intensity, Intensity::Low);
    assert_eq!(segment.volume, 60);
    assert_eq!(segment.fadein_duration, "2.0");
    assert!(!segment.music_summary.is_empty());
    assert_segment_invariants(&result.segments);
}

#[test]
fn test_overlaps_are_reported_not_rejected() {
    let text = format!(
        "[{}, {}]",
        segment_json("0:00", "0:40", "A"),
        segment_json("0:30", "1:00", "B")
    );
    let result = parse_music_segments(&text, 10);

    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.overlapping_pairs(), vec![(0, 1)]);
}

#[test]
fn test_wire_format() {
    let result = parse_music_segments(&segment_array(1), 10);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["strategy"], "clean_json_direct");
    assert!(json["parseError"].is_null());
    assert_eq!(json["segments"][0]["type"], "emotional");
    assert_eq!(json["segments"][0]["start_time"], 0.0);
}

#[test]
fn test_lexicon_override_from_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("lexicon.toml");
    let mut lexicon = KeywordLexicon::builtin();
    lexicon.version = 2;
    lexicon.low_intensity.push("hushed".to_string());
    std::fs::write(&path, toml::to_string(&lexicon).unwrap()).unwrap();

    let config = TomlConfig {
        lexicon_path: Some(path),
        ..Default::default()
    };
    let pipeline = SegmentPipeline::from_config(&config).unwrap();

    let text = "0:00-0:30 hushed hallway";
    assert_eq!(pipeline.parse(text, 10).segments[0].intensity, Intensity::Low);
    assert_eq!(parse_music_segments(text, 10).segments[0].intensity, Intensity::Medium);
}

#[test]
fn test_missing_override_file_is_an_error() {
    let config = TomlConfig {
        templates_path: Some("/nonexistent/vbgm/templates.toml".into()),
        ..Default::default()
    };
    assert!(SegmentPipeline::from_config(&config).is_err());
}

#[test]
fn test_pipeline_shared_across_threads() {
    let pipeline = Arc::new(SegmentPipeline::new());
    let text = segment_array(4);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let pipeline = Arc::clone(&pipeline);
            let text = &text;
            scope.spawn(move || {
                let result = pipeline.parse(text, 10);
                assert_eq!(result.segments.len(), 4);
            });
        }
    });
}
