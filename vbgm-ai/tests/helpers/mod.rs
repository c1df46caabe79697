//! Shared helpers for vbgm-ai integration tests

#![allow(dead_code)]

pub mod log_capture;

use vbgm_ai::{validate_dual_output_description, MusicSegment};

/// A well-formed segment object as the model would emit it
pub fn segment_json(start: &str, end: &str, reason: &str) -> String {
    format!(
        r#"{{"start_time": "{}", "end_time": "{}", "reason": "{}", "intensity": "medium", "type": "emotional", "music_summary": "Warm underscore", "detailed_description": "Prompt: Two friends talking on a porch at sunset\nMusic Style: 76 BPM, A minor, solo cello, mezzo-forte dynamics", "volume": 55, "fade_algorithm": "linear", "fadein_duration": "1.5", "fadeout_duration": "2.5"}}"#,
        start, end, reason
    )
}

/// JSON array of `count` consecutive 20 second segments named "Segment N"
pub fn segment_array(count: usize) -> String {
    let objects: Vec<String> = (0..count)
        .map(|i| {
            let start = i * 20;
            let end = start + 20;
            segment_json(
                &format!("{}:{:02}", start / 60, start % 60),
                &format!("{}:{:02}", end / 60, end % 60),
                &format!("Segment {}", i + 1),
            )
        })
        .collect();
    format!("[{}]", objects.join(",\n"))
}

/// Invariants every emitted segment must satisfy
pub fn assert_segment_invariants(segments: &[MusicSegment]) {
    for (i, segment) in segments.iter().enumerate() {
        assert!(segment.start_time >= 0.0, "segment {} starts before 0", i);
        assert!(
            segment.end_time > segment.start_time,
            "segment {} ends before it starts",
            i
        );
        assert!(segment.volume <= 100, "segment {} volume out of range", i);
        assert!(!segment.reason.is_empty(), "segment {} has empty reason", i);
        assert!(
            validate_dual_output_description(&segment.detailed_description),
            "segment {} has invalid description: {:?}",
            i,
            segment.detailed_description
        );
    }
}
