// Template Tables: deterministic description synthesis
//
// Concept: pure lookup tables used whenever a segment description has to be
// written without help from the model. No AI call, no randomness: the same
// (type, intensity, duration) always yields the same text.
//
// Tables:
// - segment type → tempo by intensity, key, instrumentation, visual mood
// - intensity → dynamics marking
// - duration → progression phrase
// - archetypes: complete canned segments for the emergency fallback

use crate::types::{Intensity, SegmentType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use vbgm_common::{Error, Result};

/// Style template for one segment type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTemplate {
    pub segment_type: SegmentType,
    /// Tempo for `[low, medium, high]` intensity
    pub bpm: [u16; 3],
    pub key: String,
    pub instruments: String,
    /// Non-musical scene phrase used for synthesized prompts
    pub visual_mood: String,
}

/// Intensity → dynamics marking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsTable {
    pub low: String,
    pub medium: String,
    pub high: String,
}

/// Duration → progression phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionTable {
    /// Durations below this are "short"
    pub short_max_seconds: f64,
    /// Durations below this (and not short) are "medium"
    pub medium_max_seconds: f64,
    pub short: String,
    pub medium: String,
    pub long: String,
}

/// A complete, contract-valid canned segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub segment_type: SegmentType,
    pub intensity: Intensity,
    pub reason: String,
    pub music_summary: String,
    pub detailed_description: String,
    pub volume: u8,
}

/// All template data, injectable as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTables {
    pub dynamics: DynamicsTable,
    pub progressions: ProgressionTable,
    pub styles: Vec<StyleTemplate>,
    pub archetypes: Vec<Archetype>,
}

impl Default for TemplateTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateTables {
    /// Built-in tables covering every `SegmentType` and ten archetypes
    pub fn builtin() -> Self {
        Self {
            dynamics: DynamicsTable {
                low: "piano".into(),
                medium: "mezzo-forte".into(),
                high: "forte".into(),
            },
            progressions: ProgressionTable {
                short_max_seconds: 20.0,
                medium_max_seconds: 60.0,
                short: "intro→sustain→fade".into(),
                medium: "intro→build→resolution".into(),
                long: "intro→build→climax→outro".into(),
            },
            styles: Self::build_styles(),
            archetypes: Self::build_archetypes(),
        }
    }

    /// Load tables from a TOML file and validate them
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read templates {} failed: {}", path.display(), e)))?;
        let tables: TemplateTables = toml::from_str(&content)?;
        tables.validate()?;
        debug!(
            path = %path.display(),
            styles = tables.styles.len(),
            archetypes = tables.archetypes.len(),
            "Loaded template tables"
        );
        Ok(tables)
    }

    /// Reject tables that cannot back the fallback guarantees
    pub fn validate(&self) -> Result<()> {
        for segment_type in SegmentType::all_variants() {
            if self.style_for(*segment_type).is_none() {
                return Err(Error::Config(format!(
                    "templates missing style for segment type '{}'",
                    segment_type
                )));
            }
        }
        if self.styles.iter().any(|s| s.bpm.contains(&0)) {
            return Err(Error::Config("template bpm values must be positive".to_string()));
        }
        for style in &self.styles {
            for (field, value) in [
                ("key", &style.key),
                ("instruments", &style.instruments),
                ("visual_mood", &style.visual_mood),
            ] {
                if value.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "template style for '{}' has blank {}",
                        style.segment_type, field
                    )));
                }
            }
        }
        let d = &self.dynamics;
        let p = &self.progressions;
        for (field, value) in [
            ("dynamics.low", &d.low),
            ("dynamics.medium", &d.medium),
            ("dynamics.high", &d.high),
            ("progressions.short", &p.short),
            ("progressions.medium", &p.medium),
            ("progressions.long", &p.long),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("template {} is blank", field)));
            }
        }
        if self.archetypes.len() < 2 {
            return Err(Error::Config(format!(
                "templates need at least 2 archetypes, found {}",
                self.archetypes.len()
            )));
        }
        if !(self.progressions.short_max_seconds < self.progressions.medium_max_seconds) {
            return Err(Error::Config(
                "progression thresholds must satisfy short < medium".to_string(),
            ));
        }
        Ok(())
    }

    pub fn style_for(&self, segment_type: SegmentType) -> Option<&StyleTemplate> {
        self.styles.iter().find(|s| s.segment_type == segment_type)
    }

    pub fn dynamics_for(&self, intensity: Intensity) -> &str {
        match intensity {
            Intensity::Low => &self.dynamics.low,
            Intensity::Medium => &self.dynamics.medium,
            Intensity::High => &self.dynamics.high,
        }
    }

    pub fn progression_for(&self, duration_seconds: f64) -> &str {
        let p = &self.progressions;
        if duration_seconds < p.short_max_seconds {
            &p.short
        } else if duration_seconds < p.medium_max_seconds {
            &p.medium
        } else {
            &p.long
        }
    }

    fn build_styles() -> Vec<StyleTemplate> {
        let style = |segment_type, bpm, key: &str, instruments: &str, visual_mood: &str| StyleTemplate {
            segment_type,
            bpm,
            key: key.into(),
            instruments: instruments.into(),
            visual_mood: visual_mood.into(),
        };

        vec![
            style(
                SegmentType::Ambient,
                [60, 70, 80],
                "D major",
                "airy synth pads and distant piano",
                "open, unhurried scenery in soft natural light",
            ),
            style(
                SegmentType::Rhythmic,
                [90, 105, 120],
                "E minor",
                "tight drum groove with bass and muted guitar",
                "steady motion and purposeful activity",
            ),
            style(
                SegmentType::Emotional,
                [66, 76, 86],
                "A minor",
                "solo cello over sustained strings",
                "intimate close moments with warm light",
            ),
            style(
                SegmentType::Dramatic,
                [80, 92, 104],
                "C minor",
                "full orchestra with timpani and low brass",
                "high-stakes moment with stark contrast and deep shadows",
            ),
            style(
                SegmentType::Energetic,
                [110, 124, 138],
                "G major",
                "driving electronic drums and pulsing synth bass",
                "fast movement, bright colors and quick cuts",
            ),
            style(
                SegmentType::Suspenseful,
                [70, 84, 96],
                "F# minor",
                "low drones with pizzicato strings and ticking percussion",
                "dim spaces, long shadows and slow reveals",
            ),
        ]
    }

    fn build_archetypes() -> Vec<Archetype> {
        let archetype = |segment_type, intensity, reason: &str, summary: &str, prompt: &str, style: &str, volume| Archetype {
            segment_type,
            intensity,
            reason: reason.into(),
            music_summary: summary.into(),
            detailed_description: format!("Prompt: {}\nMusic Style: {}", prompt, style),
            volume,
        };

        vec![
            archetype(
                SegmentType::Ambient,
                Intensity::Low,
                "Establishing scenery",
                "Calm ambient opener",
                "Wide establishing view, soft morning light drifting across open landscape",
                "68 BPM, D major, airy synth pads and distant felt piano, piano dynamics, intro→sustain→fade progression",
                50,
            ),
            archetype(
                SegmentType::Emotional,
                Intensity::Medium,
                "Personal moment",
                "Warm emotional underscore",
                "Close-up faces in warm window light, quiet reflective pause",
                "76 BPM, A minor, solo cello over sustained strings, mezzo-forte dynamics, intro→build→resolution progression",
                55,
            ),
            archetype(
                SegmentType::Rhythmic,
                Intensity::Medium,
                "Montage of activity",
                "Steady rhythmic montage bed",
                "Quick cuts of busy streets and moving crowds in daylight",
                "104 BPM, E minor, tight drum groove with muted guitar and bass, mezzo-forte dynamics, intro→build→resolution progression",
                60,
            ),
            archetype(
                SegmentType::Dramatic,
                Intensity::High,
                "Turning point",
                "Dramatic orchestral swell",
                "Storm clouds gathering over a lone figure on a cliff edge",
                "92 BPM, C minor, full orchestra with timpani and low brass, forte dynamics, intro→build→climax→outro progression",
                70,
            ),
            archetype(
                SegmentType::Energetic,
                Intensity::High,
                "Action sequence",
                "High-energy electronic drive",
                "Fast motion, bright colors and rapid camera movement through the scene",
                "128 BPM, G major, driving electronic drums and pulsing synth bass, forte dynamics, intro→build→climax→outro progression",
                70,
            ),
            archetype(
                SegmentType::Suspenseful,
                Intensity::Medium,
                "Building tension",
                "Tense suspense bed",
                "Dim corridor, long shadows and slow creeping camera push",
                "84 BPM, F# minor, low drones with pizzicato strings and ticking percussion, mezzo-forte dynamics, intro→build→resolution progression",
                55,
            ),
            archetype(
                SegmentType::Ambient,
                Intensity::Low,
                "Scene transition",
                "Soft ambient transition",
                "Gentle passage between scenes, drifting clouds and calm water",
                "72 BPM, F major, soft pads with field-recording textures, piano dynamics, intro→sustain→fade progression",
                45,
            ),
            archetype(
                SegmentType::Emotional,
                Intensity::High,
                "Emotional peak",
                "Soaring emotional climax",
                "Reunion embrace in golden evening light, tears and smiles",
                "80 BPM, D major, soaring strings and choir, forte dynamics, intro→build→climax→outro progression",
                65,
            ),
            archetype(
                SegmentType::Rhythmic,
                Intensity::Low,
                "Casual background",
                "Relaxed lo-fi groove",
                "Relaxed everyday routine, coffee steam and soft window light",
                "90 BPM, Bb major, lo-fi drums with warm electric piano, piano dynamics, intro→build→resolution progression",
                50,
            ),
            archetype(
                SegmentType::Energetic,
                Intensity::Medium,
                "Closing sequence",
                "Upbeat closing theme",
                "Final wide shot pulling back over the city at dusk",
                "112 BPM, A major, bright acoustic guitar with claps and light percussion, mezzo-forte dynamics, intro→build→resolution progression",
                60,
            ),
        ]
    }
}
