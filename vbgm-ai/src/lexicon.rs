// Keyword Lexicon: free text → intensity / segment type
//
// Concept: versioned keyword data shared by segment normalization, free-text
// extraction and description repair. Matching is token based: text is split on
// non-alphanumeric characters.
// - Type keywords match any token they prefix ("drama" matches "dramatic").
// - Intensity keywords match whole words plus simple inflections ("quietly",
//   "louder"), so "high" does not match "highway" and "low" not "slow".
//
// The built-in tables are the default; a deployment may load a replacement from
// TOML without touching parser code.

use crate::types::{Intensity, SegmentType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use vbgm_common::{Error, Result};

/// Version of the built-in tables
pub const BUILTIN_LEXICON_VERSION: u32 = 1;

/// One keyword → segment type rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeKeyword {
    pub keyword: String,
    pub segment_type: SegmentType,
}

/// Keyword tables for intensity/type inference
///
/// **Legible Software Principle:**
/// - Immutable after construction, shared via `Arc`
/// - Transparent behavior: tables are plain data, visible and replaceable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordLexicon {
    /// Bumped whenever the tables change meaningfully
    pub version: u32,
    pub low_intensity: Vec<String>,
    pub high_intensity: Vec<String>,
    /// Words that mark text as musical rather than visual
    pub musical_terms: Vec<String>,
    /// Ordered: the first rule with a matching keyword wins
    pub type_keywords: Vec<TypeKeyword>,
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordLexicon {
    /// Built-in tables (version 1)
    pub fn builtin() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        let rule = |keyword: &str, segment_type| TypeKeyword {
            keyword: keyword.to_string(),
            segment_type,
        };

        Self {
            version: BUILTIN_LEXICON_VERSION,
            low_intensity: words(&["low", "soft", "quiet", "gentle", "calm", "peaceful"]),
            high_intensity: words(&["high", "loud", "intense", "dramatic", "powerful", "energetic"]),
            type_keywords: vec![
                rule("ambient", SegmentType::Ambient),
                rule("rhythm", SegmentType::Rhythmic),
                rule("beat", SegmentType::Rhythmic),
                rule("emotion", SegmentType::Emotional),
                rule("drama", SegmentType::Dramatic),
                rule("energy", SegmentType::Energetic),
                rule("energetic", SegmentType::Energetic),
                rule("action", SegmentType::Energetic),
                rule("suspense", SegmentType::Suspenseful),
                rule("mystery", SegmentType::Suspenseful),
                rule("mysterious", SegmentType::Suspenseful),
            ],
            musical_terms: words(&[
                "music", "musical", "song", "melody", "melodic", "harmony", "chord", "tempo",
                "bpm", "beat", "rhythm", "key", "major", "minor", "instrument", "instrumental",
                "piano", "guitar", "violin", "cello", "strings", "synth", "synthesizer", "drum",
                "drums", "bass", "percussion", "orchestra", "orchestral", "brass", "flute",
                "crescendo", "staccato", "legato", "note", "notes", "soundtrack", "score",
            ]),
        }
    }

    /// Load a lexicon from a TOML file and validate it
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read lexicon {} failed: {}", path.display(), e)))?;
        let lexicon: KeywordLexicon = toml::from_str(&content)?;
        lexicon.validate()?;
        debug!(path = %path.display(), version = lexicon.version, "Loaded keyword lexicon");
        Ok(lexicon)
    }

    /// Reject tables the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 {
            return Err(Error::Config("lexicon version must be at least 1".to_string()));
        }
        if self.low_intensity.is_empty() || self.high_intensity.is_empty() {
            return Err(Error::Config("lexicon intensity tables must not be empty".to_string()));
        }
        if self.type_keywords.is_empty() {
            return Err(Error::Config("lexicon type_keywords must not be empty".to_string()));
        }
        Ok(())
    }

    /// Classify intensity by majority vote of low vs. high keyword hits
    ///
    /// More low hits → `Low`, more high hits → `High`. A tie, including no
    /// hits at all or mixed text like "quiet but intense", is `Medium`.
    pub fn infer_intensity(&self, text: &str) -> Intensity {
        let tokens = tokenize(text);
        let low = count_hits(&tokens, &self.low_intensity);
        let high = count_hits(&tokens, &self.high_intensity);

        match low.cmp(&high) {
            std::cmp::Ordering::Greater => Intensity::Low,
            std::cmp::Ordering::Less => Intensity::High,
            std::cmp::Ordering::Equal => Intensity::Medium,
        }
    }

    /// Classify segment type; the first matching rule wins, default `Ambient`
    pub fn infer_type(&self, text: &str) -> SegmentType {
        let tokens = tokenize(text);
        self.type_keywords
            .iter()
            .find(|rule| has_prefix_token(&tokens, &rule.keyword))
            .map(|rule| rule.segment_type)
            .unwrap_or(SegmentType::Ambient)
    }

    /// True if any token is a musical term (exact or simple plural)
    pub fn contains_musical_vocabulary(&self, text: &str) -> bool {
        tokenize(text).iter().any(|token| {
            self.musical_terms.iter().any(|term| {
                let term = term.to_lowercase();
                *token == term || token.strip_suffix('s') == Some(term.as_str())
            })
        })
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn has_prefix_token(tokens: &[String], keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    !keyword.is_empty() && tokens.iter().any(|t| t.starts_with(&keyword))
}

/// Suffixes accepted after an intensity keyword
const INFLECTIONS: &[&str] = &["s", "ly", "er", "est", "ally", "ness"];

fn has_word_token(tokens: &[String], keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    !keyword.is_empty()
        && tokens.iter().any(|t| match t.strip_prefix(keyword.as_str()) {
            Some(rest) => rest.is_empty() || INFLECTIONS.contains(&rest),
            None => false,
        })
}

fn count_hits(tokens: &[String], keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|k| has_word_token(tokens, k))
        .count()
}
