//! Segment pipeline orchestrator
//!
//! Runs the extraction strategies in order of decreasing fidelity and stops
//! at the first one that yields segments:
//!
//! ```text
//! StructuredExtractor → BrokenJsonRecoverer → TextPatternExtractor → EmergencyFallbackGenerator
//! ```
//!
//! The emergency fallback never fails, so [`SegmentPipeline::parse`] always
//! returns a usable [`ParseResult`].

use crate::extractors::{
    BrokenJsonRecoverer, EmergencyFallbackGenerator, ParsingStrategy, StructuredExtractor,
    TextPatternExtractor,
};
use crate::lexicon::KeywordLexicon;
use crate::templates::TemplateTables;
use crate::types::{ParseResult, StrategyTag};
use crate::validators::SegmentValidator;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vbgm_common::config::TomlConfig;

static DEFAULT_PIPELINE: Lazy<SegmentPipeline> = Lazy::new(SegmentPipeline::new);

/// Parse with the built-in lexicon and templates
pub fn parse_music_segments(text: &str, max_segments: usize) -> ParseResult {
    DEFAULT_PIPELINE.parse(text, max_segments)
}

/// Ordered strategy chain sharing one validator
#[derive(Debug)]
pub struct SegmentPipeline {
    strategies: Vec<Box<dyn ParsingStrategy>>,
}

impl Default for SegmentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentPipeline {
    /// Pipeline using the built-in lexicon and templates
    pub fn new() -> Self {
        Self::from_validator(Arc::new(SegmentValidator::default()))
    }

    /// Pipeline using injected tables (validated first)
    pub fn with_tables(
        lexicon: Arc<KeywordLexicon>,
        templates: Arc<TemplateTables>,
    ) -> vbgm_common::Result<Self> {
        lexicon.validate()?;
        templates.validate()?;
        Ok(Self::from_validator(Arc::new(SegmentValidator::new(
            lexicon, templates,
        ))))
    }

    /// Pipeline using table overrides named in the config file, if any
    pub fn from_config(config: &TomlConfig) -> vbgm_common::Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => KeywordLexicon::from_toml_file(path)?,
            None => KeywordLexicon::builtin(),
        };
        let templates = match &config.templates_path {
            Some(path) => TemplateTables::from_toml_file(path)?,
            None => TemplateTables::builtin(),
        };
        info!(
            lexicon_version = lexicon.version,
            archetypes = templates.archetypes.len(),
            "Segment pipeline configured"
        );
        Self::with_tables(Arc::new(lexicon), Arc::new(templates))
    }

    fn from_validator(validator: Arc<SegmentValidator>) -> Self {
        let strategies: Vec<Box<dyn ParsingStrategy>> = vec![
            Box::new(StructuredExtractor::new(validator.clone())),
            Box::new(BrokenJsonRecoverer::new(validator.clone())),
            Box::new(TextPatternExtractor::new(validator.clone())),
            Box::new(EmergencyFallbackGenerator::new(validator)),
        ];
        Self { strategies }
    }

    /// Strategy tags in the order they are tried
    pub fn strategy_order(&self) -> Vec<StrategyTag> {
        self.strategies.iter().map(|s| s.tag()).collect()
    }

    /// Parse model output into at most `max_segments` segments
    ///
    /// Never panics and never errors. `parse_error` carries the first strategy
    /// failure whenever the winning strategy was not the first one tried.
    pub fn parse(&self, text: &str, max_segments: usize) -> ParseResult {
        let mut first_error: Option<String> = None;

        for strategy in &self.strategies {
            let tag = strategy.tag();
            let failure = match strategy.extract(text, max_segments) {
                Ok(segments) if !segments.is_empty() => {
                    if tag == StrategyTag::EmergencyFallback {
                        warn!(
                            count = segments.len(),
                            reason = first_error.as_deref().unwrap_or("unknown"),
                            "All parsing strategies failed, using emergency fallback"
                        );
                    } else {
                        info!(strategy = %tag, count = segments.len(), "Parsed music segments");
                    }

                    let result = ParseResult {
                        segments,
                        parse_error: first_error,
                        strategy: tag,
                    };
                    log_overlaps(&result);
                    return result;
                }
                Ok(_) => "strategy produced no segments".to_string(),
                Err(e) => e.to_string(),
            };

            debug!(strategy = %tag, error = %failure, "Strategy failed");
            first_error.get_or_insert(failure);
        }

        // Only reachable when the fallback has nothing to emit (max_segments == 0)
        warn!(max_segments, "No segments produced");
        ParseResult {
            segments: Vec::new(),
            parse_error: first_error,
            strategy: StrategyTag::EmergencyFallback,
        }
    }
}

fn log_overlaps(result: &ParseResult) {
    let pairs = result.overlapping_pairs();
    if !pairs.is_empty() {
        debug!(?pairs, "Segments overlap");
    }
}
