//! vbgm-ai: music segment extraction for video background music
//!
//! Turns free-form model output into validated [`MusicSegment`]s through a
//! chain of progressively more forgiving strategies. The caller always gets
//! segments back, together with the name of the strategy that produced them.
//!
//! ```
//! use vbgm_ai::{parse_music_segments, StrategyTag};
//!
//! let result = parse_music_segments("0:00-0:30 gentle opening over the hills", 10);
//! assert_eq!(result.strategy, StrategyTag::RegexExtraction);
//! assert_eq!(result.segments[0].end_time, 30.0);
//! ```

pub mod error;
pub mod extractors;  // Strategies 1-4
pub mod lexicon;
pub mod pipeline;
pub mod templates;
pub mod types;
pub mod validators;

pub use crate::error::{StrategyError, StrategyResult};
pub use crate::lexicon::KeywordLexicon;
pub use crate::pipeline::{parse_music_segments, SegmentPipeline};
pub use crate::templates::TemplateTables;
pub use crate::types::{Intensity, MusicSegment, ParseResult, SegmentType, StrategyTag};
pub use crate::validators::{validate_dual_output_description, SegmentValidator};
