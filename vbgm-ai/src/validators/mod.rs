//! Validation layer shared by every extraction strategy
//!
//! - [`segment`]: candidate objects → normalized [`crate::types::MusicSegment`]s
//! - [`description`]: dual-line `Prompt:` / `Music Style:` contract and repair

pub mod description;
pub mod segment;

pub use description::{
    validate_dual_output_description, DescriptionContext, DescriptionRepair, RepairTier,
};
pub use segment::{is_valid_segment, meets_time_invariants, SegmentValidator};
