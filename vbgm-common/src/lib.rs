//! # VBGM Common Library
//!
//! Shared code for the VBGM background music tooling including:
//! - Error types
//! - Configuration loading (TOML + environment)
//! - Time code parsing and formatting
//! - Fade algorithm definitions

pub mod config;
pub mod error;
pub mod fade_curves;
pub mod time;

pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
