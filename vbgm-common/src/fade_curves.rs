//! Fade algorithm identifiers for music segments
//!
//! Each segment handed to the mixer names the curve used for its fade-in and
//! fade-out. Model responses spell these inconsistently ("S-Curve", "cosine",
//! "EqualPower"), so parsing accepts a set of aliases and falls back to
//! [`FadeCurve::Linear`] at the call site.

use serde::{Deserialize, Serialize};

/// Fade curve applied at segment boundaries
///
/// - Linear: constant rate of change
/// - Exponential: slow start, fast finish
/// - Logarithmic: fast start, slow finish
/// - SCurve: smooth acceleration and deceleration
/// - EqualPower: constant perceived loudness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    Linear,
    Exponential,
    Logarithmic,
    SCurve,
    EqualPower,
}

impl FadeCurve {
    /// Parse curve from free text
    ///
    /// Case-insensitive; spaces and hyphens are treated as underscores.
    /// Supported values:
    /// - 'linear'
    /// - 'exponential', 'exp'
    /// - 'logarithmic', 'log'
    /// - 's_curve', 'scurve', 'cosine', 'sine'
    /// - 'equal_power', 'equalpower'
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "linear" => Some(FadeCurve::Linear),
            "exponential" | "exp" => Some(FadeCurve::Exponential),
            "logarithmic" | "log" => Some(FadeCurve::Logarithmic),
            "s_curve" | "scurve" | "cosine" | "sine" => Some(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Some(FadeCurve::EqualPower),
            _ => None,
        }
    }

    /// Canonical wire representation (matches serde)
    pub fn as_str(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "linear",
            FadeCurve::Exponential => "exponential",
            FadeCurve::Logarithmic => "logarithmic",
            FadeCurve::SCurve => "s_curve",
            FadeCurve::EqualPower => "equal_power",
        }
    }

    /// Get all available fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[
            FadeCurve::Linear,
            FadeCurve::Exponential,
            FadeCurve::Logarithmic,
            FadeCurve::SCurve,
            FadeCurve::EqualPower,
        ]
    }
}

impl Default for FadeCurve {
    /// Segments without an explicit algorithm fade linearly
    fn default() -> Self {
        FadeCurve::Linear
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
