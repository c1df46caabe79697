//! Configuration loading and resolution
//!
//! Settings come from up to four places. For each setting the first source
//! that provides a value wins:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: a warning is logged and defaults
//! apply. A config file that exists but does not parse *is* an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Segment cap applied when no source overrides it
pub const DEFAULT_MAX_SEGMENTS: usize = 10;

/// Environment variable overriding `max_segments`
pub const MAX_SEGMENTS_ENV: &str = "VBGM_MAX_SEGMENTS";

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "VBGM_CONFIG";

/// Configuration file loaded from TOML
///
/// Every field is optional; an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Maximum number of segments returned per parse
    #[serde(default)]
    pub max_segments: Option<usize>,

    /// Keyword lexicon override (TOML file)
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,

    /// Template table override (TOML file)
    #[serde(default)]
    pub templates_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file that is known to exist
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded TOML config");
        Ok(config)
    }

    /// Locate and load the config file, falling back to defaults when absent
    ///
    /// See [`resolve_config_path`] for the lookup order.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_config_path(cli_path) else {
            warn!("No config directory available, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let config = Self::from_file(&path)?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}

/// Config file lookup order:
/// 1. Command-line argument
/// 2. `VBGM_CONFIG` environment variable
/// 3. `<config dir>/vbgm/vbgm-ai.toml`
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Platform config location (`~/.config/vbgm/vbgm-ai.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vbgm").join("vbgm-ai.toml"))
}

/// Resolve `max_segments` following the CLI → ENV → TOML → default priority
///
/// A value of zero is rejected from every source.
pub fn resolve_max_segments(cli_value: Option<usize>, toml_config: &TomlConfig) -> Result<usize> {
    // Priority 1: Command-line argument
    if let Some(value) = cli_value {
        return validate_max_segments(value, "command line");
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(MAX_SEGMENTS_ENV) {
        let value: usize = raw.trim().parse().map_err(|_| {
            Error::Config(format!("{} must be a positive integer, got '{}'", MAX_SEGMENTS_ENV, raw))
        })?;
        return validate_max_segments(value, "environment");
    }

    // Priority 3: TOML config file
    if let Some(value) = toml_config.max_segments {
        return validate_max_segments(value, "TOML config");
    }

    // Priority 4: Compiled default
    Ok(DEFAULT_MAX_SEGMENTS)
}

fn validate_max_segments(value: usize, source: &str) -> Result<usize> {
    if value == 0 {
        return Err(Error::InvalidInput(format!(
            "max_segments from {} must be at least 1",
            source
        )));
    }
    debug!(max_segments = value, source, "Resolved max_segments");
    Ok(value)
}
