// Configuration loading and parsing (config/courtside.toml).

use courtside_core::distribution::StripLayout;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides `page.location`.
pub const LOCATION_ENV: &str = "COURTSIDE_LOCATION";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// courtside.toml structs
// ---------------------------------------------------------------------------

/// Top-level configuration. Every section is optional and falls back to
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataPaths,
    pub page: PageConfig,
    pub strip: StripLayout,
    pub color: ColorConfig,
}

/// Where the two input resources live. Either may be a local path or an
/// `http(s)://` URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub teams: String,
    pub stats: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            teams: "data/teams.json".into(),
            stats: "data/combined.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page location whose query string may carry `teams=...`.
    pub location: String,
    /// Path the rendered HTML is written to.
    pub output: String,
    pub title: String,
    /// Prefix for the per-stat links in the name column.
    pub stats_base_url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            location: "index.html".into(),
            output: "out/index.html".into(),
            title: "NBA Team Stats".into(),
            stats_base_url: "http://stats.nba.com/teams".into(),
        }
    }
}

/// Sequential color ramp for rank cells. The first domain value maps to the
/// light end of the ramp and the second to the dark end.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub domain: [f64; 2],
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            domain: [40.0, 0.0],
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/courtside.toml` relative to `base_dir`.
/// A missing file yields the defaults.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("courtside.toml");

    let config = if path.exists() {
        let text = read_file(&path)?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?
    } else {
        info!("no config at {}, using defaults", path.display());
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working
/// directory and applies the `COURTSIDE_LOCATION` override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    let mut config = load_config_from(&cwd)?;
    apply_location_override(&mut config, std::env::var(LOCATION_ENV).ok());
    Ok(config)
}

/// Replace `page.location` when an override is present and non-blank.
pub fn apply_location_override(config: &mut Config, value: Option<String>) {
    if let Some(location) = value.filter(|v| !v.trim().is_empty()) {
        info!("page location overridden from {}: {}", LOCATION_ENV, location);
        config.page.location = location;
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let required: &[(&str, &str)] = &[
        ("data.teams", config.data.teams.as_str()),
        ("data.stats", config.data.stats.as_str()),
        ("page.output", config.page.output.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(invalid(field, "must not be empty"));
        }
    }

    let strip = &config.strip;
    let margins: &[(&str, f64)] = &[
        ("strip.margin.top", strip.margin.top),
        ("strip.margin.right", strip.margin.right),
        ("strip.margin.bottom", strip.margin.bottom),
        ("strip.margin.left", strip.margin.left),
    ];
    for (field, val) in margins {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(field, format!("must be >= 0, got {val}")));
        }
    }
    if !(strip.inner_width() > 0.0) {
        return Err(invalid(
            "strip.width",
            format!("must exceed left + right margins, got {}", strip.width),
        ));
    }
    if !(strip.inner_height() > 0.0) {
        return Err(invalid(
            "strip.height",
            format!("must exceed top + bottom margins, got {}", strip.height),
        ));
    }
    if !(strip.mark_width > 0.0) {
        return Err(invalid(
            "strip.mark_width",
            format!("must be > 0, got {}", strip.mark_width),
        ));
    }

    let [d0, d1] = config.color.domain;
    if !d0.is_finite() || !d1.is_finite() || d0 == d1 {
        return Err(invalid(
            "color.domain",
            format!("must be two distinct finite values, got [{d0}, {d1}]"),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
