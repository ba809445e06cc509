use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use crate::error::{ViewerError, Result};

/// Top-level configuration loaded from a TOML file.
///
/// Every section is optional; a missing file is not an error for the CLI,
/// which falls back to [`Config::default`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Recorder HTTP backend.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Timeline geometry (coverage window and segment length).
    #[serde(default)]
    pub timeline: TimelineConfig,
    /// Hover preview overlay placement.
    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Where the recorder serves its API and media files.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://127.0.0.1:8181`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), request_timeout_secs: default_request_timeout() }
    }
}

/// Geometry of the per-block timeline.
#[derive(Debug, Deserialize, Clone)]
pub struct TimelineConfig {
    /// Length of one recording block in seconds (6 hours on the recorder).
    #[serde(default = "default_coverage_window")]
    pub coverage_window_secs: u64,
    /// Duration of a single HLS chunk in seconds.
    #[serde(default = "default_segment_duration")]
    pub segment_duration_secs: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            coverage_window_secs: default_coverage_window(),
            segment_duration_secs: default_segment_duration(),
        }
    }
}

impl TimelineConfig {
    /// Number of slots in the dense grid.
    pub fn total_slots(&self) -> usize {
        (self.coverage_window_secs / self.segment_duration_secs) as usize
    }

    pub fn segment_duration(&self) -> Duration {
        Duration::from_secs(self.segment_duration_secs)
    }
}

/// Pixel bias subtracted from the pointer position so the thumbnail overlay
/// sits above and left of the cursor.
#[derive(Debug, Deserialize, Clone)]
pub struct PreviewConfig {
    #[serde(default = "default_offset_x")]
    pub offset_x: f64,
    #[serde(default = "default_offset_y")]
    pub offset_y: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { offset_x: default_offset_x(), offset_y: default_offset_y() }
    }
}

fn default_base_url() -> String { "http://127.0.0.1:8181".into() }
fn default_request_timeout() -> u64 { 10 }
fn default_coverage_window() -> u64 { 6 * 60 * 60 }
fn default_segment_duration() -> u64 { 10 }
fn default_offset_x() -> f64 { 100.0 }
fn default_offset_y() -> f64 { 250.0 }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ViewerError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Load from `path` if it exists, otherwise use the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ViewerError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if url.is_empty() {
            return Err(ViewerError::Config("backend.base_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ViewerError::Config(format!(
                "backend.base_url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ViewerError::Config("request_timeout_secs must be > 0".into()));
        }
        let tl = &self.timeline;
        if tl.segment_duration_secs == 0 {
            return Err(ViewerError::Config("segment_duration_secs must be > 0".into()));
        }
        if tl.coverage_window_secs == 0 || tl.coverage_window_secs % tl.segment_duration_secs != 0 {
            return Err(ViewerError::Config(
                "coverage_window_secs must be a positive multiple of segment_duration_secs".into(),
            ));
        }
        Ok(())
    }
}
