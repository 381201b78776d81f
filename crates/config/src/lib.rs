//! Configuration loading, validation, and management for ReportFrame.
//!
//! Loads configuration from `~/.reportframe/config.toml` with environment
//! variable overrides. Validates all settings at startup; declared heights
//! outside the operator range are clamped rather than rejected.

use reportframe_core::{ReportConfiguration, ToolbarSuppression, Zoom};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.reportframe/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// The embedded report and its display options
    #[serde(default)]
    pub report: ReportConfig,

    /// Address composition policy
    #[serde(default)]
    pub composer: ComposerConfig,

    /// Height synchronization thresholds
    #[serde(default)]
    pub sync: SyncConfig,

    /// Reporter agent cadence and element selectors
    #[serde(default)]
    pub agent: AgentConfig,

    /// Host page context forwarded to the surface
    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Full report URL, e.g. `https://reports/ReportServer?/Sales/Monthly`
    #[serde(default)]
    pub address: String,

    /// Report parameters as a JSON object, e.g. `{"Year":"2024"}`
    #[serde(default)]
    pub parameters: String,

    #[serde(default)]
    pub show_toolbar: bool,

    #[serde(default)]
    pub show_parameters: bool,

    #[serde(default = "default_zoom")]
    pub zoom: Zoom,

    /// Frame height in pixels (initial height when auto-fit is on)
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_true")]
    pub auto_fit: bool,
}

fn default_zoom() -> Zoom {
    Zoom::default()
}
fn default_height() -> u32 {
    reportframe_core::DEFAULT_DECLARED_HEIGHT
}
fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            parameters: String::new(),
            show_toolbar: false,
            show_parameters: false,
            zoom: default_zoom(),
            height: default_height(),
            auto_fit: true,
        }
    }
}

impl ReportConfig {
    /// Build the host-facing configuration record.
    pub fn to_configuration(&self) -> ReportConfiguration {
        ReportConfiguration {
            raw_address: self.address.trim().to_string(),
            show_toolbar: self.show_toolbar,
            show_parameters: self.show_parameters,
            custom_parameters: self.parameters.clone(),
            zoom: Some(self.zoom),
            declared_height: ReportConfiguration::clamp_height(self.height),
            auto_fit: self.auto_fit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    #[serde(default)]
    pub toolbar_suppression: ToolbarSuppression,

    /// Rewrite `/ReportServer/Pages/ReportViewer.aspx` addresses to `/reports/report`
    #[serde(default = "default_true")]
    pub rewrite_legacy_viewer: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            toolbar_suppression: ToolbarSuppression::default(),
            rewrite_legacy_viewer: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Height changes at or below this many pixels are jitter
    #[serde(default = "default_jitter_tolerance")]
    pub jitter_tolerance_px: u32,

    /// Drops larger than this are ignored outside a shrink window
    #[serde(default = "default_shrink_guard")]
    pub shrink_guard_px: u32,

    /// Added to every accepted height to cover borders and margins
    #[serde(default = "default_display_buffer")]
    pub display_buffer_px: u32,

    /// How long shrinking is allowed after a display setting changes
    #[serde(default = "default_shrink_window_ms")]
    pub shrink_window_ms: u64,
}

fn default_jitter_tolerance() -> u32 {
    5
}
fn default_shrink_guard() -> u32 {
    50
}
fn default_display_buffer() -> u32 {
    25
}
fn default_shrink_window_ms() -> u64 {
    5000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            jitter_tolerance_px: default_jitter_tolerance(),
            shrink_guard_px: default_shrink_guard(),
            display_buffer_px: default_display_buffer(),
            shrink_window_ms: default_shrink_window_ms(),
        }
    }
}

impl SyncConfig {
    pub fn shrink_window(&self) -> Duration {
        Duration::from_millis(self.shrink_window_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Reporting cadence after the initial on-load report
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Id of the rendered report element when the toolbar is suppressed
    #[serde(default = "default_report_content_id")]
    pub report_content_id: String,

    /// Id of the viewer table holding toolbar, parameter and content rows
    #[serde(default = "default_viewer_container_id")]
    pub viewer_container_id: String,

    /// Id prefix of the visible report content region inside the viewer
    #[serde(default = "default_visible_content_prefix")]
    pub visible_content_prefix: String,
}

fn default_interval_ms() -> u64 {
    1000
}
fn default_report_content_id() -> String {
    "oReportDiv".into()
}
fn default_viewer_container_id() -> String {
    "ReportViewerControl_fixedTable".into()
}
fn default_visible_content_prefix() -> String {
    "VisibleReportContent".into()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            report_content_id: default_report_content_id(),
            viewer_container_id: default_viewer_container_id(),
            visible_content_prefix: default_visible_content_prefix(),
        }
    }
}

impl AgentConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub dark_theme: bool,

    /// Rendered inside a Teams tab rather than a regular page
    #[serde(default)]
    pub teams_context: bool,
}

impl AppConfig {
    /// Load configuration from the default path (~/.reportframe/config.toml).
    ///
    /// Also checks environment variables:
    /// - `REPORTFRAME_ADDRESS` overrides `report.address`
    /// - `REPORTFRAME_ZOOM` overrides `report.zoom`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if let Ok(address) = std::env::var("REPORTFRAME_ADDRESS") {
            config.report.address = address;
        }

        if let Ok(zoom) = std::env::var("REPORTFRAME_ZOOM") {
            config.report.zoom = zoom
                .parse()
                .map_err(|e: reportframe_core::ZoomParseError| {
                    ConfigError::ValidationError(e.to_string())
                })?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        config.normalize();
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".reportframe")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.shrink_window_ms == 0 {
            return Err(ConfigError::ValidationError(
                "sync.shrink_window_ms must be greater than 0".into(),
            ));
        }

        if self.agent.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "agent.interval_ms must be greater than 0".into(),
            ));
        }

        if self.sync.shrink_guard_px < self.sync.jitter_tolerance_px {
            return Err(ConfigError::ValidationError(
                "sync.shrink_guard_px must not be smaller than sync.jitter_tolerance_px".into(),
            ));
        }

        Ok(())
    }

    /// Clamp values that are tolerated but out of range.
    fn normalize(&mut self) {
        let clamped = ReportConfiguration::clamp_height(self.report.height);
        if clamped != self.report.height {
            tracing::warn!(
                requested = self.report.height,
                clamped,
                "report.height outside 400..=3000 or off the 50px grid, adjusting"
            );
            self.report.height = clamped;
        }
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.height, 800);
        assert_eq!(config.sync.jitter_tolerance_px, 5);
        assert_eq!(config.agent.report_content_id, "oReportDiv");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.report.zoom, config.report.zoom);
        assert_eq!(parsed.sync.shrink_window_ms, 5000);
    }

    #[test]
    fn zero_shrink_window_rejected() {
        let config = AppConfig {
            sync: SyncConfig {
                shrink_window_ms: 0,
                ..SyncConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert!(result.unwrap().report.address.is_empty());
    }

    #[test]
    fn report_section_parsing() {
        let toml_str = r#"
[report]
address = "https://reports.example.com/ReportServer?/Sales/Monthly"
parameters = '{"Year":"2024"}'
show_toolbar = true
zoom = "Page Width"
height = 1200
auto_fit = false

[composer]
toolbar_suppression = "toolbar_parameter"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.report.show_toolbar);
        assert_eq!(config.report.zoom, Zoom::PageWidth);
        assert_eq!(
            config.composer.toolbar_suppression,
            ToolbarSuppression::ToolbarParameter
        );

        let report = config.report.to_configuration();
        assert_eq!(report.declared_height, 1200);
        assert!(!report.auto_fit);
        assert_eq!(report.custom_parameters, r#"{"Year":"2024"}"#);
    }

    #[test]
    fn numeric_zoom_accepted() {
        let config: AppConfig = toml::from_str("[report]\nzoom = 150\n").unwrap();
        assert_eq!(config.report.zoom, Zoom::Percent(150));
    }

    #[test]
    fn unsupported_zoom_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[report]\nzoom = \"333\"\n").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn out_of_range_height_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[report]\nheight = 5000\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.report.height, 3000);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("oReportDiv"));
        assert!(toml_str.contains("shrink_window_ms"));
    }
}
