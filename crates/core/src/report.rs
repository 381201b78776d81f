//! Report configuration — what the host supplies to embed one report.
//!
//! Mirrors the fields an operator edits on the host page: address,
//! visibility toggles, zoom, custom parameter text, declared height and the
//! auto-fit switch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Height used when the host does not declare one.
pub const DEFAULT_DECLARED_HEIGHT: u32 = 800;

/// Smallest declared height an operator can pick.
pub const MIN_DECLARED_HEIGHT: u32 = 400;

/// Largest declared height an operator can pick.
pub const MAX_DECLARED_HEIGHT: u32 = 3000;

/// Report server zoom level.
///
/// Serialized as the exact token the report server accepts for `rc:Zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zoom {
    PageWidth,
    WholePage,
    Percent(u16),
}

impl Zoom {
    /// Percentages offered to operators.
    pub const ALLOWED_PERCENTS: [u16; 6] = [50, 75, 100, 125, 150, 200];

    /// Every selectable zoom, in the order the editing UI lists them.
    pub fn options() -> Vec<Zoom> {
        let mut options = vec![Zoom::PageWidth, Zoom::WholePage];
        options.extend(Self::ALLOWED_PERCENTS.iter().map(|p| Zoom::Percent(*p)));
        options
    }

    /// The value placed in the query string.
    pub fn as_query_value(&self) -> String {
        match self {
            Zoom::PageWidth => "Page Width".into(),
            Zoom::WholePage => "Whole Page".into(),
            Zoom::Percent(p) => p.to_string(),
        }
    }

    /// Label shown next to the option in an editing UI.
    pub fn label(&self) -> String {
        match self {
            Zoom::Percent(p) => format!("{p}%"),
            other => other.as_query_value(),
        }
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom::Percent(100)
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_query_value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported zoom '{0}' (expected Page Width, Whole Page, or one of 50/75/100/125/150/200)")]
pub struct ZoomParseError(pub String);

impl FromStr for Zoom {
    type Err = ZoomParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = trimmed.to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "page width" | "pagewidth" => return Ok(Zoom::PageWidth),
            "whole page" | "wholepage" => return Ok(Zoom::WholePage),
            _ => {}
        }

        let digits = trimmed.trim_end_matches('%');
        match digits.parse::<u16>() {
            Ok(p) if Self::ALLOWED_PERCENTS.contains(&p) => Ok(Zoom::Percent(p)),
            _ => Err(ZoomParseError(s.to_string())),
        }
    }
}

impl Serialize for Zoom {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_query_value())
    }
}

impl<'de> Deserialize<'de> for Zoom {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u16),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(t) => t,
            Raw::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// How a hidden toolbar is requested from the report server.
///
/// `rc:Toolbar=false` switches the server into a rendering mode that bypasses
/// the viewer page entirely, so the default hides the toolbar with the
/// `hideToolBar` stylesheet instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarSuppression {
    #[default]
    Stylesheet,
    ToolbarParameter,
}

/// The address-affecting display subset of a [`ReportConfiguration`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DisplayOptions {
    pub show_toolbar: bool,
    pub show_parameters: bool,
    pub zoom: Option<Zoom>,
}

/// Everything the host supplies for one embedded report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfiguration {
    /// Report address as typed by the operator (may be empty)
    #[serde(default)]
    pub raw_address: String,

    #[serde(default)]
    pub show_toolbar: bool,

    #[serde(default)]
    pub show_parameters: bool,

    /// Custom report parameters as JSON object text
    #[serde(default)]
    pub custom_parameters: String,

    #[serde(default = "default_zoom")]
    pub zoom: Option<Zoom>,

    /// Frame height in pixels before any auto-fit
    #[serde(default = "default_declared_height")]
    pub declared_height: u32,

    #[serde(default = "default_true")]
    pub auto_fit: bool,
}

fn default_zoom() -> Option<Zoom> {
    Some(Zoom::default())
}
fn default_declared_height() -> u32 {
    DEFAULT_DECLARED_HEIGHT
}
fn default_true() -> bool {
    true
}

impl Default for ReportConfiguration {
    fn default() -> Self {
        Self {
            raw_address: String::new(),
            show_toolbar: false,
            show_parameters: false,
            custom_parameters: String::new(),
            zoom: default_zoom(),
            declared_height: DEFAULT_DECLARED_HEIGHT,
            auto_fit: true,
        }
    }
}

impl ReportConfiguration {
    /// Configuration for an address with every other field defaulted.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            raw_address: address.into(),
            ..Self::default()
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            show_toolbar: self.show_toolbar,
            show_parameters: self.show_parameters,
            zoom: self.zoom,
        }
    }

    /// Whether no address is configured, i.e. the placeholder is shown.
    pub fn is_unconfigured(&self) -> bool {
        self.raw_address.trim().is_empty()
    }

    /// Clamp a declared height into the operator range, snapping to 50px steps.
    pub fn clamp_height(height: u32) -> u32 {
        let clamped = height.clamp(MIN_DECLARED_HEIGHT, MAX_DECLARED_HEIGHT);
        let snapped = ((clamped + 25) / 50) * 50;
        snapped.min(MAX_DECLARED_HEIGHT)
    }

    /// Label for the height field, which means different things with auto-fit.
    pub fn height_label(&self) -> &'static str {
        if self.auto_fit {
            "Initial Height (pixels)"
        } else {
            "Height (pixels)"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_parses_named_and_percent_values() {
        assert_eq!("Page Width".parse::<Zoom>().unwrap(), Zoom::PageWidth);
        assert_eq!("whole-page".parse::<Zoom>().unwrap(), Zoom::WholePage);
        assert_eq!("125".parse::<Zoom>().unwrap(), Zoom::Percent(125));
        assert_eq!("75%".parse::<Zoom>().unwrap(), Zoom::Percent(75));
    }

    #[test]
    fn zoom_rejects_values_outside_allowed_set() {
        assert!("110".parse::<Zoom>().is_err());
        assert!("huge".parse::<Zoom>().is_err());
    }

    #[test]
    fn zoom_serializes_as_query_token() {
        let json = serde_json::to_string(&Zoom::PageWidth).unwrap();
        assert_eq!(json, "\"Page Width\"");
        let parsed: Zoom = serde_json::from_str("150").unwrap();
        assert_eq!(parsed, Zoom::Percent(150));
    }

    #[test]
    fn zoom_options_list_named_levels_first() {
        let options = Zoom::options();
        assert_eq!(options.len(), 8);
        assert_eq!(options[0], Zoom::PageWidth);
        assert_eq!(options[7].label(), "200%");
    }

    #[test]
    fn default_configuration_matches_host_defaults() {
        let config = ReportConfiguration::default();
        assert_eq!(config.declared_height, 800);
        assert!(config.auto_fit);
        assert_eq!(config.zoom, Some(Zoom::Percent(100)));
        assert!(config.is_unconfigured());
    }

    #[test]
    fn clamp_height_bounds_and_snaps() {
        assert_eq!(ReportConfiguration::clamp_height(10), 400);
        assert_eq!(ReportConfiguration::clamp_height(9000), 3000);
        assert_eq!(ReportConfiguration::clamp_height(820), 800);
        assert_eq!(ReportConfiguration::clamp_height(830), 850);
    }

    #[test]
    fn height_label_depends_on_auto_fit() {
        let mut config = ReportConfiguration::default();
        assert_eq!(config.height_label(), "Initial Height (pixels)");
        config.auto_fit = false;
        assert_eq!(config.height_label(), "Height (pixels)");
    }
}
