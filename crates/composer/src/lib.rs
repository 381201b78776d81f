//! Report address composition.
//!
//! Turns the address an operator pasted into the one the frame loads:
//! legacy viewer pages are normalized, the report-path token is preserved
//! and re-encoded, and the report server's control parameters are injected.
//!
//! Composition never fails from the caller's point of view. A malformed
//! address comes back unchanged and malformed custom parameters are dropped;
//! both are logged.
//!
//! ```text
//! https://host/ReportServer/Pages/ReportViewer.aspx?/Sales/Monthly&Year=2024
//!   → https://host/reports/report?%2fSales%2fMonthly&Year=2024&rs%3AEmbed=true&...
//! ```

pub mod legacy;
pub mod params;
pub mod query;
pub mod report_path;

use std::borrow::Cow;

use reportframe_core::{
    AddressError, DisplayOptions, ReportConfiguration, ToolbarSuppression,
};
use url::Url;

pub use params::CustomParameters;
pub use query::QueryParams;

/// Embed-mode flag; always set.
pub const EMBED_KEY: &str = "rs:Embed";
/// Stylesheet selector used to hide the toolbar.
pub const STYLESHEET_KEY: &str = "rc:stylesheet";
/// Toolbar switch used by older deployments to hide the toolbar.
pub const TOOLBAR_KEY: &str = "rc:Toolbar";
/// Parameters-area visibility.
pub const PARAMETERS_KEY: &str = "rc:Parameters";
/// Zoom level.
pub const ZOOM_KEY: &str = "rc:Zoom";

const HIDE_TOOLBAR_STYLESHEET: &str = "hideToolBar";
const PARAMETERS_COLLAPSED: &str = "Collapsed";

/// Address composer carrying the dialect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composer {
    pub toolbar_suppression: ToolbarSuppression,
    pub rewrite_legacy_viewer: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            toolbar_suppression: ToolbarSuppression::default(),
            rewrite_legacy_viewer: true,
        }
    }
}

impl Composer {
    pub fn new(toolbar_suppression: ToolbarSuppression, rewrite_legacy_viewer: bool) -> Self {
        Self {
            toolbar_suppression,
            rewrite_legacy_viewer,
        }
    }

    pub fn from_config(config: &reportframe_config::ComposerConfig) -> Self {
        Self::new(config.toolbar_suppression, config.rewrite_legacy_viewer)
    }

    /// Compose the embeddable address for a full configuration record.
    pub fn compose_configuration(&self, config: &ReportConfiguration) -> String {
        let custom = CustomParameters::parse_lenient(&config.custom_parameters);
        self.compose(&config.raw_address, &config.display_options(), &custom)
    }

    /// Like [`compose_configuration`](Self::compose_configuration), but a
    /// malformed address or parameter text is an error instead of a fallback.
    pub fn compose_strict(&self, config: &ReportConfiguration) -> reportframe_core::Result<String> {
        if config.is_unconfigured() {
            return Ok(String::new());
        }
        let custom = CustomParameters::parse(&config.custom_parameters)?;
        Ok(self.try_compose(config.raw_address.trim(), &config.display_options(), &custom)?)
    }

    /// Compose the embeddable address.
    ///
    /// Pure and idempotent: composing a composed address with the same
    /// options returns it unchanged. Surrounding whitespace is dropped first;
    /// an address that cannot be interpreted is otherwise returned untouched.
    pub fn compose(
        &self,
        raw: &str,
        options: &DisplayOptions,
        custom: &CustomParameters,
    ) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }

        match self.try_compose(raw, options, custom) {
            Ok(composed) => {
                tracing::debug!(composed = %composed, "Built report URL");
                composed
            }
            Err(e) => {
                tracing::error!(address = %raw, error = %e, "Invalid report URL, using it unmodified");
                raw.to_string()
            }
        }
    }

    fn try_compose(
        &self,
        raw: &str,
        options: &DisplayOptions,
        custom: &CustomParameters,
    ) -> Result<String, AddressError> {
        let (address, fragment) = match raw.split_once('#') {
            Some((address, fragment)) => (address, Some(fragment)),
            None => (raw, None),
        };

        let address = if self.rewrite_legacy_viewer {
            legacy::normalize_viewer_address(address)
        } else {
            Cow::Borrowed(address)
        };

        let Some((base, query)) = address.split_once('?') else {
            let mut url = Url::parse(&address).map_err(|e| invalid_base(&address, e))?;
            let mut params = QueryParams::new();
            self.apply_controls(&mut params, options, custom);
            url.query_pairs_mut().extend_pairs(params.iter());
            return Ok(with_fragment(url.into(), fragment));
        };

        Url::parse(base).map_err(|e| invalid_base(base, e))?;

        let (report_path, rest) = report_path::split_report_path(query);
        let mut params = QueryParams::parse(rest);
        self.apply_controls(&mut params, options, custom);
        let serialized = params.serialize();

        let composed = match report_path {
            Some(token) => {
                let encoded = report_path::encode_report_path(token)?;
                if serialized.is_empty() {
                    format!("{base}?{encoded}")
                } else {
                    format!("{base}?{encoded}&{serialized}")
                }
            }
            None if serialized.is_empty() => base.to_string(),
            None => format!("{base}?{serialized}"),
        };

        Ok(with_fragment(composed, fragment))
    }

    fn apply_controls(
        &self,
        params: &mut QueryParams,
        options: &DisplayOptions,
        custom: &CustomParameters,
    ) {
        params.set(EMBED_KEY, "true");

        if !options.show_toolbar {
            match self.toolbar_suppression {
                ToolbarSuppression::Stylesheet => {
                    params.set(STYLESHEET_KEY, HIDE_TOOLBAR_STYLESHEET)
                }
                ToolbarSuppression::ToolbarParameter => params.set(TOOLBAR_KEY, "false"),
            }
        }

        if !options.show_parameters {
            params.set(PARAMETERS_KEY, PARAMETERS_COLLAPSED);
        }

        if let Some(zoom) = options.zoom {
            params.set(ZOOM_KEY, &zoom.as_query_value());
        }

        for (key, value) in custom.iter() {
            params.set(key, value);
        }
    }
}

/// Compose with the default policy.
pub fn compose(raw: &str, options: &DisplayOptions, custom: &CustomParameters) -> String {
    Composer::default().compose(raw, options, custom)
}

fn invalid_base(address: &str, error: url::ParseError) -> AddressError {
    AddressError::InvalidBase {
        address: address.to_string(),
        reason: error.to_string(),
    }
}

fn with_fragment(mut composed: String, fragment: Option<&str>) -> String {
    if let Some(fragment) = fragment {
        composed.push('#');
        composed.push_str(fragment);
    }
    composed
}
