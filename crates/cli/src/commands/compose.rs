//! `reportframe compose` — Print the embeddable address.

use std::path::Path;

use reportframe_composer::Composer;
use reportframe_config::AppConfig;
use reportframe_core::{ReportConfiguration, Zoom};

/// Command-line values layered over `[report]`.
#[derive(Debug, Default)]
pub struct ComposeArgs {
    pub address: Option<String>,
    pub show_toolbar: bool,
    pub show_parameters: bool,
    pub zoom: Option<String>,
    pub parameters: Option<String>,
}

pub async fn run(config_path: Option<&Path>, args: ComposeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let report = configuration(&config, args)?;

    if report.is_unconfigured() {
        return Err("No report address given (pass --address or set report.address)".into());
    }

    let composer = Composer::from_config(&config.composer);
    println!("{}", composer.compose_strict(&report)?);
    Ok(())
}

fn configuration(
    config: &AppConfig,
    args: ComposeArgs,
) -> Result<ReportConfiguration, Box<dyn std::error::Error>> {
    let mut report = config.report.to_configuration();

    if let Some(address) = args.address {
        report.raw_address = address.trim().to_string();
    }
    report.show_toolbar |= args.show_toolbar;
    report.show_parameters |= args.show_parameters;
    if let Some(zoom) = args.zoom {
        report.zoom = Some(zoom.parse::<Zoom>()?);
    }
    if let Some(parameters) = args.parameters {
        report.custom_parameters = parameters;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_override_config() {
        let mut config = AppConfig::default();
        config.report.address = "https://old/reports/report?/A".into();
        config.report.parameters = r#"{"Region":"EU"}"#.into();

        let report = configuration(
            &config,
            ComposeArgs {
                address: Some(" https://new/reports/report?/B ".into()),
                show_toolbar: true,
                zoom: Some("whole page".into()),
                ..ComposeArgs::default()
            },
        )
        .unwrap();

        assert_eq!(report.raw_address, "https://new/reports/report?/B");
        assert!(report.show_toolbar);
        assert!(!report.show_parameters);
        assert_eq!(report.zoom, Some(Zoom::WholePage));
        assert_eq!(report.custom_parameters, r#"{"Region":"EU"}"#);
    }

    #[test]
    fn unsupported_zoom_is_an_error() {
        let result = configuration(
            &AppConfig::default(),
            ComposeArgs {
                zoom: Some("33".into()),
                ..ComposeArgs::default()
            },
        );
        assert!(result.is_err());
    }
}
