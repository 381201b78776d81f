//! `reportframe config` — Configuration management commands.

use std::path::Path;

use reportframe_composer::{Composer, CustomParameters};
use reportframe_config::AppConfig;
use reportframe_core::Zoom;

pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match super::load_config(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            let report = config.report.to_configuration();
            println!();
            println!(
                "   Report:    {}",
                if report.is_unconfigured() {
                    "(not set)"
                } else {
                    report.raw_address.as_str()
                }
            );
            println!(
                "   Zoom:      {} (choices: {})",
                config.report.zoom.label(),
                zoom_choices()
            );
            println!("   {}: {}", report.height_label(), report.declared_height);
            println!("   Auto-fit:  {}", config.report.auto_fit);
            println!(
                "   Sync:      jitter {}px, guard {}px, buffer {}px, window {}ms",
                config.sync.jitter_tolerance_px,
                config.sync.shrink_guard_px,
                config.sync.display_buffer_px,
                config.sync.shrink_window_ms
            );
            println!("   Agent:     every {}ms", config.agent.interval_ms);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

fn zoom_choices() -> String {
    Zoom::options()
        .iter()
        .map(Zoom::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Problems that do not stop loading but will surprise an operator.
fn warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let report = config.report.to_configuration();

    if report.is_unconfigured() {
        warnings.push("No report address set; the frame shows a placeholder".to_string());
    }

    match CustomParameters::parse(&report.custom_parameters) {
        Ok(_) => {
            if let Err(e) = Composer::from_config(&config.composer).compose_strict(&report) {
                warnings.push(format!("{e}; the address will be used unmodified"));
            }
        }
        Err(e) => warnings.push(format!("report.parameters ignored: {e}")),
    }

    if config.sync.display_buffer_px <= config.sync.jitter_tolerance_px {
        warnings.push(
            "sync.display_buffer_px at or below the jitter tolerance may let scrollbars flicker"
                .into(),
        );
    }

    warnings
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", super::config_file(config_path).display());
    Ok(())
}

pub async fn init(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_file(config_path);

    if path.exists() && !force {
        println!("⚠️  Config already exists at: {}", path.display());
        println!("   Edit it manually or re-run with --force.");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", path.display());
    Ok(())
}
