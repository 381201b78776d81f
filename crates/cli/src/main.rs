//! ReportFrame CLI — the main entry point.
//!
//! Commands:
//! - `compose`   — Print the embeddable address for a report
//! - `measure`   — Measure a captured report document like the agent would
//! - `replay`    — Run a scripted event timeline through the embedding surface
//! - `simulate`  — Run the surface and a reporter agent against a document
//! - `config`    — Validate, show, locate or create the configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reportframe",
    about = "ReportFrame — SSRS report embedding with automatic frame height",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.reportframe/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the embeddable address for a report
    Compose {
        /// Report address (defaults to report.address)
        #[arg(short, long)]
        address: Option<String>,

        /// Keep the report server toolbar
        #[arg(long)]
        show_toolbar: bool,

        /// Keep the parameter pane expanded
        #[arg(long)]
        show_parameters: bool,

        /// Zoom: "Page Width", "Whole Page" or a percentage
        #[arg(short, long)]
        zoom: Option<String>,

        /// Custom report parameters as a JSON object
        #[arg(short, long)]
        parameters: Option<String>,
    },

    /// Measure a captured report document
    Measure {
        /// Path to a document JSON file
        document: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a timeline of height messages and setting changes
    Replay {
        /// Path to a timeline JSON file
        timeline: PathBuf,

        /// Print each step as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// Run the embedding surface and a reporter agent against a document
    Simulate {
        /// Path to a document JSON file
        document: PathBuf,

        /// How long to run
        #[arg(short, long, default_value_t = 5)]
        seconds: u64,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Check that the configuration loads and is consistent
    Validate,
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Compose {
            address,
            show_toolbar,
            show_parameters,
            zoom,
            parameters,
        } => {
            let overrides = commands::compose::ComposeArgs {
                address,
                show_toolbar,
                show_parameters,
                zoom,
                parameters,
            };
            commands::compose::run(config_path, overrides).await?
        }
        Commands::Measure { document, json } => {
            commands::measure::run(config_path, &document, json).await?
        }
        Commands::Replay { timeline, json } => {
            commands::replay::run(config_path, &timeline, json).await?
        }
        Commands::Simulate { document, seconds } => {
            commands::simulate::run(config_path, &document, seconds).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate(config_path).await?,
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(config_path).await?,
            ConfigAction::Init { force } => commands::config_cmd::init(config_path, force).await?,
        },
    }

    Ok(())
}
