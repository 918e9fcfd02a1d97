//! Report Extras CLI - Main Entry Point
//!
//! Resolves mime hints, normalizes single files into report steps and
//! renders YAML report specs into HTML fragments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use report_extras::ExtrasConfig;
use report_extras_cli::commands::{attach, mime, render};
use report_extras_cli::output;

/// Report Extras CLI - attachments and steps for HTML test reports
#[derive(Parser)]
#[command(name = "report-extras")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve mime strings and extensions
    Mime(mime::MimeArgs),

    /// Normalize a file and print its step row
    Attach(attach::AttachArgs),

    /// Render a YAML report spec
    Render(render::RenderArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Invalid configuration: {}", e));
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Mime(args) => mime::execute(args, cli.format)?,
        Commands::Attach(args) => attach::execute(args, config, cli.format)?,
        Commands::Render(args) => render::execute(args, config, cli.format)?,
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ExtrasConfig> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                output::print_warning(&format!("{} not found, using defaults", path.display()));
            }
            ExtrasConfig::load(path)?
        }
        None => ExtrasConfig::default(),
    };
    config.apply_env()?;
    Ok(config)
}
