//! codema CLI entrypoint
//! Parses command-line arguments and dispatches to the generator.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use codema::core::{ConfigLoader, DEFAULT_CONFIG_FILE, utils::expand_path};
use codema::generation::{Generator, TargetSelection};
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::{Args, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments used when no subcommand is given
    #[command(flatten)]
    pub legacy: GenerateArgs,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render the configured targets
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Comma separated target labels, or `*` for every target
    #[arg(short, long, default_value = "*")]
    targets: String,
    /// Path to the YAML or TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Templates directory, overriding `templateDir` from the config
    #[arg(long)]
    templates_dir: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Commands::Generate(args)) => args,
        None => {
            warn!("Running codema without a subcommand is deprecated, use `codema generate`");
            cli.legacy
        }
    };

    generate(&args)
}

fn generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = ConfigLoader::from_path(&args.config)
        .load()
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    let templates_dir = expand_path(args.templates_dir.as_deref().unwrap_or(&config.template_dir));
    info!(
        config = %args.config.display(),
        templates_dir = %templates_dir.display(),
        "Starting codema"
    );

    let summary = Generator::new(&config, templates_dir)
        .context("Failed to prepare generation")?
        .run(&TargetSelection::parse(&args.targets))
        .context("Failed to generate targets")?;

    info!(
        file_count = summary.file_count,
        target_count = summary.rendered_targets.len(),
        "Generation complete"
    );
    Ok(())
}
