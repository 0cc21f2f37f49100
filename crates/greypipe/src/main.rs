//! greypipe CLI - resize and greyscale a batch of images.
//!
//! Each image is shrunk to fit 500x500, converted to greyscale and written
//! under `images/output/`. The concurrent mode runs four pipeline stages at
//! once; the sequential mode is the baseline to compare against.
//!
//! # Usage
//!
//! ```bash
//! # Concurrent pipeline (default)
//! greypipe --images="images/cat1.jpg,images/cat2.png"
//!
//! # Sequential baseline, stops at the first failure
//! greypipe --images="images/cat1.jpg,images/cat2.png" --mode sequential
//!
//! # View configuration
//! greypipe config show
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::config::{ConfigArgs, ConfigCommand};
use greypipe_core::Config;
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// greypipe - resize and greyscale images through a staged pipeline.
#[derive(Parser, Debug)]
#[command(name = "greypipe")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long = "config", global = true, env = "GREYPIPE_CONFIG")]
    config_file: Option<String>,

    #[command(flatten)]
    process: cli::process::ProcessArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View and manage configuration
    Config(ConfigArgs),
}

impl Cli {
    /// Whether an explicitly named config file has to exist already.
    /// `config init` creates it and `config path` only reports it.
    fn needs_existing_config(&self) -> bool {
        !matches!(
            &self.command,
            Some(Commands::Config(ConfigArgs {
                command: ConfigCommand::Init { .. } | ConfigCommand::Path,
            }))
        )
    }
}

/// Resolve the config file location and load it.
///
/// With no explicit path, a missing or unreadable file at the default
/// location falls back to defaults. An explicit path that is missing or
/// invalid is an error when `required` is set.
fn load_config(explicit: Option<&str>, required: bool) -> anyhow::Result<(PathBuf, Config)> {
    let Some(raw) = explicit else {
        let path = Config::default_path();
        let config = load_or_default(&path);
        return Ok((path, config));
    };

    let path = Config::expand_path(raw);
    if !required {
        let config = load_or_default(&path);
        return Ok((path, config));
    }
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    let config = Config::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((path, config))
}

fn load_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    // Logging isn't initialized yet, so use eprintln for config warnings.
    match Config::load_from(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `greypipe config path`."
            );
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config_path, config) =
        load_config(cli.config_file.as_deref(), cli.needs_existing_config())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("greypipe v{}", greypipe_core::VERSION);

    match cli.command {
        Some(Commands::Config(args)) => cli::config::execute(args, &config_path).await,
        None => cli::process::execute(cli.process, &config).await,
    }
}
