//! Reconciler CLI
//!
//! Command-line interface for the cluster reconciler service

mod commands;
mod config;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use output::OutputFormat;
use reconciler_client::{Config, ReconcilerClient};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "reconciler", author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Reconciler service URL (overrides the config file)
    #[arg(short, long, env = "RECONCILER_URL", global = true)]
    url: Option<String>,

    /// Output format (defaults to the config file setting)
    #[arg(short, long, value_enum, global = true)]
    output: Option<OutputFormat>,

    /// Per-request timeout in seconds, fractions allowed (e.g. 0.5)
    #[arg(long, env = "RECONCILER_TIMEOUT_SECS", global = true, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write JSON logs to this directory, rotated daily
    #[arg(long, env = "RECONCILER_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a desired cluster configuration from a JSON or YAML file
    Apply {
        /// Cluster definition file
        file: PathBuf,
    },
    /// Request deletion of a cluster's reconciliation state
    Delete {
        /// Cluster ID
        cluster_id: String,
    },
    /// Show reconciliation status, latest or at a configuration version
    Status {
        /// Cluster ID
        cluster_id: String,
        /// Configuration version to inspect instead of the latest
        #[arg(short, long)]
        config_version: Option<i64>,
    },
    /// Show status transitions within a time window
    History {
        /// Cluster ID
        cluster_id: String,
        /// How far back to look, e.g. 30m or 1h
        #[arg(long, default_value = "1h")]
        offset: String,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Save the default reconciler URL
    SetUrl { url: String },
}

fn parse_timeout(raw: &str) -> std::result::Result<Duration, String> {
    reconciler_client::config::parse_timeout_secs(raw).map_err(|e| e.to_string())
}

fn build_client(config: &Config) -> Result<ReconcilerClient> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("reconciler-cli/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("failed to create HTTP client")?;

    Ok(ReconcilerClient::new(http, config.clone())?)
}

async fn run(cli: Cli) -> Result<()> {
    let mut cli_config = config::CliConfig::load().unwrap_or_else(|e| {
        output::print_warning(&format!("ignoring config file: {:#}", e));
        config::CliConfig::default()
    });

    let format = cli
        .output
        .unwrap_or_else(|| OutputFormat::parse(&cli_config.default_output));

    let effective = Config {
        url: cli_config.resolve_url(cli.url.as_deref()),
        timeout: cli_config.resolve_timeout(cli.timeout),
    };

    match cli.command {
        Commands::Apply { file } => {
            let client = build_client(&effective)?;
            commands::cluster::handle_apply(&client, &file, format).await?
        }
        Commands::Delete { cluster_id } => {
            let client = build_client(&effective)?;
            commands::cluster::handle_delete(&client, &cluster_id).await?
        }
        Commands::Status {
            cluster_id,
            config_version,
        } => {
            let client = build_client(&effective)?;
            commands::cluster::handle_status(&client, &cluster_id, config_version, format).await?
        }
        Commands::History { cluster_id, offset } => {
            let client = build_client(&effective)?;
            commands::cluster::handle_history(&client, &cluster_id, &offset, format).await?
        }
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &mut cli_config, &effective, format)?
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "reconciler", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = logging::LoggingConfig {
        level: logging::LoggingConfig::level_for_verbosity(cli.verbose).to_string(),
        json_format: cli.log_json,
        log_dir: cli.log_dir.clone(),
    };
    let _guard = match logging.init() {
        Ok(guard) => guard,
        Err(e) => {
            output::print_error(&format!("failed to initialize logging: {:#}", e));
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
