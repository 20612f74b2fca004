//! JobGuard CLI
//!
//! Scores a job posting locally against the model directory, or queries
//! and controls a running scoring server.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, remote};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Job-posting fraud scoring CLI
#[derive(Parser)]
#[command(name = "jobguard")]
#[command(author, version, about = "CLI for JobGuard job-posting fraud scoring", long_about = None)]
pub struct Cli {
    /// Scoring server URL for remote commands
    #[arg(long, env = "JOBGUARD_API_URL", default_value = "http://localhost:5000", global = true)]
    pub api_url: String,

    /// Output format for remote commands
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose diagnostics on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one posting locally and print a single JSON line
    Predict {
        /// Model name, e.g. Random_Forest
        model: String,

        /// Posting as a JSON object; read from stdin when omitted
        payload: Option<String>,

        /// Directory holding model and preprocessing artifacts
        #[arg(long, env = "JOBGUARD_MODEL_DIR", default_value = "model")]
        model_dir: PathBuf,
    },

    /// Show health of a running server
    Health,

    /// List models known to a running server
    Models,

    /// Switch the default model of a running server
    Switch {
        /// Model name to make the default
        model: String,
    },
}

/// Diagnostics go to stderr so stdout carries only command output
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Predict {
            model,
            payload,
            model_dir,
        } => {
            predict::run(&model_dir, &model, payload).await?;
        }
        Commands::Health => {
            let client = client::ApiClient::new(&cli.api_url)?;
            remote::show_health(&client, cli.format).await?;
        }
        Commands::Models => {
            let client = client::ApiClient::new(&cli.api_url)?;
            remote::list_models(&client, cli.format).await?;
        }
        Commands::Switch { model } => {
            let client = client::ApiClient::new(&cli.api_url)?;
            remote::switch_model(&client, &model, cli.format).await?;
        }
    }

    Ok(())
}
