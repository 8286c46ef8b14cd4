mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use climawatch_core::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "climawatch",
    about = "Watch a ThingSpeak temperature/humidity feed, alert over WhatsApp, and stabilize critical readings",
    version,
    propagate_version = true
)]
struct Cli {
    /// Thresholds YAML file (overrides CLIMAWATCH_THRESHOLDS)
    #[arg(long, global = true)]
    thresholds: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0", env = "CLIMAWATCH_HOST")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "8000", env = "CLIMAWATCH_PORT")]
        port: u16,
    },

    /// Show the latest reading
    Metrics,

    /// Check the latest reading against the thresholds
    Check {
        /// Send a WhatsApp alert to DEFAULT_NOTIFY_PHONE when critical
        #[arg(long)]
        notify: bool,
    },

    /// Send a WhatsApp message
    Notify {
        /// Recipient phone number, e.g. +34600000000
        #[arg(long, env = "DEFAULT_NOTIFY_PHONE")]
        phone: String,

        /// Message text
        message: String,
    },

    /// Write one reading to the feed
    Send {
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,

        #[arg(long, allow_negative_numbers = true)]
        humidity: f64,
    },

    /// Walk a critical reading back to the optimal values
    Stabilize,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Stabilize => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = match &cli.thresholds {
        Some(path) => Settings::from_env(Some(path.as_path()))
            .with_context(|| format!("failed to load thresholds from {}", path.display()))?,
        None => Settings::from_env(None).context("failed to load configuration")?,
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        match cli.command {
            Commands::Serve { host, port } => cmd::serve::run(settings, &host, port).await,
            Commands::Metrics => cmd::metrics::run(&settings, cli.json).await,
            Commands::Check { notify } => cmd::check::run(&settings, notify, cli.json).await,
            Commands::Notify { phone, message } => {
                cmd::notify::run(&settings, &phone, &message, cli.json).await
            }
            Commands::Send {
                temperature,
                humidity,
            } => cmd::send::run(&settings, temperature, humidity, cli.json).await,
            Commands::Stabilize => cmd::stabilize::run(&settings, cli.json).await,
        }
    })
}
