//! Fungible daemon: runs a ledger network inside one process and feeds it
//! flow requests.

use anyhow::Context;
use clap::Parser;
use fungible_node::{
    init_logging, FlowOutcome, FlowRequest, LocalNetwork, LogFormat, NetworkConfig, NodeConfig,
};
use fungible_types::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "fungible-daemon", about = "Fungible token ledger daemon")]
struct Cli {
    /// Path to a TOML network description (notary, parties and a [node] table).
    /// Without one, a development network of Alice, Bob and Carol is used.
    #[arg(long, env = "FUNGIBLE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the config file's `log_level`.
    #[arg(long, env = "FUNGIBLE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Overrides the config file's `log_format`.
    #[arg(long, env = "FUNGIBLE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Execute a JSON array of flow requests in order and print each outcome.
    Run {
        /// File holding the request batch.
        requests: PathBuf,
    },
    /// Read newline-delimited JSON requests from stdin until EOF or a signal.
    Serve,
    /// Print the effective node configuration as TOML.
    ShowConfig,
}

fn dev_network() -> NetworkConfig {
    NetworkConfig {
        notary: "Notary".into(),
        parties: vec!["Alice".into(), "Bob".into(), "Carol".into()],
        network_secret: "fungible-dev-network".into(),
        node: NodeConfig::default(),
    }
}

fn print_outcome(outcome: &FlowOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => {
            let path = path.to_str().context("config path is not valid UTF-8")?;
            NetworkConfig::from_toml_file(path)
                .with_context(|| format!("loading network config from {path}"))?
        }
        None => dev_network(),
    };
    if let Some(level) = cli.log_level {
        config.node.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.node.log_format = format;
    }
    let format: LogFormat = config.node.log_format.parse()?;
    init_logging(format, &config.node.log_level);

    match cli.config {
        Some(ref path) => tracing::info!("Loaded config from {}", path.display()),
        None => tracing::info!("No config given, using the development network"),
    }

    match cli.command {
        Command::ShowConfig => {
            print!("{}", config.node.to_toml_string()?);
        }
        Command::Run { requests } => {
            let batch = std::fs::read_to_string(&requests)
                .with_context(|| format!("reading {}", requests.display()))?;
            let batch: Vec<FlowRequest> = serde_json::from_str(&batch)
                .with_context(|| format!("parsing {}", requests.display()))?;

            let network = LocalNetwork::start(&config, Arc::new(SystemClock))?;
            tracing::info!(requests = batch.len(), "executing request batch");
            let mut failures = 0usize;
            for request in batch {
                let outcome = network.execute(request).await;
                if !outcome.is_success() {
                    failures += 1;
                }
                print_outcome(&outcome)?;
            }
            network.shutdown().await;
            tracing::info!(failures, "batch complete");
        }
        Command::Serve => {
            let network = LocalNetwork::start(&config, Arc::new(SystemClock))?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            tracing::info!("reading requests from stdin");

            loop {
                let line = tokio::select! {
                    _ = network.shutdown_controller().wait_for_signal() => break,
                    line = lines.next_line() => match line? {
                        Some(line) => line,
                        None => break,
                    },
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<FlowRequest>(&line) {
                    Ok(request) => print_outcome(&network.execute(request).await)?,
                    Err(e) => tracing::warn!(error = %e, "ignoring malformed request"),
                }
            }

            network.shutdown().await;
            tracing::info!("fungible daemon exited cleanly");
        }
    }

    Ok(())
}
