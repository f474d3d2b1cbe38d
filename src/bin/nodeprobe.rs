//! `nodeprobe` CLI binary.
//!
//! ```text
//! nodeprobe check
//! nodeprobe check --rpc-url http://localhost:8545 --fallback https://rpc.example.org --json
//! nodeprobe check --watch --count 10
//! nodeprobe validate --config nodeprobe.yaml
//! nodeprobe endpoints
//! ```

use clap::{Parser, Subcommand};
use nodeprobe::console::commands::{
    CallableTrait, CheckCommand, EndpointsCommand, ValidateCommand,
};
use nodeprobe::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(
    name = "nodeprobe",
    version,
    about = "Health-check an Ethereum JSON-RPC node",
    long_about = "nodeprobe: connectivity probe and config validation for Ethereum nodes\n\n\
        Queries listening status, network id, latest block, sync status, client\n\
        version and peer count from the configured RPC endpoint, falling back to\n\
        the next endpoint when one is unreachable."
)]
struct Cli {
    /// Path to a config file (default: ./nodeprobe.{yaml,toml,json} if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: NodeProbeCommands,
}

#[derive(Debug, Subcommand)]
enum NodeProbeCommands {
    /// Probe the node and print its status
    Check {
        /// Primary RPC URL (overrides ETHEREUM_RPC_URL)
        #[arg(long, value_name = "URL")]
        rpc_url: Option<String>,
        /// Fallback RPC URL, tried in order (repeatable)
        #[arg(long = "fallback", value_name = "URL")]
        fallbacks: Vec<String>,
        /// Per-request timeout in milliseconds (overrides MONITOR_TIMEOUT)
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Re-probe every monitoring interval until Ctrl-C
        #[arg(long)]
        watch: bool,
        /// Stop watching after N probes
        #[arg(long, value_name = "N", requires = "watch")]
        count: Option<usize>,
    },
    /// Validate the endpoint configuration without contacting the node
    Validate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the configured endpoint chain
    Endpoints,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = get_subscriber("nodeprobe".into(), "warn".into());
    init_subscriber(subscriber)?;

    let cli = Cli::parse();
    let command = get_command(cli);
    if let Err(err) = command.call() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
    Ok(())
}

fn get_command(cli: Cli) -> Box<dyn CallableTrait> {
    match cli.command {
        NodeProbeCommands::Check {
            rpc_url,
            fallbacks,
            timeout_ms,
            json,
            watch,
            count,
        } => Box::new(
            CheckCommand::new(cli.config, json, watch)
                .with_overrides(rpc_url, fallbacks, timeout_ms)
                .with_count(count),
        ),
        NodeProbeCommands::Validate { json } => Box::new(ValidateCommand::new(cli.config, json)),
        NodeProbeCommands::Endpoints => Box::new(EndpointsCommand::new(cli.config)),
    }
}
