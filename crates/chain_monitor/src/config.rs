use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_DATA_FILE: &str = "blockData.json";
pub const DEFAULT_INTERVAL_MS: u64 = 15_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "chain_monitor")]
#[command(about = "Records block headers and transaction hashes from a JSON-RPC node", long_about = None)]
pub struct Args {
    /// JSON-RPC endpoint of the node to follow
    #[arg(long, env = "CHAIN_MONITOR_RPC_URL")]
    pub rpc_url: String,

    /// File holding the recorded blocks
    #[arg(long, env = "CHAIN_MONITOR_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Delay between polls, in milliseconds
    #[arg(long, env = "CHAIN_MONITOR_INTERVAL_MS", default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Per-request timeout for node calls, in seconds
    #[arg(long, env = "CHAIN_MONITOR_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Skip the start-up banner
    #[arg(long)]
    pub no_banner: bool,
}

/// Runtime settings for the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub rpc_url: String,
    pub data_file: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl From<Args> for MonitorConfig {
    fn from(args: Args) -> Self {
        MonitorConfig {
            rpc_url: args.rpc_url,
            data_file: args.data_file,
            poll_interval: Duration::from_millis(args.interval_ms),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        }
    }
}
