use chain_monitor::config::{Args, MonitorConfig};
use chain_monitor::{Monitor, net::rpc::RpcClient, store::file::JsonFileStore};
use clap::Parser;
use colored::*;
use figlet_rs::FIGfont;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn print_banner() {
    let rule = "═══════════════════════════════════════════════════════════════════════════════";
    println!("{}", rule.bright_magenta());
    if let Ok(font) = FIGfont::standard()
        && let Some(figure) = font.convert("Chain Monitor")
    {
        println!("{}", figure.to_string().bright_cyan().bold());
    }
    println!("{}", rule.bright_magenta());
    println!("{}", "Block headers and transaction hashes, one poll at a time".bright_yellow());
    println!("{}", rule.bright_magenta());
    println!();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if !args.no_banner {
        print_banner();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = MonitorConfig::from(args);
    let client = RpcClient::with_timeout(&config.rpc_url, config.request_timeout)?;
    let store = JsonFileStore::new(&config.data_file)?;
    info!(path = %config.data_file.display(), "Using block data file");

    let mut monitor = match Monitor::initialize(client, store, config.poll_interval).await {
        Ok(monitor) => monitor,
        Err(e) if e.is_fatal() => {
            error!(error = %e, path = %config.data_file.display(), "Saved block data is corrupt, refusing to start");
            return Err(e.into());
        }
        Err(e) => {
            error!(error = %e, "Initialization failed");
            return Err(e.into());
        }
    };

    // `run` only returns by being cancelled here.
    tokio::select! {
        _ = monitor.run() => {}
        res = tokio::signal::ctrl_c() => res?,
    }
    warn!(cursor = monitor.cursor(), "Interrupted, stopping");

    Ok(())
}
