//! Reservoir Telemetry Service - Main Daemon
//!
//! A server-side daemon that continuously:
//! 1. Polls the reservoir, alarm-station and rainfall feeds in parallel
//! 2. Normalizes them into one snapshot, or serves the fallback snapshot
//!    when any feed fails
//! 3. Exposes the latest snapshot and a manual refresh over HTTP
//!
//! Usage:
//!   cargo run --release                          # Poll loop only
//!   cargo run --release -- --endpoint 8080       # Poll loop + HTTP endpoint
//!   cargo run --release -- --once                # One cycle, print snapshot JSON
//!
//! Environment:
//!   RESMON_CONFIG - path to the TOML configuration (default: reservoir.toml)
//!   RUST_LOG      - log filter (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use resmon_service::config::{self, DEFAULT_CONFIG_PATH};
use resmon_service::daemon::Daemon;
use resmon_service::endpoint::{self, build_snapshot_response};
use resmon_service::logging::{self, LogFormat};
use resmon_service::scheduler::PollTrigger;

// ---------------------------------------------------------------------------
// CLI Arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "resmon")]
#[command(about = "Reservoir telemetry acquisition service")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML configuration file
    #[arg(long, env = "RESMON_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Serve the HTTP endpoint on this port
    #[arg(long, value_name = "PORT")]
    endpoint: Option<u16>,

    /// Run a single cycle, print the snapshot as JSON and exit
    #[arg(long)]
    once: bool,

    /// Log output format: text or json
    #[arg(long, default_value = "text")]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    logging::init_logging(args.log_format);

    let monitor = config::load_config(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;
    info!(
        config = %args.config,
        origin = %monitor.dashboard.origin,
        "configuration loaded"
    );

    let daemon = Daemon::new(monitor).context("building feed clients")?;

    if args.once {
        let scheduler = daemon.scheduler();
        if let PollTrigger::Ran(snapshot) = scheduler.refresh() {
            let body = build_snapshot_response(&snapshot, scheduler.last_failure());
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        return Ok(());
    }

    if let Some(port) = args.endpoint {
        let scheduler = daemon.scheduler();
        std::thread::Builder::new()
            .name("http-endpoint".to_string())
            .spawn(move || {
                if let Err(e) = endpoint::start_endpoint_server(port, scheduler) {
                    error!(port, "endpoint server stopped: {}", e);
                }
            })
            .context("spawning endpoint thread")?;
    }

    daemon.run()
}
