//! # Exchange Server
//!
//! This is a multithreaded TCP stock-exchange web server. Clients
//! submit one transaction per connection (`reset`, `create`, `buy`,
//! `sell`, `status`) and receive a plain-text outcome message. Buys
//! block until the stock's balance suffices.
//!
//! ## Command-line Options
//! - `--tcp-addr` / `-t`: TCP listen address (default `127.0.0.1:8080`).
//! - `--max-sessions` / `-m`: Bound on concurrent sessions; omit for unlimited.
//! - `--config` / `-c`: Optional seed file with `TICKER BALANCE` lines.
//! - `--log-level` / `-l`: Log level (`error`, `warn`, `info`, `debug`, `trace`).

use exchange_server::admission::AdmissionGate;
use exchange_server::errors::CliError;
use exchange_server::exchange::Exchange;
use exchange_server::tcp_server::TcpServer;
use std::sync::Arc;
use structopt::StructOpt;

/// Command-line options for the exchange server
#[derive(Debug, StructOpt)]
#[structopt(
    name = "exchange_server",
    about = "Multithreaded TCP stock exchange server"
)]
struct Opt {
    /// TCP listen address, e.g., 127.0.0.1:8080
    #[structopt(short, long, default_value = "127.0.0.1:8080")]
    tcp_addr: String,

    /// Maximum number of concurrently processed sessions (unlimited if omitted)
    #[structopt(short, long)]
    max_sessions: Option<usize>,

    /// Optional path to a seed file with one "TICKER BALANCE" pair per line
    #[structopt(short, long)]
    config: Option<String>,

    /// Log level: error, warn, info, debug, trace
    #[structopt(short, long, default_value = "info")]
    log_level: String,
}

/// Initializes the logger using env_logger with the given level
fn init_logger(level: &str) -> Result<(), CliError> {
    let mut builder = env_logger::Builder::new();

    let log_level = match level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    builder.filter_level(log_level);
    builder.format_timestamp_micros();
    builder.format_module_path(false);
    builder.format_target(false);
    builder.init();

    Ok(())
}

fn main() -> Result<(), CliError> {
    // Parse CLI arguments
    let opt = Opt::from_args();

    // Initialize logger
    init_logger(&opt.log_level)?;

    log::info!("Starting Exchange Server");
    log::debug!("Command line options: {:?}", opt);

    // Build the exchange, seeded from the config file when given
    let exchange = match &opt.config {
        Some(path) => Exchange::from_config(path)?,
        None => Exchange::new(),
    };
    let exchange = Arc::new(exchange);

    match opt.max_sessions {
        Some(limit) => log::info!("Admission limited to {} concurrent sessions", limit),
        None => log::info!("No session limit configured, admission is unbounded"),
    }
    let gate = Arc::new(AdmissionGate::new(opt.max_sessions));

    log::info!(
        "Exchange initialized successfully. Starting TCP server on {}",
        opt.tcp_addr
    );

    let tcp_server = TcpServer::new(&opt.tcp_addr, exchange, gate)?;

    log::info!("TCP server initialized. Waiting for client connections...");

    // Run server (blocking call)
    log::info!("Entering main server loop");
    tcp_server.start()?;

    log::info!("Server shutdown complete");
    Ok(())
}
