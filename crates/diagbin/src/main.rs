//! netdiag-diagnostics - runs the diagnostic suite and prints one JSON report
//!
//! Invoked by the elevated bridge with Go-style flags:
//!
//! ```text
//! netdiag-diagnostics -ping-addresses 8.8.8.8,1.1.1.1 -ping-count 3 [-indent]
//! ```
//!
//! Stdout carries the report only; logs go to stderr. Exit codes: 0 clean,
//! 2 bad arguments, 3 report has errors, 1 anything else.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use netdiag_core::application::bridge::{config_from_flags, normalize_flag_args};
use netdiag_core::application::constants::exit_code;
use netdiag_core::application::DiagnosticSuite;
use netdiag_infra_system::logging::init_stderr_logging;
use netdiag_infra_system::IcmpPingProbe;

/// "1" forces ping on any platform, "0" never forces; unset means force when
/// running as root
const FORCE_PING_ENV: &str = "NETDIAG_FORCE_PING";

#[derive(Parser, Debug)]
#[command(name = "netdiag-diagnostics")]
#[command(about = "Run network diagnostics and print the report as JSON", long_about = None)]
#[command(version)]
struct Args {
    /// Comma-separated addresses to ping
    #[arg(long = "ping-addresses", default_value = "")]
    ping_addresses: String,

    /// Echo requests per address
    #[arg(long = "ping-count", default_value_t = 1)]
    ping_count: u32,

    /// Pretty-print the report
    #[arg(long)]
    indent: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse errors exit 2 here, before anything is printed to stdout
    let args = Args::parse_from(normalize_flag_args(std::env::args_os()));

    init_stderr_logging();

    match run(args).await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Diagnostics failed");
            ExitCode::from(exit_code::FAILURE as u8)
        }
    }
}

async fn run(args: Args) -> Result<i32> {
    let config = config_from_flags(&args.ping_addresses, args.ping_count);
    let force = force_ping();

    info!(
        ping_addresses = %args.ping_addresses,
        ping_count = args.ping_count,
        force = force,
        "netdiag-diagnostics v{} starting",
        netdiag_core::VERSION
    );

    let suite =
        DiagnosticSuite::with_default_parallelism(Arc::new(IcmpPingProbe::new())).with_force(force);
    let report = suite.run(&config).await;

    let json = report
        .to_json(args.indent)
        .context("Failed to serialize report")?;
    println!("{}", json);

    if report.has_errors() {
        Ok(exit_code::REPORT_HAS_ERRORS)
    } else {
        Ok(exit_code::SUCCESS)
    }
}

fn force_ping() -> bool {
    match std::env::var(FORCE_PING_ENV).as_deref() {
        Ok("1") => true,
        Ok("0") => false,
        _ => running_as_root(),
    }
}

#[cfg(unix)]
fn running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}
