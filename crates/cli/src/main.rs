//! netdiag CLI - run network diagnostics in-process or through the elevated
//! diagnostics executable

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::{info, warn};

use netdiag_core::application::bridge::config_to_flags;
use netdiag_core::application::constants::{exit_code, DEFAULT_PARALLELISM};
use netdiag_core::application::DiagnosticSuite;
use netdiag_core::domain::{Config, DiagnosticPayload, DiagnosticResult, Report};
use netdiag_core::port::ElevatedRunner;
use netdiag_infra_system::logging::init_stderr_logging;
use netdiag_infra_system::{BinaryAsset, ElevatedExecutor, IcmpPingProbe};

const DEFAULT_PROMPT: &str = "netdiag needs administrator privileges to send ICMP packets";

#[derive(Parser)]
#[command(name = "netdiag")]
#[command(about = "Network diagnostics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run diagnostics and print the report
    Run(RunArgs),

    /// Print the arguments the diagnostics executable would receive
    Flags(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Address to ping (repeatable)
    #[arg(long = "ping", value_name = "ADDRESS")]
    ping: Vec<String>,

    /// Echo requests per address
    #[arg(short = 'c', long, default_value = "1")]
    count: u32,

    /// JSON configuration file, e.g. {"ping":{"addresses":["8.8.8.8"],"count":3}}
    #[arg(long, value_name = "FILE", conflicts_with = "ping")]
    config: Option<String>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Concurrent diagnostics (in-process runs only)
    #[arg(short, long, env = "NETDIAG_PARALLELISM", default_value_t = DEFAULT_PARALLELISM)]
    parallelism: usize,

    /// Run through the elevated diagnostics executable
    #[arg(long)]
    elevated: bool,

    /// Text shown by the elevation prompt
    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Ping on platforms that need raw socket permissions (in-process runs only)
    #[arg(long)]
    force: bool,

    /// Print the JSON report instead of a table
    #[arg(long)]
    json: bool,

    /// Pretty-print the JSON report
    #[arg(long, requires = "json")]
    indent: bool,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Diagnostic")]
    diagnostic: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl ResultRow {
    fn from_result(index: usize, result: &DiagnosticResult) -> Self {
        let (target, detail) = match (result.result(), result.error()) {
            (Some(DiagnosticPayload::Ping(ping)), _) => {
                let detail = match &ping.statistics {
                    Some(stats) => format!(
                        "{}/{} received, {:.1}% loss, avg {:.2} ms ({})",
                        stats.packets_recv,
                        stats.packets_sent,
                        stats.packet_loss,
                        nanos_to_millis(stats.avg_rtt),
                        stats.ip_addr
                    ),
                    None => "no statistics".to_string(),
                };
                (ping.ping.address.clone(), detail)
            }
            (None, Some(error)) => (String::new(), error.to_string()),
            (None, None) => (String::new(), String::new()),
        };

        Self {
            index: index + 1,
            diagnostic: result.diagnostic().to_string(),
            target,
            status: if result.is_success() { "OK" } else { "FAILED" },
            detail,
        }
    }
}

fn nanos_to_millis(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000.0
}

/// Build the configuration from `--config` or from the ping flags
fn load_config(args: &ConfigArgs) -> Result<Config> {
    if let Some(path) = &args.config {
        let path = shellexpand::tilde(path).into_owned();
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read config file {}", path))?;
        return Config::from_json(&bytes).with_context(|| format!("Invalid config file {}", path));
    }

    let config = if args.ping.is_empty() {
        Config::default()
    } else {
        Config::with_ping(args.ping.clone(), args.count)
    };
    config.validate().context("Invalid ping flags")?;
    Ok(config)
}

async fn run(args: RunArgs) -> Result<Report> {
    let config = load_config(&args.config)?;

    if args.elevated {
        if args.force {
            warn!("--force has no effect with --elevated; the elevated child forces pings itself");
        }
        let executor = ElevatedExecutor::new(BinaryAsset::discover());
        info!(executable = %executor.executable_path().display(), "Running elevated");
        return executor
            .run(&config, &args.prompt)
            .await
            .context("Elevated diagnostics failed");
    }

    let suite = DiagnosticSuite::new(Arc::new(IcmpPingProbe::new()), args.parallelism)
        .with_force(args.force);
    Ok(suite.run(&config).await)
}

fn print_report(report: &Report) {
    if report.is_empty() {
        println!("{}", "No diagnostics were run".yellow());
        return;
    }

    let rows: Vec<ResultRow> = report
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| ResultRow::from_result(i, r))
        .collect();
    println!("{}", Table::new(rows));
    println!();

    let failed = report.results.iter().filter(|r| !r.is_success()).count();
    if report.has_errors() {
        println!(
            "{}",
            format!("✗ {} of {} diagnostics failed", failed, report.results.len())
                .red()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!("✓ All {} diagnostics passed", report.results.len())
                .green()
                .bold()
        );
    }
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run(args) => {
            let json = args.json;
            let indent = args.indent;
            let report = run(args).await?;

            if json {
                println!("{}", report.to_json(indent)?);
            } else {
                print_report(&report);
            }

            if report.has_errors() {
                Ok(ExitCode::from(exit_code::REPORT_HAS_ERRORS as u8))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }

        Commands::Flags(args) => {
            let config = load_config(&args)?;
            println!("{}", serde_json::to_string(&config_to_flags(&config))?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_stderr_logging();

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(exit_code::FAILURE as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdiag_core::domain::{DiagnosticError, Ping, PingResult, PingStatistics};
    use std::time::Duration;

    fn config_args(ping: &[&str], count: u32, config: Option<String>) -> ConfigArgs {
        ConfigArgs {
            ping: ping.iter().map(|s| s.to_string()).collect(),
            count,
            config,
        }
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "netdiag", "run", "--ping", "8.8.8.8", "--ping", "1.1.1.1", "-c", "3", "--json",
            "--indent",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config.ping, vec!["8.8.8.8", "1.1.1.1"]);
        assert_eq!(args.config.count, 3);
        assert!(args.json && args.indent);
        assert!(!args.elevated);
    }

    #[test]
    fn test_indent_requires_json() {
        assert!(Cli::try_parse_from(["netdiag", "run", "--ping", "8.8.8.8", "--indent"]).is_err());
    }

    #[test]
    fn test_config_conflicts_with_ping() {
        let result =
            Cli::try_parse_from(["netdiag", "run", "--ping", "8.8.8.8", "--config", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_flags() {
        let config = load_config(&config_args(&["8.8.8.8"], 2, None)).unwrap();
        assert_eq!(config, Config::with_ping(vec!["8.8.8.8".to_string()], 2));

        let config = load_config(&config_args(&[], 2, None)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_rejects_comma_in_address() {
        assert!(load_config(&config_args(&["8.8.8.8,1.1.1.1"], 1, None)).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netdiag.json");
        std::fs::write(&path, r#"{"ping":{"addresses":["9.9.9.9"],"count":4}}"#).unwrap();

        let config =
            load_config(&config_args(&[], 1, Some(path.display().to_string()))).unwrap();

        assert_eq!(config, Config::with_ping(vec!["9.9.9.9".to_string()], 4));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(&config_args(&[], 1, Some("/nonexistent/netdiag.json".to_string())))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_row_for_ping_statistics() {
        let stats = PingStatistics::from_rtts(
            "8.8.8.8",
            "8.8.8.8",
            2,
            &[Duration::from_millis(10), Duration::from_millis(20)],
        );
        let result = DiagnosticResult::success(
            "Ping",
            DiagnosticPayload::Ping(PingResult {
                ping: Ping::new("8.8.8.8").with_count(2),
                statistics: Some(stats),
            }),
        );

        let row = ResultRow::from_result(0, &result);

        assert_eq!(row.index, 1);
        assert_eq!(row.target, "8.8.8.8");
        assert_eq!(row.status, "OK");
        assert_eq!(row.detail, "2/2 received, 0.0% loss, avg 15.00 ms (8.8.8.8)");
    }

    #[test]
    fn test_row_for_failure() {
        let result = DiagnosticResult::failure("Ping", &DiagnosticError::UnsupportedPlatform);

        let row = ResultRow::from_result(1, &result);

        assert_eq!(row.status, "FAILED");
        assert_eq!(row.detail, "ping report is currently only supported on windows");
    }
}
