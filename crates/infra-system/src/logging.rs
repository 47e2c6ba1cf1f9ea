// Logging setup shared by the netdiag binaries
// reason: tracing-subscriber with EnvFilter, stderr only so stdout stays machine-readable
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format
pub const LOG_FORMAT_ENV: &str = "NETDIAG_LOG_FORMAT";

/// Filter used when RUST_LOG is unset or invalid
pub const DEFAULT_FILTER: &str = "netdiag=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON lines
    Json,
    /// Human-readable
    Pretty,
}

impl LogFormat {
    /// `json` selects JSON; anything else, or unset, is pretty
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to stderr.
///
/// Call once, at the start of `main`.
pub fn init_stderr_logging() {
    match LogFormat::from_env() {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
