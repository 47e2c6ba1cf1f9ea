// Domain Layer - Report model, configuration and the error-presence scan

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod fallible;
pub mod ping;
pub mod report;

// Re-exports
pub use config::{Config, PingConfig};
pub use diagnostic::{DiagnosticPayload, DiagnosticResult};
pub use error::DiagnosticError;
pub use fallible::Fallible;
pub use ping::{Ping, PingResult, PingStatistics};
pub use report::Report;
