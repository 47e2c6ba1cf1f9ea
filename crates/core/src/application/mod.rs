// Application Layer - Runner, suite assembly and the elevated-process protocol

pub mod bridge;
pub mod constants;
pub mod ping;
pub mod runner;
pub mod suite;

// Re-exports
pub use ping::PingDiagnostic;
pub use runner::Runner;
pub use suite::DiagnosticSuite;
