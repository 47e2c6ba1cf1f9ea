// Port Layer - Interfaces for external dependencies

pub mod diagnostic;
pub mod elevated_runner;
pub mod ping_probe;

// Re-exports
pub use diagnostic::Diagnostic;
pub use elevated_runner::{BridgeError, ChildOutput, ElevatedRunner};
pub use ping_probe::{PingProbe, ProbeError};
