// netdiag Infrastructure - System Adapters
// Implements: PingProbe (ICMP), ElevatedRunner (extracted executable + elevation),
// plus the stderr logging setup used by the binaries

pub mod binary_asset;
pub mod elevated_executor;
pub mod elevation;
pub mod executable_file;
pub mod icmp_ping_probe;
pub mod logging;

pub use binary_asset::{BinaryAsset, DIAGNOSTICS_BIN_ENV};
pub use elevated_executor::ElevatedExecutor;
pub use elevation::Elevation;
pub use executable_file::ExecutableFile;
pub use icmp_ping_probe::IcmpPingProbe;
