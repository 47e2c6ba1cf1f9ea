// Application constants (no magic values)

/// Workers used when the caller does not choose a parallelism
pub const DEFAULT_PARALLELISM: usize = 4;

/// Type tag of the ping diagnostic
pub const PING_DIAGNOSTIC_TYPE: &str = "Ping";

/// Name of the standalone diagnostics executable
pub const EXECUTABLE_NAME: &str = "netdiag-diagnostics";

/// Exit codes of the diagnostics executable
pub mod exit_code {
    /// Report printed, no diagnostic failed
    pub const SUCCESS: i32 = 0;
    /// Diagnostics could not be run at all
    pub const FAILURE: i32 = 1;
    /// Argument parsing failed
    pub const USAGE: i32 = 2;
    /// Report printed, at least one diagnostic failed
    pub const REPORT_HAS_ERRORS: i32 = 3;
}
