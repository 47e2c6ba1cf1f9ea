// Elevated-process protocol shared by the bridge and the diagnostics executable
//
// Request: an argument vector (flags). Response: one report document on
// stdout plus an exit code from a fixed taxonomy (protocol).

pub mod flags;
pub mod protocol;

pub use flags::{config_from_flags, config_to_flags};
pub use protocol::{accept_output, normalize_flag_args, ChildExit};
