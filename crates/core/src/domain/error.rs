// Domain Error Types

use thiserror::Error;

/// Why a single diagnostic could not complete.
///
/// These never abort a run: the runner stringifies them into the
/// diagnostic's result slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticError {
    #[error("ping missing address")]
    MissingAddress,

    #[error("ping report is currently only supported on windows")]
    UnsupportedPlatform,

    #[error("{0}")]
    Probe(String),

    #[error("diagnostic panicked: {0}")]
    Panicked(String),
}
