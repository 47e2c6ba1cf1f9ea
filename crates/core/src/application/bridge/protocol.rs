// Exit-code taxonomy and output handling of the diagnostics executable

use std::ffi::OsString;
use tracing::warn;

use super::flags::KNOWN_FLAGS;
use crate::application::constants::exit_code;
use crate::port::{BridgeError, ChildOutput};

/// How the diagnostics executable terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Exit 0: report printed, no diagnostic failed
    Clean,
    /// Exit 2: the child rejected its arguments. Whatever it printed is still
    /// returned; this code means nothing else.
    UsageError,
    /// Exit 3: report printed, at least one diagnostic failed. Not a hard
    /// failure: the report is returned and `Report::has_errors` carries the
    /// failures. 2 and 3 are the only non-zero codes that yield output.
    ReportWithErrors,
    /// Any other code, or killed by a signal (None)
    Failed(Option<i32>),
}

impl ChildExit {
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(exit_code::SUCCESS) => ChildExit::Clean,
            Some(exit_code::USAGE) => ChildExit::UsageError,
            Some(exit_code::REPORT_HAS_ERRORS) => ChildExit::ReportWithErrors,
            other => ChildExit::Failed(other),
        }
    }

    /// Whether stdout should be handed back to the caller
    pub fn yields_output(&self) -> bool {
        !matches!(self, ChildExit::Failed(_))
    }

    /// Exit code the executable uses for this outcome
    pub fn code(&self) -> Option<i32> {
        match self {
            ChildExit::Clean => Some(exit_code::SUCCESS),
            ChildExit::UsageError => Some(exit_code::USAGE),
            ChildExit::ReportWithErrors => Some(exit_code::REPORT_HAS_ERRORS),
            ChildExit::Failed(code) => *code,
        }
    }
}

/// Interpret a finished child: return its stdout, or the error that explains
/// why there is no report. Stderr is surfaced verbatim when non-empty.
pub fn accept_output(output: ChildOutput) -> Result<Vec<u8>, BridgeError> {
    match ChildExit::from_code(output.code) {
        ChildExit::Failed(_) => {
            let stderr = if output.stderr.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&output.stderr).into_owned())
            };
            Err(BridgeError::ChildFailed {
                status: output.status,
                stderr,
            })
        }
        ChildExit::UsageError => {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Diagnostics executable rejected its arguments"
            );
            Ok(output.stdout)
        }
        ChildExit::Clean | ChildExit::ReportWithErrors => Ok(output.stdout),
    }
}

/// Rewrite single-dash long flags (`-ping-count`) to the double-dash form
/// (`--ping-count`), so Go-style and GNU-style invocations parse the same.
///
/// Only flags in `KNOWN_FLAGS` are touched, with or without an `=value`
/// suffix; values and unknown arguments pass through unchanged.
pub fn normalize_flag_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some(s) if is_single_dash_known_flag(s) => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

fn is_single_dash_known_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split('=').next().unwrap_or(rest);
    KNOWN_FLAGS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(code: Option<i32>, stdout: &str, stderr: &str) -> ChildOutput {
        ChildOutput {
            code,
            status: match code {
                Some(c) => format!("exit status: {}", c),
                None => "signal: 9 (SIGKILL)".to_string(),
            },
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_exit_taxonomy() {
        assert_eq!(ChildExit::from_code(Some(0)), ChildExit::Clean);
        assert_eq!(ChildExit::from_code(Some(2)), ChildExit::UsageError);
        assert_eq!(ChildExit::from_code(Some(3)), ChildExit::ReportWithErrors);
        assert_eq!(ChildExit::from_code(Some(1)), ChildExit::Failed(Some(1)));
        assert_eq!(ChildExit::from_code(Some(126)), ChildExit::Failed(Some(126)));
        assert_eq!(ChildExit::from_code(None), ChildExit::Failed(None));

        assert!(ChildExit::Clean.yields_output());
        assert!(ChildExit::UsageError.yields_output());
        assert!(ChildExit::ReportWithErrors.yields_output());
        assert!(!ChildExit::Failed(Some(1)).yields_output());
        assert_eq!(ChildExit::ReportWithErrors.code(), Some(3));
    }

    #[test]
    fn test_accept_clean_and_boundary_codes() {
        for code in [0, 2, 3] {
            let stdout = accept_output(output(Some(code), "{\"Results\":[]}\n", "log line")).unwrap();
            assert_eq!(stdout, b"{\"Results\":[]}\n");
        }
    }

    #[test]
    fn test_report_with_errors_is_not_a_hard_failure() {
        let report = r#"{"Results":[{"Diagnostic":"Ping","Error":"ping missing address"}]}"#;

        let stdout = accept_output(output(Some(3), report, "")).unwrap();

        assert_eq!(stdout, report.as_bytes());
        assert!(matches!(
            accept_output(output(Some(4), report, "")),
            Err(BridgeError::ChildFailed { .. })
        ));
    }

    #[test]
    fn test_failure_with_stderr() {
        let err = accept_output(output(Some(1), "", "failed to marshal report")).unwrap_err();
        match err {
            BridgeError::ChildFailed { status, stderr } => {
                assert_eq!(status, "exit status: 1");
                assert_eq!(stderr.as_deref(), Some("failed to marshal report"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_failure_without_stderr() {
        let err = accept_output(output(None, "partial", "")).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::ChildFailed { stderr: None, .. }
        ));
        assert_eq!(
            err.to_string(),
            "failed to run executable: signal: 9 (SIGKILL)"
        );
    }

    #[test]
    fn test_normalize_flag_args() {
        let args = ["netdiag-diagnostics", "-ping-addresses", "-1", "-ping-count=2", "--indent", "-x", "-indent"]
            .map(OsString::from);

        let normalized = normalize_flag_args(args);

        assert_eq!(
            normalized,
            ["netdiag-diagnostics", "--ping-addresses", "-1", "--ping-count=2", "--indent", "-x", "--indent"]
                .map(OsString::from)
                .to_vec()
        );
    }
}
