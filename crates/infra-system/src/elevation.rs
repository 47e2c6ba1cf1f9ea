// Elevation - how the diagnostics executable gets elevated privileges
use std::path::Path;
use tokio::process::Command;

use netdiag_core::application::constants::exit_code;

/// Platform mechanism used to start the child with elevated privileges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Run the executable as-is, no prompt
    Direct,
    /// polkit's `pkexec`. Polkit renders its own dialog; the prompt text is
    /// not shown.
    Pkexec,
    /// `osascript` with `do shell script ... with administrator privileges`
    AppleScript,
}

impl Elevation {
    /// Windows needs no elevation for ICMP, macOS prompts through
    /// AppleScript, other Unix systems through pkexec.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Elevation::Direct
        } else if cfg!(target_os = "macos") {
            Elevation::AppleScript
        } else {
            Elevation::Pkexec
        }
    }

    /// Build the command that runs `program` with `args` under this mechanism
    pub fn command(&self, program: &Path, args: &[String], prompt: &str) -> Command {
        match self {
            Elevation::Direct => {
                let mut command = Command::new(program);
                command.args(args);
                command
            }
            Elevation::Pkexec => {
                let mut command = Command::new("pkexec");
                command.arg(program).args(args);
                command
            }
            Elevation::AppleScript => {
                let mut command = Command::new("osascript");
                command.arg("-e").arg(apple_script(program, args, prompt));
                command
            }
        }
    }
}

/// `do shell script` turns any non-zero exit into a generic AppleScript error
/// and drops stdout, so exit codes that still carry a report are mapped to 0
/// inside the shell.
fn apple_script(program: &Path, args: &[String], prompt: &str) -> String {
    let mut shell = shell_quote(&program.to_string_lossy());
    for arg in args {
        shell.push(' ');
        shell.push_str(&shell_quote(arg));
    }
    shell.push_str(&format!(
        "; rc=$?; if [ $rc -eq {} ] || [ $rc -eq {} ]; then exit 0; fi; exit $rc",
        exit_code::USAGE,
        exit_code::REPORT_HAS_ERRORS
    ));

    format!(
        "do shell script {} with prompt {} with administrator privileges",
        apple_script_string(&shell),
        apple_script_string(prompt)
    )
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn apple_script_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', r"\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> Vec<String> {
        vec!["-ping-addresses".to_string(), "8.8.8.8".to_string()]
    }

    #[test]
    fn test_direct_runs_program() {
        let command = Elevation::Direct.command(&PathBuf::from("/tmp/diag"), &args(), "prompt");
        let std = command.as_std();
        assert_eq!(std.get_program(), "/tmp/diag");
        assert_eq!(
            std.get_args().collect::<Vec<_>>(),
            vec!["-ping-addresses", "8.8.8.8"]
        );
    }

    #[test]
    fn test_pkexec_wraps_program() {
        let command = Elevation::Pkexec.command(&PathBuf::from("/tmp/diag"), &args(), "prompt");
        let std = command.as_std();
        assert_eq!(std.get_program(), "pkexec");
        assert_eq!(
            std.get_args().collect::<Vec<_>>(),
            vec!["/tmp/diag", "-ping-addresses", "8.8.8.8"]
        );
    }

    #[test]
    fn test_apple_script_quoting() {
        let script = apple_script(
            &PathBuf::from("/tmp/it's diag"),
            &args(),
            "Netdiag needs \"admin\" rights",
        );

        assert_eq!(
            script,
            concat!(
                r#"do shell script "'/tmp/it'\\''s diag' '-ping-addresses' '8.8.8.8'; "#,
                r#"rc=$?; if [ $rc -eq 2 ] || [ $rc -eq 3 ]; then exit 0; fi; exit $rc" "#,
                r#"with prompt "Netdiag needs \"admin\" rights" with administrator privileges"#
            )
        );
    }

    #[test]
    fn test_platform_default() {
        let elevation = Elevation::platform_default();
        if cfg!(windows) {
            assert_eq!(elevation, Elevation::Direct);
        } else {
            assert_ne!(elevation, Elevation::Direct);
        }
    }
}
