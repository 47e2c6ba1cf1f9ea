// Elevated Runner Port
// Runs the suite in a privilege-elevated child process and returns its report

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Config, Report};

/// Captured output of a finished child process
#[derive(Debug, Clone, Default)]
pub struct ChildOutput {
    /// Exit code, None if the process was killed by a signal
    pub code: Option<i32>,
    /// Human-readable exit status (e.g. "exit status: 1")
    pub status: String,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Bridge errors: no trustworthy report could be produced
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not find asset: {0}")]
    AssetNotFound(String),

    #[error("failed to create executable from asset: {0}")]
    Extraction(String),

    #[error("failed to launch executable: {0}")]
    Launch(String),

    #[error("failed to run executable: {status}{}", stderr_suffix(.stderr))]
    ChildFailed {
        status: String,
        stderr: Option<String>,
    },

    #[error("failed to unmarshal report: {0}")]
    Decode(#[from] serde_json::Error),
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    stderr
        .as_deref()
        .map(|s| format!(": {}", s))
        .unwrap_or_default()
}

/// Elevated runner port
///
/// Implementations:
/// - ElevatedExecutor (infra-system): embedded binary + platform elevation
#[async_trait]
pub trait ElevatedRunner: Send + Sync {
    /// Run the suite for `config` in an elevated child and return the raw
    /// report document it printed.
    ///
    /// # Arguments
    /// * `config` - Families to run, translated into child arguments
    /// * `prompt` - Text shown by the elevation prompt where the platform supports it
    async fn run_json(&self, config: &Config, prompt: &str) -> Result<Vec<u8>, BridgeError>;

    /// Like `run_json`, decoded into a `Report`.
    ///
    /// # Errors
    /// - BridgeError::Decode if the child printed something that is not a report
    async fn run(&self, config: &Config, prompt: &str) -> Result<Report, BridgeError> {
        let bytes = self.run_json(config, prompt).await?;
        Ok(Report::from_json(&bytes)?)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock ElevatedRunner that replays canned stdout
    pub struct MockElevatedRunner {
        stdout: Vec<u8>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockElevatedRunner {
        pub fn new(stdout: impl Into<Vec<u8>>) -> Self {
            Self {
                stdout: stdout.into(),
                prompts: Mutex::new(Vec::new()),
            }
        }
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ElevatedRunner for MockElevatedRunner {
        async fn run_json(&self, _config: &Config, prompt: &str) -> Result<Vec<u8>, BridgeError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.stdout.clone())
        }
    }
}
