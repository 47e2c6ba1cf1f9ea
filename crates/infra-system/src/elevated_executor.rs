// Elevated executor - runs the diagnostics executable in an elevated child
// reason: tokio for async process management, output captured in memory
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use netdiag_core::application::bridge::{accept_output, config_to_flags, ChildExit};
use netdiag_core::domain::Config;
use netdiag_core::port::{BridgeError, ChildOutput, ElevatedRunner};

use crate::binary_asset::BinaryAsset;
use crate::elevation::Elevation;
use crate::executable_file::ExecutableFile;

/// Runs the suite out of process with elevated privileges.
///
/// Owns the extracted executable: it is written on first use and reused by
/// every later call on this executor.
pub struct ElevatedExecutor {
    asset: BinaryAsset,
    executable: ExecutableFile,
    elevation: Elevation,
    installed: OnceCell<PathBuf>,
}

impl ElevatedExecutor {
    /// Create an executor for `asset`, extracting to the host-wide temp
    /// location (or the fallback) and elevating with the platform mechanism.
    ///
    /// # Example
    /// ```ignore
    /// let executor = ElevatedExecutor::new(BinaryAsset::discover());
    /// let report = executor.run(&config, "netdiag needs to send ICMP packets").await?;
    /// ```
    pub fn new(asset: BinaryAsset) -> Self {
        Self::with_parts(asset, ExecutableFile::new(), Elevation::platform_default())
    }

    pub fn with_parts(asset: BinaryAsset, executable: ExecutableFile, elevation: Elevation) -> Self {
        Self {
            asset,
            executable,
            elevation,
            installed: OnceCell::new(),
        }
    }

    pub fn executable_path(&self) -> &Path {
        self.executable.path()
    }

    /// Extract the asset once; later calls reuse the same file
    async fn installed_path(&self) -> Result<&PathBuf, BridgeError> {
        self.installed
            .get_or_try_init(|| async {
                let bytes = self.asset.load().await?;
                self.executable.install(&bytes).await
            })
            .await
    }

    /// Spawn the elevated child and drain both output streams
    async fn spawn_and_wait(
        &self,
        program: &Path,
        args: &[String],
        prompt: &str,
    ) -> Result<ChildOutput, BridgeError> {
        let mut command = self.elevation.command(program, args, prompt);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command
            .spawn()
            .map_err(|e| BridgeError::Launch(e.to_string()))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| BridgeError::Launch(e.to_string()))?;

        Ok(ChildOutput {
            code: output.status.code(),
            status: output.status.to_string(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[async_trait]
impl ElevatedRunner for ElevatedExecutor {
    async fn run_json(&self, config: &Config, prompt: &str) -> Result<Vec<u8>, BridgeError> {
        config
            .validate()
            .map_err(|e| BridgeError::InvalidConfig(e.to_string()))?;

        let args = config_to_flags(config);
        let program = self.installed_path().await?;

        info!(
            program = %program.display(),
            args = ?args,
            elevation = ?self.elevation,
            prompt = %prompt,
            "Starting elevated diagnostics"
        );

        let output = self.spawn_and_wait(program, &args, prompt).await?;
        let exit = ChildExit::from_code(output.code);

        if exit.yields_output() {
            info!(
                exit = ?exit,
                stdout_bytes = output.stdout.len(),
                "Elevated diagnostics completed"
            );
        } else {
            warn!(
                exit = ?exit,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Elevated diagnostics failed"
            );
        }

        accept_output(output)
    }
}
