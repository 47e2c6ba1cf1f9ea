// Executable file - the on-disk copy of the diagnostics binary
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

use netdiag_core::application::constants::EXECUTABLE_NAME;
use netdiag_core::port::BridgeError;

/// Permission bits of the extracted executable (owner rwx, others r)
#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o744;

/// Distinguishes staging files of concurrent installs within one process
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Location the diagnostics binary is extracted to.
///
/// The path is decided once, at construction: `<temp dir>/netdiag-diagnostics`
/// when the temp directory is usable, otherwise a fixed fallback location.
/// Every executor on the host shares that path, so `install` is idempotent
/// and safe to race with other processes.
#[derive(Debug, Clone)]
pub struct ExecutableFile {
    path: PathBuf,
}

impl ExecutableFile {
    /// Use the shared temp-dir location, falling back to `default_path` if the
    /// temp directory is unusable.
    pub fn new() -> Self {
        let temp_dir = std::env::temp_dir();
        if temp_dir.is_dir() {
            return Self::in_dir(&temp_dir);
        }

        let path = Self::default_path();
        warn!(
            temp_dir = %temp_dir.display(),
            fallback = %path.display(),
            "Temp directory unusable for diagnostics executable, using fallback"
        );
        Self { path }
    }

    /// Use a fixed path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/netdiag-diagnostics`
    pub fn in_dir(dir: &Path) -> Self {
        Self::at(dir.join(file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<user cache dir>/netdiag-diagnostics`, or the bare name in the working
    /// directory when there is no cache dir
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("org", "netdiag", "netdiag") {
            return dirs.cache_dir().join(file_name());
        }
        std::env::current_dir()
            .map(|dir| dir.join(file_name()))
            .unwrap_or_else(|_| PathBuf::from(file_name()))
    }

    /// Write `bytes` to the path with executable permission bits.
    ///
    /// Skips the write when the file already holds `bytes`. Writes go to a
    /// staging file renamed into place, so a concurrent writer never sees a
    /// half-written executable; losing that race to identical bytes is fine.
    pub async fn install(&self, bytes: &[u8]) -> Result<PathBuf, BridgeError> {
        if self.holds(bytes).await {
            debug!(path = %self.path.display(), "Diagnostics executable already extracted");
            set_executable(&self.path).await?;
            return Ok(self.path.clone());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(extraction_error)?;
        }

        let staging = self.staging_path();
        fs::write(&staging, bytes).await.map_err(extraction_error)?;
        set_executable(&staging).await?;

        if let Err(e) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            if self.holds(bytes).await {
                debug!(path = %self.path.display(), "Executable extracted concurrently");
                return Ok(self.path.clone());
            }
            return Err(extraction_error(e));
        }

        info!(
            path = %self.path.display(),
            size = bytes.len(),
            "Diagnostics executable extracted"
        );
        Ok(self.path.clone())
    }

    async fn holds(&self, bytes: &[u8]) -> bool {
        match fs::read(&self.path).await {
            Ok(existing) => existing == bytes,
            Err(_) => false,
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| EXECUTABLE_NAME.into());
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        name.push(format!(".{}.{}.partial", std::process::id(), seq));
        self.path.with_file_name(name)
    }
}

impl Default for ExecutableFile {
    fn default() -> Self {
        Self::new()
    }
}

fn file_name() -> String {
    format!("{}{}", EXECUTABLE_NAME, std::env::consts::EXE_SUFFIX)
}

fn extraction_error(e: std::io::Error) -> BridgeError {
    BridgeError::Extraction(e.to_string())
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<(), BridgeError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(EXECUTABLE_MODE))
        .await
        .map_err(extraction_error)
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<(), BridgeError> {
    Ok(())
}
