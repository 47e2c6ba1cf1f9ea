// Binary asset - where the pre-built diagnostics executable comes from
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::debug;

use netdiag_core::application::constants::EXECUTABLE_NAME;
use netdiag_core::port::BridgeError;

/// Environment variable naming a pre-built diagnostics binary on disk
pub const DIAGNOSTICS_BIN_ENV: &str = "NETDIAG_DIAGNOSTICS_BIN";

/// Source of the diagnostics executable's bytes
#[derive(Debug, Clone)]
pub enum BinaryAsset {
    /// Compiled into this library for the target platform
    /// (`embedded-binary` feature)
    Embedded,
    /// Pre-built binary read from disk at extraction time
    File(PathBuf),
    /// In-memory bytes
    Bytes(Vec<u8>),
}

impl BinaryAsset {
    /// Pick the first available source: `NETDIAG_DIAGNOSTICS_BIN`, the
    /// embedded binary, then a `netdiag-diagnostics` next to the running
    /// executable. Falls back to `Embedded`, which then reports the asset as
    /// missing.
    pub fn discover() -> Self {
        if let Some(path) = std::env::var_os(DIAGNOSTICS_BIN_ENV) {
            debug!(path = ?path, "Using diagnostics binary from environment");
            return BinaryAsset::File(PathBuf::from(path));
        }
        if embedded_bytes().is_some() {
            return BinaryAsset::Embedded;
        }
        if let Some(sibling) = sibling_executable() {
            debug!(path = %sibling.display(), "Using diagnostics binary next to current executable");
            return BinaryAsset::File(sibling);
        }
        BinaryAsset::Embedded
    }

    pub async fn load(&self) -> Result<Cow<'_, [u8]>, BridgeError> {
        match self {
            BinaryAsset::Embedded => embedded_bytes().map(Cow::Borrowed).ok_or_else(|| {
                BridgeError::AssetNotFound(format!(
                    "no diagnostics binary embedded for {}",
                    PLATFORM_ASSET.unwrap_or(std::env::consts::OS)
                ))
            }),
            BinaryAsset::File(path) => tokio::fs::read(path)
                .await
                .map(Cow::Owned)
                .map_err(|e| BridgeError::AssetNotFound(format!("{}: {}", path.display(), e))),
            BinaryAsset::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }
}

fn sibling_executable() -> Option<PathBuf> {
    let current = std::env::current_exe().ok()?;
    let sibling =
        current.with_file_name(format!("{}{}", EXECUTABLE_NAME, std::env::consts::EXE_SUFFIX));
    (sibling.is_file() && sibling != current).then_some(sibling)
}

/// Per-platform asset file name under `NETDIAG_ASSET_DIR`
#[cfg(target_os = "macos")]
const PLATFORM_ASSET: Option<&str> = Some("darwin");
#[cfg(all(target_os = "linux", target_arch = "x86"))]
const PLATFORM_ASSET: Option<&str> = Some("linux_386");
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
const PLATFORM_ASSET: Option<&str> = Some("linux_amd64");
#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
const PLATFORM_ASSET: Option<&str> = Some("linux_arm64");
#[cfg(target_os = "windows")]
const PLATFORM_ASSET: Option<&str> = Some("windows.exe");
#[cfg(not(any(
    target_os = "macos",
    target_os = "windows",
    all(
        target_os = "linux",
        any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")
    )
)))]
const PLATFORM_ASSET: Option<&str> = None;

#[cfg(feature = "embedded-binary")]
macro_rules! embed {
    ($name:literal) => {
        Some(include_bytes!(concat!(env!("NETDIAG_ASSET_DIR"), "/", $name)) as &'static [u8])
    };
}

#[cfg(all(feature = "embedded-binary", target_os = "macos"))]
fn embedded_bytes() -> Option<&'static [u8]> {
    embed!("darwin")
}

#[cfg(all(feature = "embedded-binary", target_os = "linux", target_arch = "x86"))]
fn embedded_bytes() -> Option<&'static [u8]> {
    embed!("linux_386")
}

#[cfg(all(feature = "embedded-binary", target_os = "linux", target_arch = "x86_64"))]
fn embedded_bytes() -> Option<&'static [u8]> {
    embed!("linux_amd64")
}

#[cfg(all(feature = "embedded-binary", target_os = "linux", target_arch = "aarch64"))]
fn embedded_bytes() -> Option<&'static [u8]> {
    embed!("linux_arm64")
}

#[cfg(all(feature = "embedded-binary", target_os = "windows"))]
fn embedded_bytes() -> Option<&'static [u8]> {
    embed!("windows.exe")
}

#[cfg(not(all(
    feature = "embedded-binary",
    any(
        target_os = "macos",
        target_os = "windows",
        all(
            target_os = "linux",
            any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")
        )
    )
)))]
fn embedded_bytes() -> Option<&'static [u8]> {
    None
}
