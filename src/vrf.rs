use std::io;
use std::path::PathBuf;

use crate::error::VrfError;
use crate::kmod::{self, HostFs, KernelFs, ModulePaths};

pub const VRF_MODULE: &str = "vrf";

/// Which probe confirmed that the module is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Marker,
    Registry,
}

/// Checks that the VRF module is loaded before VRF-scoped routing is enabled.
///
/// The marker directory is consulted first; the registry is only read when
/// the marker does not confirm presence. Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct VrfValidator<F> {
    fs: F,
    paths: ModulePaths,
}

impl VrfValidator<HostFs> {
    pub fn host() -> Self {
        VrfValidator::new(HostFs, ModulePaths::default())
    }
}

impl<F: KernelFs> VrfValidator<F> {
    pub fn new(fs: F, paths: ModulePaths) -> Self {
        VrfValidator { fs, paths }
    }

    pub fn marker_path(&self) -> PathBuf {
        self.paths.marker(VRF_MODULE)
    }

    pub fn detect(&self) -> Result<Detection, VrfError> {
        // Errors other than not-found fall through to the registry scan.
        if let Ok(true) = self.fs.try_exists(&self.marker_path()) {
            return Ok(Detection::Marker);
        }

        let registry = self
            .fs
            .read_to_string(&self.paths.proc_modules)
            .map_err(VrfError::Inconclusive)?;

        if kmod::is_listed(&registry, VRF_MODULE) {
            Ok(Detection::Registry)
        } else {
            Err(VrfError::NotLoaded)
        }
    }

    pub fn validate(&self) -> Result<(), VrfError> {
        self.detect().map(|_| ())
    }
}

/// Validate the VRF module against the host's /sys and /proc.
pub fn validate_vrf_module() -> Result<(), VrfError> {
    VrfValidator::host().validate()
}

/// Run the probe on the blocking pool, for callers already inside a tokio
/// runtime. A probe that never completes (the task panicked or was
/// cancelled) is inconclusive.
pub async fn detect_with<F>(fs: F, paths: ModulePaths) -> Result<Detection, VrfError>
where
    F: KernelFs + Send + 'static,
{
    tokio::task::spawn_blocking(move || VrfValidator::new(fs, paths).detect())
        .await
        .map_err(|e| VrfError::Inconclusive(io::Error::new(io::ErrorKind::Other, e.to_string())))?
}

/// [`detect_with`] against the host filesystem.
pub async fn detect_vrf_module(paths: ModulePaths) -> Result<Detection, VrfError> {
    detect_with(HostFs, paths).await
}
