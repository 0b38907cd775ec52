// File: src/kmod/fs.rs
//
// Read-only access to the kernel's virtual filesystems. The probe only ever
// asks two questions: does a path exist, and what does a text file contain.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SYS_MODULE_DIR: &str = "/sys/module";
pub const PROC_MODULES: &str = "/proc/modules";

/// Read capability used by the validator.
pub trait KernelFs {
    /// `Ok(false)` when the path is absent, `Err` when its presence could not
    /// be determined.
    fn try_exists(&self, path: &Path) -> io::Result<bool>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

impl<T: KernelFs + ?Sized> KernelFs for &T {
    fn try_exists(&self, path: &Path) -> io::Result<bool> {
        (**self).try_exists(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFs;

impl KernelFs for HostFs {
    fn try_exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Where module state is exposed.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(default, setter(into))]
pub struct ModulePaths {
    /// Directory holding one entry per loaded module.
    pub sys_module_dir: PathBuf,
    /// Registry listing loaded modules, one per line.
    pub proc_modules: PathBuf,
}

impl Default for ModulePaths {
    fn default() -> Self {
        ModulePaths {
            sys_module_dir: PathBuf::from(SYS_MODULE_DIR),
            proc_modules: PathBuf::from(PROC_MODULES),
        }
    }
}

impl ModulePaths {
    pub fn marker(&self, module: &str) -> PathBuf {
        self.sys_module_dir.join(module)
    }
}

/// In-memory filesystem for exercising the probe without touching the host.
///
/// Public so that daemons embedding the check can drive their own startup
/// tests through [`crate::detect_with`] without a fake sysfs on disk.
#[derive(Debug, Default, Clone)]
pub struct MemFs {
    dirs: HashSet<PathBuf>,
    files: HashMap<PathBuf, String>,
    denied: HashSet<PathBuf>,
}

impl MemFs {
    pub fn new() -> Self {
        MemFs::default()
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Every access to `path` fails with `PermissionDenied`.
    pub fn deny(mut self, path: impl Into<PathBuf>) -> Self {
        self.denied.insert(path.into());
        self
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: permission denied", path.display()),
            ));
        }
        Ok(())
    }
}

impl KernelFs for MemFs {
    fn try_exists(&self, path: &Path) -> io::Result<bool> {
        self.check_access(path)?;
        Ok(self.dirs.contains(path) || self.files.contains_key(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.check_access(path)?;
        if let Some(content) = self.files.get(path) {
            return Ok(content.clone());
        }
        if self.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            ));
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{}: no such file or directory", path.display()),
        ))
    }
}
