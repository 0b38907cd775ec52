use serde_derive::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::kmod::ModulePaths;
use crate::startup::Policy;

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub policy: Option<Policy>,
    pub sys_module_dir: Option<PathBuf>,
    pub proc_modules: Option<PathBuf>,
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let c = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&c)
}

pub fn parse_config(c: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(c)?;
    config.check()?;
    Ok(config)
}

impl Config {
    fn check(&self) -> Result<(), ConfigError> {
        for (key, path) in [
            ("sys_module_dir", &self.sys_module_dir),
            ("proc_modules", &self.proc_modules),
        ] {
            if let Some(p) = path {
                if p.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid(format!("{} is empty", key)));
                }
            }
        }
        Ok(())
    }

    pub fn policy(&self) -> Policy {
        self.policy.unwrap_or_default()
    }

    /// Probe locations, falling back to the host paths for unset keys.
    pub fn paths(&self) -> ModulePaths {
        let defaults = ModulePaths::default();
        ModulePaths {
            sys_module_dir: match &self.sys_module_dir {
                Some(d) => d.clone(),
                None => defaults.sys_module_dir,
            },
            proc_modules: match &self.proc_modules {
                Some(p) => p.clone(),
                None => defaults.proc_modules,
            },
        }
    }
}
