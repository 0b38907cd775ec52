use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VrfError {
    /// The registry could not be read, so presence is unknown.
    #[error("unable to check kernel modules: {0}")]
    Inconclusive(#[source] io::Error),

    #[error("VRF kernel module is not loaded. Please load it with 'modprobe vrf' or ensure it's configured to load at boot")]
    NotLoaded,
}

impl VrfError {
    pub fn is_inconclusive(&self) -> bool {
        matches!(self, VrfError::Inconclusive(_))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
