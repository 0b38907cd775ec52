//! Startup probe for the VRF kernel module.
//!
//! A routing daemon calls [`validate_vrf_module`] (or the async
//! [`detect_vrf_module`]) before enabling VRF-scoped features and decides
//! through a [`Policy`] whether a failure aborts startup or only degrades it.

#[macro_use]
extern crate derive_builder;

pub mod config;
pub mod error;
pub mod kmod;
pub mod startup;
pub mod vrf;

pub use error::{ConfigError, RegistryError, VrfError};
pub use kmod::{HostFs, KernelFs, MemFs, ModulePaths, ModulePathsBuilder};
pub use startup::{Policy, Verdict};
pub use vrf::{
    detect_vrf_module, detect_with, validate_vrf_module, Detection, VrfValidator, VRF_MODULE,
};
