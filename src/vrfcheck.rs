use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vrfcheck::config::{self, Config};
use vrfcheck::kmod::{self, HostFs, KernelFs};
use vrfcheck::{detect_vrf_module, Policy, Verdict, VRF_MODULE};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Opt {
    #[arg(short, long, value_parser)]
    config: Option<PathBuf>,

    /// strict, lenient or warn
    #[arg(short, long)]
    policy: Option<Policy>,

    #[arg(long, value_parser)]
    sys_module_dir: Option<PathBuf>,

    #[arg(long, value_parser)]
    proc_modules: Option<PathBuf>,

    /// Log the registry entry of the module
    #[arg(short, long)]
    verbose: bool,
}

fn log_entry(proc_modules: &Path) {
    let registry = match HostFs.read_to_string(proc_modules) {
        Ok(r) => r,
        Err(e) => {
            log::debug!("cannot read {}: {}", proc_modules.display(), e);
            return;
        }
    };
    match kmod::find(&registry, VRF_MODULE) {
        Some(entry) => log::info!(
            "{}: size {} refcount {} state {} used by [{}]",
            entry.name,
            entry.size,
            entry.refcount,
            entry.state,
            entry.dependents.iter().join(", ")
        ),
        None => log::debug!("{} not listed in {}", VRF_MODULE, proc_modules.display()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::parse();

    let mut config = match &opt.config {
        Some(path) => config::read_config(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    config.policy = match opt.policy {
        Some(p) => Some(p),
        None => config.policy,
    };

    config.sys_module_dir = match opt.sys_module_dir {
        Some(d) => Some(d),
        None => config.sys_module_dir,
    };

    config.proc_modules = match opt.proc_modules {
        Some(p) => Some(p),
        None => config.proc_modules,
    };

    let policy = config.policy();
    let paths = config.paths();
    log::debug!("policy {} with {:?}", policy, paths);

    let verdict = policy.apply(detect_vrf_module(paths.clone()).await);
    match &verdict {
        Verdict::Proceed(detection) => {
            log::info!("VRF kernel module loaded ({:?} probe)", detection);
            if opt.verbose {
                log_entry(&paths.proc_modules);
            }
        }
        Verdict::Degrade(e) => {
            log::warn!("{}; VRF-scoped features disabled", e);
        }
        Verdict::Abort(e) => {
            log::error!("{}", e);
        }
    }

    Ok(ExitCode::from(verdict.exit_code()))
}
