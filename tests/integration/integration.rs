use std::fs;
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vrfcheck::{
    detect_vrf_module, detect_with, validate_vrf_module, Detection, HostFs, MemFs, ModulePaths,
    ModulePathsBuilder, Policy, Verdict, VrfError, VrfValidator,
};

const NOT_LOADED: &str = "VRF kernel module is not loaded. Please load it with 'modprobe vrf' or ensure it's configured to load at boot";

/// A fake /sys/module and /proc/modules under a temporary root.
struct FakeHost {
    root: TempDir,
}

impl FakeHost {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("sys/module")).unwrap();
        fs::create_dir_all(root.path().join("proc")).unwrap();
        FakeHost { root }
    }

    fn marker(self, module: &str) -> Self {
        fs::create_dir_all(self.root.path().join("sys/module").join(module)).unwrap();
        self
    }

    fn registry(self, content: &str) -> Self {
        fs::write(self.root.path().join("proc/modules"), content).unwrap();
        self
    }

    fn paths(&self) -> ModulePaths {
        ModulePathsBuilder::default()
            .sys_module_dir(self.root.path().join("sys/module"))
            .proc_modules(self.root.path().join("proc/modules"))
            .build()
            .unwrap()
    }

    fn validator(&self) -> VrfValidator<HostFs> {
        VrfValidator::new(HostFs, self.paths())
    }
}

fn run_vrfcheck(host: &FakeHost, extra: &[&str]) -> (Option<i32>, String) {
    let paths = host.paths();
    let out = Command::new(env!("CARGO_BIN_EXE_vrfcheck"))
        .arg("--sys-module-dir")
        .arg(&paths.sys_module_dir)
        .arg("--proc-modules")
        .arg(&paths.proc_modules)
        .args(extra)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run vrfcheck");
    (out.status.code(), String::from_utf8_lossy(&out.stderr).into_owned())
}

#[test]
fn marker_directory_confirms_presence() {
    let host = FakeHost::new().marker("vrf");
    assert_eq!(host.validator().detect().unwrap(), Detection::Marker);
}

#[test]
fn registry_line_confirms_presence() {
    let host = FakeHost::new().registry(
        "vrf 28672 0 - Live 0xffffffffc0a3e000\nother_module 16384 0 - Live 0xffffffffc0a39000\n",
    );
    assert_eq!(host.validator().detect().unwrap(), Detection::Registry);
}

#[test]
fn substring_module_is_not_vrf() {
    let host = FakeHost::new()
        .marker("myvrf_custom")
        .registry("myvrf_custom 16384 0 - Live 0xffffffffc0a39000\n");
    let err = host.validator().validate().unwrap_err();
    assert_eq!(err.to_string(), NOT_LOADED);
}

#[test]
fn empty_registry_is_absence() {
    let host = FakeHost::new().registry("");
    assert!(matches!(
        host.validator().validate(),
        Err(VrfError::NotLoaded)
    ));
}

#[test]
fn missing_registry_is_inconclusive() {
    let host = FakeHost::new();
    let err = host.validator().validate().unwrap_err();
    assert!(err.is_inconclusive());
    assert!(err
        .to_string()
        .starts_with("unable to check kernel modules: "));
}

#[tokio::test]
async fn async_probe_matches_sync_probe() {
    let host = FakeHost::new().registry("bridge 311296 0 - Live 0x0\nvrf 28672 0 - Live 0x0\n");
    let sync = host.validator().detect().unwrap();
    let detected = detect_vrf_module(host.paths()).await.unwrap();
    assert_eq!(sync, detected);
}

#[tokio::test]
async fn embedded_startup_with_in_memory_host() {
    let fs = MemFs::new().with_file("/proc/modules", "bridge 311296 0 - Live 0x0\n");
    let outcome = detect_with(fs, ModulePaths::default()).await;
    let verdict = Policy::Lenient.apply(outcome);
    assert!(matches!(verdict, Verdict::Abort(VrfError::NotLoaded)));
    assert_eq!(verdict.exit_code(), 1);

    let fs = MemFs::new().with_dir("/sys/module/vrf");
    let outcome = detect_with(fs, ModulePaths::default()).await;
    assert!(matches!(
        Policy::Strict.apply(outcome),
        Verdict::Proceed(Detection::Marker)
    ));
}

#[test]
fn host_probe_is_stable() {
    let first = validate_vrf_module();
    let second = validate_vrf_module();
    assert_eq!(first.is_ok(), second.is_ok());
    if let Err(err) = first {
        let msg = err.to_string();
        assert!(!msg.is_empty());
        assert!(msg == NOT_LOADED || msg.starts_with("unable to check kernel modules: "));
    }
}

#[test]
fn cli_exit_codes_follow_policy() {
    let present = FakeHost::new().marker("vrf");
    assert_eq!(run_vrfcheck(&present, &[]).0, Some(0));

    let absent = FakeHost::new().registry("bridge 311296 0 - Live 0x0\n");
    let (code, stderr) = run_vrfcheck(&absent, &[]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("modprobe vrf"), "stderr: {}", stderr);
    assert_eq!(run_vrfcheck(&absent, &["--policy", "warn"]).0, Some(0));

    let unreadable = FakeHost::new();
    assert_eq!(run_vrfcheck(&unreadable, &[]).0, Some(2));
    assert_eq!(run_vrfcheck(&unreadable, &["-p", "lenient"]).0, Some(0));
}

#[test]
fn cli_reads_config_file() {
    let host = FakeHost::new();
    let conf = host.root.path().join("vrfcheck.conf");
    fs::write(&conf, "policy = \"lenient\"\n").unwrap();

    let (code, stderr) = run_vrfcheck(&host, &["--config", conf.to_str().unwrap()]);
    assert_eq!(code, Some(0));
    assert!(stderr.contains("unable to check kernel modules"), "stderr: {}", stderr);
}

#[test]
fn cli_rejects_bad_config() {
    let host = FakeHost::new();
    let conf = host.root.path().join("vrfcheck.conf");
    fs::write(&conf, "policy = \"sometimes\"\n").unwrap();

    let (code, _) = run_vrfcheck(&host, &["-c", conf.to_str().unwrap()]);
    assert_eq!(code, Some(1));
}

#[test]
fn cli_verbose_logs_registry_entry() {
    let host = FakeHost::new().registry("vrf 28672 2 l3mdev,foo, Live 0x0\n");

    let (code, stderr) = run_vrfcheck(&host, &["-v"]);
    assert_eq!(code, Some(0));
    assert!(stderr.contains("used by [l3mdev, foo]"), "stderr: {}", stderr);
    assert!(stderr.contains("size 28672 refcount 2 state Live"), "stderr: {}", stderr);
}
