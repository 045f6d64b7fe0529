//! Binary-level behaviour: flags, configuration errors, exit codes, signals

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const HEADER: &str = "timestamp_iso,download_mbps,upload_mbps,ping_ms";

/// Command running in `dir`, isolated from the caller's environment overrides
fn create_test_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("isp-service-checker").unwrap();
    cmd.current_dir(dir)
        .env_remove("ISP_CHECKER_CONFIG")
        .env_remove("ISP_CHECKER__APP__INTERVAL_SECONDS")
        .env_remove("ISP_CHECKER__APP__LOG_FILE")
        .arg("--no-color");
    cmd
}

/// Port with nothing listening on it
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn write_config(dir: &Path, body: &str) {
    fs::write(dir.join("config.toml"), body).unwrap();
}

#[test]
fn help_lists_flags() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--init-config"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_is_usage_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(dir.path())
        .arg("--interval")
        .arg("5")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn explicit_missing_config_fails_before_loop() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(dir.path())
        .arg("--config")
        .arg("missing.toml")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));

    assert!(!dir.path().join("internet_metrics.csv").exists());
}

#[test]
fn zero_interval_is_config_error() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "[app]\ninterval_seconds = 0\n");

    create_test_cmd(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("[CONFIG]"))
        .stderr(predicate::str::contains("interval_seconds"));
}

#[test]
fn non_numeric_interval_is_config_error() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "[app]\ninterval_seconds = \"often\"\n");

    create_test_cmd(dir.path()).assert().failure().code(1);
}

#[test]
fn oversized_upload_is_config_error() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "[provider]\nupload_bytes = 50000000000000\n");

    create_test_cmd(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("upload_bytes"));

    assert!(!dir.path().join("internet_metrics.csv").exists());
}

#[test]
fn init_config_writes_example_once() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(dir.path())
        .arg("--init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote example configuration"));

    let content = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(content.contains("interval_seconds = 300"));

    create_test_cmd(dir.path())
        .arg("--init-config")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Refusing to overwrite"));
}

#[test]
fn unwritable_log_path_exits_with_io_code() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("blocker"), "not a directory").unwrap();
    write_unreachable_provider_config(dir.path(), "blocker/metrics.csv", 120);

    create_test_cmd(dir.path())
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("[IO]"));
}

/// Config pointing the provider at a closed port, with a long interval
fn write_unreachable_provider_config(dir: &Path, log_file: &str, timeout_seconds: u64) {
    write_config(
        dir,
        &format!(
            "[app]\n\
             interval_seconds = 3600\n\
             log_file = \"{log_file}\"\n\
             \n\
             [provider]\n\
             download_url = \"http://127.0.0.1:{port}/__down\"\n\
             upload_url = \"http://127.0.0.1:{port}/__up\"\n\
             timeout_seconds = {timeout_seconds}\n",
            port = closed_port()
        ),
    );
}

/// Start the checker, wait for its log header, send `signal` and return the exit code
#[cfg(unix)]
fn run_until_signal(signal: &str) -> (Option<i32>, String) {
    use std::time::{Duration, Instant};

    let dir = TempDir::new().unwrap();
    write_unreachable_provider_config(dir.path(), "metrics.csv", 5);

    let mut child = create_test_cmd(dir.path()).spawn().unwrap();

    // The header is written after the signal handlers are installed
    let csv = dir.path().join("metrics.csv");
    let deadline = Instant::now() + Duration::from_secs(20);
    while !csv.exists() {
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("log file never appeared");
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let status = Command::new("kill")
        .arg(format!("-{}", signal))
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("process did not stop after SIG{}", signal);
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    (exit.code(), fs::read_to_string(&csv).unwrap())
}

#[cfg(unix)]
#[test]
fn sigterm_stops_cleanly_with_status_zero() {
    let (code, csv) = run_until_signal("TERM");
    assert_eq!(code, Some(0));
    // Provider was unreachable, so only the header is present
    assert_eq!(csv, format!("{}\n", HEADER));
}

#[cfg(unix)]
#[test]
fn sigint_stops_cleanly_with_status_zero() {
    let (code, csv) = run_until_signal("INT");
    assert_eq!(code, Some(0));
    assert_eq!(csv, format!("{}\n", HEADER));
}
