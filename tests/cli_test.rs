//! Tests for the `tryst` binary itself.
//!
//! Tests:
//! - `--help` lists the relay's flags
//! - `--version` prints the crate version
//! - SIGTERM stops a running relay

use std::process::{Command, Output};
use std::time::Duration;

const BIN_ARGS: [&str; 5] = ["run", "--quiet", "--release", "--bin", "tryst"];

fn run_tryst(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(BIN_ARGS)
        .arg("--")
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run tryst")
}

#[test]
fn test_help_lists_relay_flags() {
    let output = run_tryst(&["--help"]);
    assert!(
        output.status.success(),
        "tryst --help failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--host",
        "--port",
        "--log-level",
        "--log-json",
        "--offer-timeout-secs",
        "--max-body-bytes",
        "--metrics-enabled",
    ] {
        assert!(help.contains(flag), "help should mention {flag}:\n{help}");
    }
}

#[test]
fn test_version_output() {
    let output = run_tryst(&["--version"]);
    let version = String::from_utf8_lossy(&output.stdout);
    assert_eq!(version.trim(), format!("tryst {}", env!("CARGO_PKG_VERSION")));
}

#[cfg(unix)]
#[tokio::test]
async fn test_sigterm_stops_relay() {
    use std::process::Stdio;
    use tokio::process::Command as TokioCommand;

    // Build up front so the signal reaches the relay, not cargo.
    assert!(run_tryst(&["--version"]).status.success());

    // Port 0 binds an ephemeral port, so parallel runs never collide.
    let mut child = TokioCommand::new("cargo")
        .args(BIN_ARGS)
        .args(["--", "--host", "127.0.0.1", "--port", "0"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("failed to spawn relay");

    // Give the relay time to bind.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let pid = child.id().expect("relay exited early");
    let killed = Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .expect("failed to run kill");
    assert!(killed.success());

    let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
        .await
        .expect("relay did not stop after SIGTERM")
        .expect("failed to wait for relay");
    assert!(status.code().is_some(), "relay should exit, not be killed");
}
