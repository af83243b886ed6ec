#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/ncpcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn ncpbridge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ncpbridge"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("ncpbridge should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        if start.elapsed() >= timeout {
            panic!("socket {} never appeared", path.display());
        }
        thread::sleep(Duration::from_millis(25));
    }
}

#[test]
fn version_prints_package_version() {
    let output = ncpbridge(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("ncpbridge {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn encode_reset_prints_frame_hex() {
    let output = ncpbridge(&["--format", "pretty", "encode", "reset"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "010301070104");

    let output = ncpbridge(&["--format", "pretty", "encode", "reset", "--keep-nib"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "010301070004");
}

#[test]
fn encode_json_names_the_message() {
    let output = ncpbridge(&["--format", "json", "encode", "get", "0x61"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["name"], "NLME_GET_REQUEST");
    assert_eq!(json["frame"], "01040104610004");
    assert_eq!(json["size"], 7);
}

#[test]
fn decode_reports_messages_and_reader_stats() {
    let output = ncpbridge(&["--format", "json", "decode", "ee 01 03 01 18 00 04 01 03 01 1d 02 04"]);
    assert!(output.status.success());
    let json = stdout_json(&output);

    let messages = json["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["name"], "NLME_RESET_CONFIRM");
    assert_eq!(messages[0]["status"], "SUCCESS");
    assert_eq!(messages[1]["name"], "NLME_UNPAIR_INDICATION");
    assert_eq!(json["stats"]["skipped_bytes"], 1);
}

#[test]
fn decode_without_frames_exits_60() {
    let output = ncpbridge(&["--format", "json", "decode", "deadbeef"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn simulate_runs_the_full_script() {
    let output = ncpbridge(&["--format", "json", "simulate", "--host-read", "1", "--ncp-write", "2"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    let names: Vec<&str> = json
        .as_array()
        .expect("records array")
        .iter()
        .filter_map(|record| record["name"].as_str())
        .collect();

    for expected in [
        "NLME_RESET_CONFIRM",
        "NLME_START_CONFIRM",
        "NLME_GET_CONFIRM",
        "NLME_PAIR_CONFIRM",
        "NLDE_DATA_CONFIRM",
        "NLDE_DATA_INDICATION",
        "NLME_UNPAIR_CONFIRM",
    ] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }
}

#[test]
fn send_against_served_ncp_prints_confirm() {
    let dir = unique_temp_dir("serve");
    let sock_path = dir.join("ncp.sock");

    let mut child = Command::new(env!("CARGO_BIN_EXE_ncpbridge"))
        .args(["--log-level", "error", "serve", "--once"])
        .arg(&sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("serve should start");

    wait_for_socket(&sock_path, Duration::from_secs(3));

    let sock = sock_path.to_str().expect("utf-8 path");
    let output = ncpbridge(&["--format", "json", "send", sock, "--timeout", "3s", "start"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json[0]["name"], "NLME_START_CONFIRM");
    assert_eq!(json[0]["status"], "SUCCESS");

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_to_missing_socket_fails() {
    let dir = unique_temp_dir("missing");
    let sock = dir.join("absent.sock");
    let output = ncpbridge(&[
        "send",
        sock.to_str().expect("utf-8 path"),
        "--timeout",
        "200ms",
        "start",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let _ = std::fs::remove_dir_all(&dir);
}
