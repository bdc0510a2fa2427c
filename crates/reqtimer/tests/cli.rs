//! CLI tests for reqtimer

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn reqtimer() -> Command {
    Command::cargo_bin("reqtimer").unwrap()
}

/// Answer `requests` connections with 200 OK, then stop
fn serve_ok(requests: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming().take(requests) {
            let mut stream = match stream {
                Ok(s) => s,
                Err(_) => break,
            };
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
            );
        }
    });
    addr
}

/// An address nothing listens on
fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

#[test]
fn test_bench_requires_url() {
    reqtimer()
        .args(["bench", "-n", "3"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no request url configured"));
}

#[test]
fn test_bench_rejects_zero_count() {
    reqtimer()
        .args(["bench", "--url", "http://127.0.0.1:1/", "-n", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("count must be at least 1"));
}

#[test]
fn test_poll_rejects_zero_interval() {
    reqtimer()
        .args(["poll", "--url", "http://127.0.0.1:1/", "-i", "0", "-d", "5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("interval must be greater than zero"));
}

#[test]
fn test_bad_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reqtimer.toml");
    std::fs::write(&path, "[bench]\ncount = \"lots\"\n").unwrap();

    reqtimer()
        .args(["bench", "--config"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("TOML parse error"));
}

#[test]
fn test_bench_counts_failures_and_exits_cleanly() {
    let addr = closed_addr();
    let output = reqtimer()
        .args(["bench", "--json", "-n", "3", "--timeout", "2", "--url"])
        .arg(format!("http://{}/", addr))
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["errors"], 3);
    assert_eq!(result["count"], 3);
    assert_eq!(result["average_response_time_ms"], 0.0);
}

#[test]
fn test_bench_from_config_file_with_report() {
    let addr = serve_ok(2);
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("reqtimer.toml");
    let report_path = dir.path().join("report.json");
    std::fs::write(
        &config_path,
        format!(
            "[request]\nurl = \"http://{}/health\"\ntimeout_secs = 5\n\n[bench]\ncount = 2\n",
            addr
        ),
    )
    .unwrap();

    reqtimer()
        .args(["bench", "--config"])
        .arg(&config_path)
        .arg("-j")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Average response time"))
        .stdout(predicate::str::contains("Error rate: 0.00%"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["errors"], 0);
    assert_eq!(report["successes"], 2);
}

#[test]
fn test_poll_short_session() {
    let addr = closed_addr();
    let output = reqtimer()
        .args(["poll", "--json", "-i", "0.2", "-d", "0.5", "--timeout", "1", "--url"])
        .arg(format!("http://{}/", addr))
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ticks = summary["ticks"].as_u64().unwrap();
    assert!((2..=4).contains(&ticks), "ticks = {}", ticks);
    assert_eq!(summary["successes"], 0);
    assert_eq!(summary["failures"], ticks);
}
