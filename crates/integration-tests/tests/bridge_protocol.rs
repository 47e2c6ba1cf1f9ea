//! Bridge protocol end to end
//!
//! A shell script stands in for the diagnostics executable and is run with
//! `Elevation::Direct`, so every exit code of the protocol can be produced.
#![cfg(unix)]

use netdiag_core::domain::{Config, Report};
use netdiag_core::port::{BridgeError, ElevatedRunner};
use netdiag_infra_system::{BinaryAsset, ElevatedExecutor, Elevation, ExecutableFile};

const PING_REPORT: &str = r#"{"Results":[{"Diagnostic":"Ping","Result":{"Ping":{"Ping":{"Address":"8.8.8.8"},"Statistics":null}}}]}"#;
const FAILED_REPORT: &str = r#"{"Results":[{"Diagnostic":"Ping","Error":"ping report is currently only supported on windows"}]}"#;

struct Fixture {
    dir: tempfile::TempDir,
    executor: ElevatedExecutor,
}

fn script(body: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let executor = ElevatedExecutor::with_parts(
        BinaryAsset::Bytes(format!("#!/bin/sh\n{}\n", body).into_bytes()),
        ExecutableFile::at(dir.path().join("netdiag-diagnostics")),
        Elevation::Direct,
    );
    Fixture { dir, executor }
}

fn ping_config() -> Config {
    Config::with_ping(vec!["8.8.8.8".to_string()], 1)
}

#[tokio::test]
async fn test_clean_exit_returns_report() {
    let fixture = script(&format!("echo '{}'", PING_REPORT));

    let report = fixture.executor.run(&ping_config(), "prompt").await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].diagnostic(), "Ping");
    assert!(report.results[0].result().is_some());
    assert!(!report.has_errors());
}

#[tokio::test]
async fn test_flags_reach_the_child() {
    let fixture = script(&format!(
        "[ \"$*\" = \"-ping-addresses 8.8.8.8 -ping-count 1\" ] || exit 9\necho '{}'",
        PING_REPORT
    ));

    let report = fixture.executor.run(&ping_config(), "prompt").await;

    assert!(report.is_ok(), "unexpected: {:?}", report.err());
}

#[tokio::test]
async fn test_empty_config_passes_no_flags() {
    let fixture = script("[ $# -eq 0 ] || exit 9\necho '{\"Results\":[]}'");

    let report = fixture.executor.run(&Config::default(), "prompt").await.unwrap();

    assert!(report.is_empty());
}

#[tokio::test]
async fn test_usage_exit_still_returns_output() {
    let fixture = script("echo 'flag provided but not defined: -x' >&2\necho '{\"Results\":[]}'\nexit 2");

    let raw = fixture.executor.run_json(&ping_config(), "prompt").await.unwrap();

    assert_eq!(raw, b"{\"Results\":[]}\n");
}

#[tokio::test]
async fn test_report_with_errors_exit_returns_report() {
    let fixture = script(&format!("echo '{}'\nexit 3", FAILED_REPORT));

    let report = fixture.executor.run(&ping_config(), "prompt").await.unwrap();

    assert!(report.has_errors());
    assert_eq!(
        report.results[0].error(),
        Some("ping report is currently only supported on windows")
    );
}

#[tokio::test]
async fn test_hard_failure_includes_stderr() {
    let fixture = script("echo 'socket: operation not permitted' >&2\nexit 1");

    let err = fixture.executor.run(&ping_config(), "prompt").await.unwrap_err();

    match &err {
        BridgeError::ChildFailed { stderr, .. } => {
            assert_eq!(stderr.as_deref(), Some("socket: operation not permitted\n"));
        }
        other => panic!("expected ChildFailed, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.starts_with("failed to run executable: exit status: 1"));
    assert!(message.contains("socket: operation not permitted"));
}

#[tokio::test]
async fn test_hard_failure_without_stderr() {
    let fixture = script("exit 5");

    let err = fixture.executor.run(&ping_config(), "prompt").await.unwrap_err();

    assert!(matches!(err, BridgeError::ChildFailed { stderr: None, .. }));
    assert_eq!(err.to_string(), "failed to run executable: exit status: 5");
}

#[tokio::test]
async fn test_killed_child_is_hard_failure() {
    let fixture = script("kill -9 $$");

    let err = fixture.executor.run(&ping_config(), "prompt").await.unwrap_err();

    assert!(matches!(err, BridgeError::ChildFailed { .. }));
}

#[tokio::test]
async fn test_undecodable_output_is_decode_error() {
    let fixture = script("echo 'not json'");

    let err = fixture.executor.run(&ping_config(), "prompt").await.unwrap_err();

    assert!(matches!(err, BridgeError::Decode(_)));
    assert!(err.to_string().starts_with("failed to unmarshal report:"));
}

#[tokio::test]
async fn test_result_slot_without_outcome_is_decode_error() {
    let fixture = script("echo '{\"Results\":[{\"Diagnostic\":\"Ping\"}]}'");

    let err = fixture.executor.run(&ping_config(), "prompt").await.unwrap_err();

    assert!(matches!(err, BridgeError::Decode(_)));
    assert!(err.to_string().contains("neither Result nor Error"));
}

#[tokio::test]
async fn test_missing_asset() {
    let dir = tempfile::tempdir().unwrap();
    let executor = ElevatedExecutor::with_parts(
        BinaryAsset::File(dir.path().join("does-not-exist")),
        ExecutableFile::at(dir.path().join("netdiag-diagnostics")),
        Elevation::Direct,
    );

    let err = executor.run(&ping_config(), "prompt").await.unwrap_err();

    assert!(matches!(err, BridgeError::AssetNotFound(_)));
    assert!(err.to_string().starts_with("could not find asset:"));
}

#[tokio::test]
async fn test_extraction_failure() {
    let dir = tempfile::tempdir().unwrap();
    // Parent of the executable path is a regular file
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let executor = ElevatedExecutor::with_parts(
        BinaryAsset::Bytes(b"#!/bin/sh\n".to_vec()),
        ExecutableFile::at(blocker.join("netdiag-diagnostics")),
        Elevation::Direct,
    );

    let err = executor.run(&ping_config(), "prompt").await.unwrap_err();

    assert!(matches!(err, BridgeError::Extraction(_)));
}

#[tokio::test]
async fn test_executable_is_extracted_once_and_reused() {
    let fixture = script("echo '{\"Results\":[]}'");
    let path = fixture.dir.path().join("netdiag-diagnostics");

    fixture.executor.run(&Config::default(), "prompt").await.unwrap();
    assert!(path.exists());

    std::fs::write(&path, format!("#!/bin/sh\necho '{}'\n", PING_REPORT)).unwrap();
    let report = fixture.executor.run(&Config::default(), "prompt").await.unwrap();

    assert_eq!(report.results.len(), 1);
}

#[tokio::test]
async fn test_concurrent_runs_share_one_executable() {
    let fixture = script("echo '{\"Results\":[]}'");

    let config = Config::default();
    let (a, b) = tokio::join!(
        fixture.executor.run(&config, "prompt"),
        fixture.executor.run(&config, "prompt")
    );

    assert_eq!(a.unwrap(), Report::default());
    assert_eq!(b.unwrap(), Report::default());
    let entries = std::fs::read_dir(fixture.dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}
