#![cfg(unix)]

use orgstat::engine::{CommandError, run_to_file};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

mod common;

#[test]
fn test_run_to_file_streams_stdout() {
    let tmp = TempDir::new().unwrap();
    let tool = common::write_script(tmp.path(), "ok-tool", "printf 'hello artifact'");
    let dest = tmp.path().join("out.pb");
    run_to_file(&tool, &[], &dest, None).unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"hello artifact");
}

#[test]
fn test_run_to_file_passes_arguments() {
    let tmp = TempDir::new().unwrap();
    let tool = common::write_script(tmp.path(), "echo-tool", "echo \"$@\"");
    let dest = tmp.path().join("out.txt");
    let args = vec!["--flag".to_string(), "value".to_string()];
    run_to_file(&tool, &args, &dest, None).unwrap();
    assert_eq!(
        std::fs::read_to_string(&dest).unwrap().trim(),
        "--flag value"
    );
}

#[test]
fn test_nonzero_exit_removes_partial_output() {
    let tmp = TempDir::new().unwrap();
    let tool = common::write_script(
        tmp.path(),
        "fail-tool",
        "printf 'partial bytes'\necho 'boom' >&2\nexit 3",
    );
    let dest = tmp.path().join("out.pb");
    let err = run_to_file(&tool, &[], &dest, None).unwrap_err();
    match err {
        CommandError::NonZero { status, stderr, .. } => {
            assert_eq!(status.code(), Some(3));
            assert!(stderr.contains("boom"), "{stderr}");
        }
        other => panic!("expected NonZero, got {other:?}"),
    }
    // A later validity check must never see the partial file.
    assert!(!dest.exists());
}

#[test]
fn test_spawn_failure_is_reported_and_dest_removed() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("out.pb");
    let err = run_to_file(Path::new("/nonexistent/orgstat-tool"), &[], &dest, None).unwrap_err();
    assert!(matches!(err, CommandError::Spawn { .. }), "{err:?}");
    assert!(!dest.exists());
}

#[test]
fn test_stderr_capture_is_bounded() {
    let tmp = TempDir::new().unwrap();
    // ~1 MiB of stderr; capture must stay at the 64 KiB cap.
    let tool = common::write_script(
        tmp.path(),
        "noisy-tool",
        "i=0\nwhile [ $i -lt 1024 ]; do printf '%01024d' 0 >&2; i=$((i+1)); done\nexit 1",
    );
    let dest = tmp.path().join("out.pb");
    let err = run_to_file(&tool, &[], &dest, None).unwrap_err();
    match err {
        CommandError::NonZero { stderr, .. } => {
            assert!(stderr.len() <= 64 * 1024 + 64, "len={}", stderr.len());
            assert!(stderr.ends_with("[stderr truncated]"), "not truncated");
        }
        other => panic!("expected NonZero, got {other:?}"),
    }
}

#[test]
fn test_timeout_kills_child() {
    let tmp = TempDir::new().unwrap();
    let tool = common::write_script(tmp.path(), "slow-tool", "sleep 30");
    let dest = tmp.path().join("out.pb");
    let start = Instant::now();
    let err = run_to_file(&tool, &[], &dest, Some(Duration::from_millis(200))).unwrap_err();
    assert!(matches!(err, CommandError::Timeout { .. }), "{err:?}");
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(!dest.exists());
}

#[test]
fn test_fast_child_beats_timeout() {
    let tmp = TempDir::new().unwrap();
    let tool = common::write_script(tmp.path(), "fast-tool", "printf 'done'");
    let dest = tmp.path().join("out.pb");
    run_to_file(&tool, &[], &dest, Some(Duration::from_secs(30))).unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"done");
}
