use orgstat::engine::{admit, begin_timestamp, dir_size, is_valid, starts_in_epoch_day};
use orgstat::utils::load_manifest;
use orgstat::{ItemOutcome, OutcomeKind, RunSummary, WorkItem};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

mod common;

// --- admit ---

#[test]
fn test_admit_no_limit() {
    assert!(admit(0, 0));
    assert!(admit(u64::MAX, 0));
    assert!(admit(u64::MAX, -1));
}

#[test]
fn test_admit_within_limit() {
    assert!(admit(0, 1000));
    assert!(admit(999, 1000));
    assert!(admit(1000, 1000));
}

#[test]
fn test_admit_over_limit() {
    assert!(!admit(1001, 1000));
    assert!(!admit(u64::MAX, 1));
}

#[test]
fn test_admit_monotone() {
    // For s1 <= s2 and a fixed positive limit: admitting s2 implies admitting s1.
    let limit = 5_000i64;
    let sizes = [0u64, 1, 4_999, 5_000, 5_001, 100_000];
    for (i, &s1) in sizes.iter().enumerate() {
        for &s2 in &sizes[i..] {
            if admit(s2, limit) {
                assert!(admit(s1, limit), "s1={s1} s2={s2}");
            }
        }
    }
}

// --- dir_size ---

#[test]
fn test_dir_size_sums_files() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("a"), vec![0u8; 100]).unwrap();
    std::fs::create_dir(tmp.path().join("sub")).unwrap();
    std::fs::write(tmp.path().join("sub/b"), vec![0u8; 50]).unwrap();
    assert_eq!(dir_size(tmp.path()), 150);
}

#[test]
fn test_dir_size_missing_path_is_zero() {
    assert_eq!(dir_size(Path::new("/nonexistent/orgstat/path")), 0);
}

// --- WorkItem::artifact_dest ---

#[test]
fn test_artifact_dest_last_two_url_segments() {
    let item = WorkItem::new(
        "https://github.com/someorg/somerepo",
        "/repos/somerepo",
        Path::new("/out"),
    );
    assert_eq!(
        item.artifact_dest(),
        PathBuf::from("/out/someorg/somerepo/statistics.pb")
    );
}

#[test]
fn test_artifact_dest_trailing_slash_and_git_url() {
    let item = WorkItem::new(
        "git://github.com/someorg/somerepo.git/",
        "/repos/somerepo",
        Path::new("/out"),
    );
    assert_eq!(
        item.artifact_dest(),
        PathBuf::from("/out/someorg/somerepo.git/statistics.pb")
    );
}

#[test]
fn test_artifact_dest_short_url() {
    let item = WorkItem::new("lonesegment", "/repos/x", Path::new("/out"));
    assert_eq!(
        item.artifact_dest(),
        PathBuf::from("/out/lonesegment/statistics.pb")
    );
}

// --- RunSummary ---

fn outcome(kind: OutcomeKind) -> ItemOutcome {
    ItemOutcome {
        url: "u".into(),
        repo_size: 0,
        duration: Duration::ZERO,
        error: None,
        artifact: None,
        kind,
    }
}

#[test]
fn test_summary_counts() {
    let outcomes = vec![
        outcome(OutcomeKind::Done),
        outcome(OutcomeKind::Done),
        outcome(OutcomeKind::SkippedExisting),
        outcome(OutcomeKind::SkippedTooLarge),
        outcome(OutcomeKind::Failed),
    ];
    let summary = RunSummary::from_outcomes(5, &outcomes);
    assert_eq!(
        summary,
        RunSummary {
            total: 5,
            succeeded: 2,
            skipped_existing: 1,
            skipped_too_large: 1,
            failed: 1,
        }
    );
    assert_eq!(summary.attempted(), 5);
}

#[test]
fn test_summary_cancelled_items_unaccounted() {
    let outcomes = vec![outcome(OutcomeKind::Done)];
    let summary = RunSummary::from_outcomes(3, &outcomes);
    assert_eq!(summary.attempted(), 1);
    assert_eq!(summary.total, 3);
}

// --- artifact validator ---

#[test]
fn test_validator_accepts_normal_timestamp() {
    let tmp = TempDir::new().unwrap();
    let artifact = tmp.path().join("ok.pb");
    common::write_artifact(&artifact, 1_500_000_000);
    assert_eq!(begin_timestamp(&artifact), Some(1_500_000_000));
    assert!(is_valid(&artifact));
}

#[test]
fn test_validator_rejects_epoch_start() {
    let tmp = TempDir::new().unwrap();
    let artifact = tmp.path().join("bad.pb");
    common::write_artifact(&artifact, 0);
    assert_eq!(begin_timestamp(&artifact), Some(0));
    assert!(!is_valid(&artifact));
}

#[test]
fn test_validator_rejects_anywhere_in_epoch_day() {
    let tmp = TempDir::new().unwrap();
    let artifact = tmp.path().join("noon.pb");
    common::write_artifact(&artifact, 43_200);
    assert!(!is_valid(&artifact));
}

#[test]
fn test_validator_accepts_day_after_epoch() {
    let tmp = TempDir::new().unwrap();
    let artifact = tmp.path().join("jan2.pb");
    common::write_artifact(&artifact, 86_400);
    assert!(is_valid(&artifact));
}

#[test]
fn test_epoch_day_boundaries() {
    assert!(starts_in_epoch_day(0));
    assert!(starts_in_epoch_day(86_399));
    assert!(!starts_in_epoch_day(86_400));
    assert!(!starts_in_epoch_day(-1));
}

#[test]
fn test_validator_fails_closed_on_garbage() {
    let tmp = TempDir::new().unwrap();
    let artifact = tmp.path().join("garbage.pb");
    std::fs::write(&artifact, b"not a protobuf at all").unwrap();
    assert!(!is_valid(&artifact));
}

#[test]
fn test_validator_fails_closed_on_empty_and_missing() {
    let tmp = TempDir::new().unwrap();
    let empty = tmp.path().join("empty.pb");
    std::fs::write(&empty, b"").unwrap();
    assert!(!is_valid(&empty));
    assert!(!is_valid(&tmp.path().join("missing.pb")));
}

// --- manifest loader ---

#[test]
fn test_manifest_basic() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("repos.csv");
    std::fs::write(
        &csv,
        "url,directory\nhttps://github.com/a/b,/repos/b\nhttps://github.com/c/d,/repos/d\n",
    )
    .unwrap();
    let items = load_manifest(&csv, "url", "directory", Path::new("/out")).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].url, "https://github.com/a/b");
    assert_eq!(items[0].repo_path, PathBuf::from("/repos/b"));
    assert_eq!(items[1].output_dir, PathBuf::from("/out"));
}

#[test]
fn test_manifest_custom_field_names_and_order() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("repos.csv");
    std::fs::write(&csv, "loc,remote\n/repos/b,https://github.com/a/b\n").unwrap();
    let items = load_manifest(&csv, "remote", "loc", Path::new("/out")).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].url, "https://github.com/a/b");
    assert_eq!(items[0].repo_path, PathBuf::from("/repos/b"));
}

#[test]
fn test_manifest_missing_column_is_named() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("repos.csv");
    std::fs::write(&csv, "url,path\nhttps://github.com/a/b,/repos/b\n").unwrap();
    let err = load_manifest(&csv, "url", "directory", Path::new("/out")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("directory"), "{msg}");
    assert!(msg.contains("url"), "{msg}");
}

#[test]
fn test_manifest_skips_blank_lines_and_flags_short_rows() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("repos.csv");
    std::fs::write(&csv, "url,directory\n\nhttps://github.com/a/b\n").unwrap();
    let err = load_manifest(&csv, "url", "directory", Path::new("/out")).unwrap_err();
    assert!(err.to_string().contains("line 3"), "{err}");
}
