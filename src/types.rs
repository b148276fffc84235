//! Public and internal types for the orgstat API and pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::config::{AGGREGATED_STATISTICS_NAME, SIZE_LIMIT_DEFAULT, STATISTICS_FILENAME};

/// One repository's analysis task: where the content lives and where the
/// result artifact goes.
///
/// The per-item artifact lands at `output_dir/<owner>/<name>/statistics.pb`,
/// with `<owner>/<name>` taken from the last two `/`-separated segments of the
/// URL. Immutable once created.
#[derive(Clone, Debug)]
pub struct WorkItem {
    /// Source identifier, e.g. a repository URL.
    pub url: String,
    /// Local directory holding the repository content. Must be an absolute path.
    pub repo_path: PathBuf,
    /// Root directory for result artifacts.
    pub output_dir: PathBuf,
}

impl WorkItem {
    pub fn new(url: impl Into<String>, repo_path: impl Into<PathBuf>, output_dir: &Path) -> Self {
        Self {
            url: url.into(),
            repo_path: repo_path.into(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Expected artifact location for this item. Derived from the URL so that
    /// two workers never share a destination directory.
    pub fn artifact_dest(&self) -> PathBuf {
        let mut segments: Vec<&str> = self
            .url
            .trim_end_matches('/')
            .rsplit('/')
            .filter(|s| !s.is_empty())
            .take(2)
            .collect();
        segments.reverse();
        let mut dest = self.output_dir.clone();
        for seg in segments {
            dest.push(seg);
        }
        dest.join(STATISTICS_FILENAME)
    }
}

/// Terminal state of one processed item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Analysis ran (primary or fallback) and produced an artifact.
    Done,
    /// Artifact already existed and `force` was off; reused without re-running.
    SkippedExisting,
    /// Repository exceeded the configured size limit; never attempted.
    SkippedTooLarge,
    /// Both the primary and the fallback attempt failed.
    Failed,
}

/// Result of processing one [`WorkItem`].
///
/// For attempted items exactly one of `artifact` / `error` is populated.
/// `SkippedExisting` carries the pre-existing artifact and no error;
/// `SkippedTooLarge` carries an error and no artifact.
#[derive(Clone, Debug)]
pub struct ItemOutcome {
    pub url: String,
    /// Best-effort measured content size in bytes (0 when unmeasurable).
    pub repo_size: u64,
    pub duration: Duration,
    pub error: Option<String>,
    pub artifact: Option<PathBuf>,
    pub kind: OutcomeKind,
}

/// Run options for the statistics pipeline. Built from CLI + optional
/// `.orgstat.toml`; lib callers construct it directly. No component reads
/// ambient state: everything configurable flows through here.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Analysis/combine executable (resolved on PATH when not absolute).
    pub exec: PathBuf,
    /// Worker count; <= 0 means all available hardware parallelism.
    pub concurrency: i64,
    /// Max repository size in bytes; <= 0 disables the limit.
    pub size_limit: i64,
    /// Recompute even when per-repository outputs already exist.
    pub force: bool,
    /// Max artifacts per combine invocation; < 2 disables hierarchical merging.
    pub batch_size: i64,
    /// Filename of the final aggregate artifact.
    pub aggregate_name: String,
    /// Per-invocation wall-clock limit for the external tool. None: unbounded.
    pub timeout: Option<Duration>,
    /// Show a progress bar while the pool drains (CLI).
    pub progress: bool,
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            exec: PathBuf::from(crate::utils::config::ANALYSIS_EXEC_DEFAULT),
            concurrency: -1,
            size_limit: SIZE_LIMIT_DEFAULT,
            force: false,
            batch_size: -1,
            aggregate_name: AGGREGATED_STATISTICS_NAME.to_string(),
            timeout: None,
            progress: false,
            verbose: false,
        }
    }
}

impl Opts {
    /// Effective worker count: the configured value, or all hardware threads
    /// when the configured value is <= 0.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency <= 0 {
            rayon::current_num_threads()
        } else {
            self.concurrency as usize
        }
    }
}

/// Per-item breakdown of one pipeline run. Advisory reporting only; the
/// success/failure contract lives in the aggregation result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped_existing: usize,
    pub skipped_too_large: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(total: usize, outcomes: &[ItemOutcome]) -> Self {
        let mut summary = Self {
            total,
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.kind {
                OutcomeKind::Done => summary.succeeded += 1,
                OutcomeKind::SkippedExisting => summary.skipped_existing += 1,
                OutcomeKind::SkippedTooLarge => summary.skipped_too_large += 1,
                OutcomeKind::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Items that reached a terminal state (everything except never-submitted).
    pub fn attempted(&self) -> usize {
        self.succeeded + self.skipped_existing + self.skipped_too_large + self.failed
    }

    pub fn log(&self) {
        log::info!(
            "{} repositories: {} succeeded, {} reused, {} too large, {} failed",
            self.total,
            self.succeeded,
            self.skipped_existing,
            self.skipped_too_large,
            self.failed
        );
        if self.attempted() < self.total {
            log::warn!(
                "{} of {} repositories were never submitted (cancelled)",
                self.total - self.attempted(),
                self.total
            );
        }
    }
}
