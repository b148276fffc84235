//! Per-repository processing: measure, reuse-or-admit, then run the analysis
//! tool with a one-shot fallback.

use log::{debug, error, info};
use std::path::PathBuf;
use std::time::Instant;

use crate::engine::admission::{admit, dir_size};
use crate::engine::command::run_to_file;
use crate::types::{ItemOutcome, Opts, OutcomeKind, WorkItem};

/// Flag set for a full analysis pass. Opaque configuration of the external
/// tool; not reinterpreted here.
pub const ANALYSIS_FLAGS: &[&str] = &[
    "--pb",
    "--burndown",
    "--burndown-people",
    "--devs",
    "--couples",
    "--hibernation-distance=1000",
    "--skip-blacklist",
];

/// Appended on the retry pass. First-parent traversal trades fidelity on merge
/// commits for robustness; the tool is empirically flakier on full histories.
pub const FALLBACK_FLAG: &str = "--first-parent";

/// Process one [`WorkItem`] to a terminal [`ItemOutcome`]. Never returns an
/// error: every failure mode becomes an outcome so one bad repository cannot
/// take the batch down.
pub fn process_item(item: &WorkItem, opts: &Opts) -> ItemOutcome {
    let start = Instant::now();
    let dest = item.artifact_dest();

    if !item.repo_path.is_absolute() || !item.repo_path.is_dir() {
        let err = format!(
            "repository path {} is not an absolute directory",
            item.repo_path.display()
        );
        error!("{}: {}", item.url, err);
        return outcome(item, 0, start, OutcomeKind::Failed, Some(err), None);
    }

    let repo_size = dir_size(&item.repo_path);

    if dest.is_file() && !opts.force {
        debug!(
            "{}: statistics already calculated at {} - skipping",
            item.url,
            dest.display()
        );
        return outcome(
            item,
            repo_size,
            start,
            OutcomeKind::SkippedExisting,
            None,
            Some(dest),
        );
    }

    if !admit(repo_size, opts.size_limit) {
        let err = format!(
            "repository {} is too large: {} bytes > {} - skipping",
            item.repo_path.display(),
            repo_size,
            opts.size_limit
        );
        error!("{}", err);
        return outcome(
            item,
            repo_size,
            start,
            OutcomeKind::SkippedTooLarge,
            Some(err),
            None,
        );
    }

    if let Some(parent) = dest.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        let err = format!("creating {}: {}", parent.display(), e);
        error!("{}: {}", item.url, err);
        return outcome(item, repo_size, start, OutcomeKind::Failed, Some(err), None);
    }

    let mut args: Vec<String> = ANALYSIS_FLAGS.iter().map(|f| f.to_string()).collect();
    args.push(item.repo_path.display().to_string());

    match run_to_file(&opts.exec, &args, &dest, opts.timeout) {
        Ok(()) => {
            return outcome(
                item,
                repo_size,
                start,
                OutcomeKind::Done,
                None,
                Some(dest),
            );
        }
        Err(primary) => {
            error!("{}: {}", item.url, primary);
            error!("{}: falling back to first-parent history", item.url);
        }
    }

    args.push(FALLBACK_FLAG.to_string());
    match run_to_file(&opts.exec, &args, &dest, opts.timeout) {
        Ok(()) => {
            info!("{}: fallback succeeded", item.url);
            outcome(item, repo_size, start, OutcomeKind::Done, None, Some(dest))
        }
        Err(fallback) => {
            let err = fallback.to_string();
            error!("{}: {}", item.url, err);
            outcome(item, repo_size, start, OutcomeKind::Failed, Some(err), None)
        }
    }
}

fn outcome(
    item: &WorkItem,
    repo_size: u64,
    start: Instant,
    kind: OutcomeKind,
    error: Option<String>,
    artifact: Option<PathBuf>,
) -> ItemOutcome {
    ItemOutcome {
        url: item.url.clone(),
        repo_size,
        duration: start.elapsed(),
        error,
        artifact,
        kind,
    }
}
