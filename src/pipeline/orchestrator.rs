//! Main orchestrator: worker pool over all items, validity filter over the
//! produced artifacts, then the hierarchical merge.

use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::engine::validate::is_valid;
use crate::pipeline::pool::run_pool;
use crate::pipeline::reduce::{ReduceError, merge_artifacts};
use crate::types::{ItemOutcome, Opts, RunSummary, WorkItem};

/// Everything one pipeline run produced. The per-item breakdown is always
/// present; `aggregate` carries the success/failure contract.
pub struct PipelineReport {
    pub outcomes: Vec<ItemOutcome>,
    pub summary: RunSummary,
    pub aggregate: Result<PathBuf, ReduceError>,
}

/// Run the full pipeline: process `items`, filter the artifacts, merge into
/// `aggregate_path`. Per-item failures land in the report; only setup
/// problems (thread panics) surface as Err.
pub fn run_pipeline(
    items: Vec<WorkItem>,
    aggregate_path: &Path,
    opts: &Opts,
) -> Result<PipelineReport> {
    run_pipeline_with_cancel(items, aggregate_path, opts, Arc::new(AtomicBool::new(false)))
}

/// [`run_pipeline`] with an external cancellation flag: once set, no new items
/// are submitted; everything already running finishes and the merge still
/// covers whatever completed.
pub fn run_pipeline_with_cancel(
    items: Vec<WorkItem>,
    aggregate_path: &Path,
    opts: &Opts,
    cancel: Arc<AtomicBool>,
) -> Result<PipelineReport> {
    let total = items.len();
    let outcomes = run_pool(items, opts, cancel)?;
    let summary = RunSummary::from_outcomes(total, &outcomes);

    info!("Start merging of statistics...");
    let produced: Vec<PathBuf> = outcomes
        .iter()
        .filter_map(|o| o.artifact.clone())
        .collect();
    let valid = filter_valid(produced);
    let aggregate = merge_artifacts(&valid, aggregate_path, opts);

    Ok(PipelineReport {
        outcomes,
        summary,
        aggregate,
    })
}

/// Drop artifacts the validator rejects, keeping the stable input order.
/// Corrupt artifacts are logged and excluded, never escalated.
pub fn filter_valid(artifacts: Vec<PathBuf>) -> Vec<PathBuf> {
    artifacts
        .into_iter()
        .filter(|path| {
            if is_valid(path) {
                true
            } else {
                warn!(
                    "bad start date in {} - excluding from merge",
                    path.display()
                );
                false
            }
        })
        .collect()
}
