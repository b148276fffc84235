//! Orgstat: run an external analysis tool over many repositories in parallel
//! and merge the per-repository binary artifacts into one aggregate.

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::Path;

/// Result alias used by public orgstat API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use pipeline::{PipelineReport, ReduceError};

/// Single entry point: process `items` with `opts` and merge the results into
/// `aggregate_path`. Per-item failures never abort the batch; the returned
/// report carries the per-item breakdown and the aggregation result.
pub fn aggregate_repositories(
    items: Vec<WorkItem>,
    aggregate_path: &Path,
    opts: &Opts,
) -> Result<PipelineReport> {
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);
    pipeline::run_pipeline(items, aggregate_path, opts)
}
