//! Hierarchical merge of per-repository artifacts into one aggregate.
//!
//! The combine operation is set-union-like and order-insensitive across
//! batches; within a batch the stable input order is preserved. Intermediate
//! artifacts live in a uniquely named per-run temporary directory that is
//! removed on every exit path.

use log::{debug, error, warn};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

use crate::engine::command::{CommandError, run_to_file};
use crate::types::Opts;
use crate::utils::config::{COMBINE_SUBCOMMAND, MERGE_TMP_PREFIX};

/// Terminal failure of the reduction stage.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("nothing to merge: no valid statistics were produced")]
    NothingToMerge,

    #[error("aggregation failed: every merge batch failed")]
    AllMergesFailed,

    #[error("cannot prepare merge workspace: {0}")]
    Workspace(#[from] std::io::Error),
}

/// Merge `artifacts` into one aggregate at `output`.
///
/// With `batch_size < 2` (or when everything fits in one batch) this is a
/// single combine invocation. Otherwise the list is repeatedly partitioned
/// into consecutive batches of at most `batch_size`, each batch merged into a
/// fresh temporary artifact, failed or empty sub-merges dropped, until the
/// working list fits one final combine into `output`.
pub fn merge_artifacts(
    artifacts: &[PathBuf],
    output: &Path,
    opts: &Opts,
) -> Result<PathBuf, ReduceError> {
    if artifacts.is_empty() {
        return Err(ReduceError::NothingToMerge);
    }

    // batch_size == 1 would merge single files into themselves forever.
    let batch_size = if opts.batch_size < 2 {
        usize::MAX
    } else {
        opts.batch_size as usize
    };

    let mut stack: Vec<PathBuf> = artifacts.to_vec();
    // Intermediates live here. The directory must outlive the final combine,
    // which reads them; it is removed when it drops, on every exit path.
    let tmp_dir = if stack.len() > batch_size {
        Some(TempDir::with_prefix(MERGE_TMP_PREFIX)?)
    } else {
        None
    };
    if let Some(tmp_dir) = &tmp_dir {
        let mut merge_counter = 0usize;

        while stack.len() > batch_size {
            let mut survivors = Vec::new();
            for batch in stack.chunks(batch_size) {
                let tmp_out = tmp_dir.path().join(format!("{merge_counter}.pb"));
                match combine(batch, &tmp_out, opts) {
                    Ok(()) => match std::fs::metadata(&tmp_out) {
                        Ok(meta) if meta.len() > 0 => survivors.push(tmp_out),
                        _ => warn!(
                            "merge {} produced an empty artifact - dropping its batch",
                            merge_counter
                        ),
                    },
                    Err(e) => error!("merge batch failed: {}", e),
                }
                merge_counter += 1;
                debug!("number of merges: {}", merge_counter);
            }
            if survivors.is_empty() {
                return Err(ReduceError::AllMergesFailed);
            }
            stack = survivors;
        }
    }

    match combine(&stack, output, opts) {
        Ok(()) => Ok(output.to_path_buf()),
        Err(e) => {
            error!("final merge failed: {}", e);
            Err(ReduceError::AllMergesFailed)
        }
    }
}

/// One combine invocation: merge `inputs` into `output` via the external tool.
fn combine(inputs: &[PathBuf], output: &Path, opts: &Opts) -> Result<(), CommandError> {
    let mut args = vec![COMBINE_SUBCOMMAND.to_string()];
    args.extend(inputs.iter().map(|p| p.display().to_string()));
    run_to_file(&opts.exec, &args, output, opts.timeout)
}
