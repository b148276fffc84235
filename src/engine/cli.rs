//! CLI command handler: load the manifest, run the pipeline, report.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::pipeline::run_pipeline_with_cancel;
use crate::utils::config::{DIRECTORY_FIELD_NAME, URL_FIELD_NAME};
use crate::utils::manifest::load_manifest;
use crate::utils::orgstat_toml::{apply_file_to_opts, load_orgstat_toml};
use crate::utils::setup_logging;

/// Defaults -> `.orgstat.toml` (if present) -> CLI flags, in that order.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts {
        progress: true,
        ..Opts::default()
    };
    if let Some(file) = std::env::current_dir()
        .ok()
        .and_then(|d| load_orgstat_toml(&d))
    {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(ref exec) = cli.exec {
        opts.exec = exec.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        opts.concurrency = concurrency;
    }
    if let Some(size_limit) = cli.size_limit {
        opts.size_limit = size_limit;
    }
    if cli.force {
        opts.force = true;
    }
    if let Some(batch_size) = cli.batch_size {
        opts.batch_size = batch_size;
    }
    if let Some(ref name) = cli.aggregate_name {
        opts.aggregate_name = name.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    if cli.verbose {
        opts.verbose = true;
    }
    opts
}

/// Install a Ctrl-C handler that flips the cancel flag: no new repositories
/// are submitted, outstanding invocations finish, the merge still runs over
/// what completed.
fn install_cancel_handler() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        log::warn!("could not install Ctrl-C handler: {}", e);
    }
    cancel
}

/// Run the full pipeline for the parsed CLI. Exits non-zero (via Err) when
/// aggregation fails; per-item failures only affect the summary.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    debug!("ORGSTAT CONFIG:{:#?}", opts);

    let output_dir: PathBuf = cli.output.clone();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let output_dir = output_dir
        .canonicalize()
        .with_context(|| format!("resolving output directory {}", output_dir.display()))?;

    let url_field = cli.url_field_name.as_deref().unwrap_or(URL_FIELD_NAME);
    let directory_field = cli
        .directory_field_name
        .as_deref()
        .unwrap_or(DIRECTORY_FIELD_NAME);
    let items = load_manifest(&cli.input_csv, url_field, directory_field, &output_dir)?;
    info!("{} repositories to process", items.len());

    let cancel = install_cancel_handler();
    let aggregate_path = output_dir.join(&opts.aggregate_name);
    let report = run_pipeline_with_cancel(items, &aggregate_path, &opts, cancel)?;

    report.summary.log();
    match report.aggregate {
        Ok(path) => {
            info!("Aggregated statistics stored at {}", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
