//! Orgstat CLI: compute per-repository statistics in parallel and merge them.

use anyhow::Result;
use clap::Parser;
use orgstat::engine::Cli;
use orgstat::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
