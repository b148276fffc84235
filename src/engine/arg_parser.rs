use clap::Parser;
use std::path::PathBuf;

/// Compute per-repository statistics in parallel and merge them into one
/// aggregate artifact.
#[derive(Clone, Parser)]
#[command(name = "orgstat")]
#[command(about = "Run an analysis tool over many repositories and merge the results.")]
pub struct Cli {
    /// Path to the CSV listing repositories (columns: url, directory).
    #[arg(long, short = 'i')]
    pub input_csv: PathBuf,

    /// Directory where per-repository and aggregate artifacts are stored.
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Analysis/combine executable. Default: `hercules` on PATH.
    #[arg(long)]
    pub exec: Option<PathBuf>,

    /// Worker count. <= 0 uses all available cores.
    #[arg(long, short = 'n')]
    pub concurrency: Option<i64>,

    /// Max repository size in bytes; repositories above it are skipped.
    /// <= 0 disables the limit. Default: 256 MiB.
    #[arg(long, short = 's')]
    pub size_limit: Option<i64>,

    /// Recompute statistics even when a per-repository artifact already exists
    /// (the aggregate is always rewritten).
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Max artifacts merged per combine invocation (hierarchical merge).
    /// < 2 merges everything in a single invocation.
    #[arg(long)]
    pub batch_size: Option<i64>,

    /// Name of the URL column in the input CSV.
    #[arg(long)]
    pub url_field_name: Option<String>,

    /// Name of the directory column in the input CSV.
    #[arg(long)]
    pub directory_field_name: Option<String>,

    /// Filename of the aggregate artifact, created under the output directory.
    #[arg(long)]
    pub aggregate_name: Option<String>,

    /// Kill an analysis/combine invocation after this many seconds and count
    /// it as failed. Unset: no timeout.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
