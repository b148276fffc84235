//! Application configuration constants.
//! Defaults and caps in one place.

// ---- External tool ----

/// Default analysis/combine executable name (looked up on PATH).
pub const ANALYSIS_EXEC_DEFAULT: &str = "hercules";

/// Subcommand that merges several artifacts into one on stdout.
pub const COMBINE_SUBCOMMAND: &str = "combine";

// ---- Admission ----

/// Default repository size limit in bytes (0.25 GiB). <= 0 disables the limit.
pub const SIZE_LIMIT_DEFAULT: i64 = 1024 * 1024 * 1024 / 4;

// ---- Artifacts ----

/// Per-repository artifact filename, written under `output/<owner>/<name>/`.
pub const STATISTICS_FILENAME: &str = "statistics.pb";

/// Default filename of the final aggregate artifact.
pub const AGGREGATED_STATISTICS_NAME: &str = "aggregated_statistics.pb";

/// Prefix for the reducer's per-run temporary directory.
pub const MERGE_TMP_PREFIX: &str = "orgstat_merge_";

// ---- Manifest (CSV) ----

/// Default header name of the repository URL column.
pub const URL_FIELD_NAME: &str = "url";

/// Default header name of the local directory column.
pub const DIRECTORY_FIELD_NAME: &str = "directory";

// ---- Command runner ----

/// Captured stderr is truncated to this many bytes. A misbehaving tool can
/// emit unbounded error output; reporting only needs the head.
pub const STDERR_CAPTURE_CAP: usize = 64 * 1024;

/// Poll interval while waiting on a child with a timeout configured.
pub const CHILD_POLL_INTERVAL_MS: u64 = 50;

// ---- Artifact validation ----

/// Max bytes read from an artifact when extracting the header timestamp.
/// The header message precedes the (large) contents map, so a short prefix
/// always suffices.
pub const HEADER_SCAN_CAP: usize = 16 * 1024;

// ---- Worker pool ----

/// Capacity of the outcome channel. Items themselves go over a rendezvous
/// channel so "submitted" means "picked up by a worker" and cancellation can
/// stop submission promptly.
pub const OUTCOME_CHANNEL_CAP: usize = 1024;
