//! Size-based admission control: measure a repository and decide whether it
//! should be processed at all.

use std::path::Path;
use walkdir::WalkDir;

/// True when the item should be processed: no limit configured (`limit <= 0`)
/// or the measured size fits. Pure.
pub fn admit(size: u64, limit: i64) -> bool {
    limit <= 0 || size <= limit as u64
}

/// Best-effort total size of the files under `loc`, in bytes. Entries that
/// cannot be walked or stat'd are skipped and the rest summed; an entirely
/// unreadable tree measures 0.
pub fn dir_size(loc: &Path) -> u64 {
    let mut total = 0u64;
    for entry in WalkDir::new(loc).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            total += meta.len();
        }
    }
    total
}
