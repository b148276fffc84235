//! Progress bar utilities for displaying processing status.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

/// Shared progress bar handle updated from the collecting thread.
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a progress bar for `total` items, or None when progress display is
/// off (lib callers, tests).
pub fn maybe_progress_bar(enabled: bool, total: usize, desc: &'static str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    Some(Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        unit = " repos"
    ))))
}

/// Advance the bar by `n`. Uses try_lock so a contended bar never blocks the
/// caller; a missed update is caught up by the next one.
pub fn update_progress_bar(pb: &Option<ProgressBar>, n: usize) {
    if let Some(pb) = pb
        && let Ok(mut bar) = pb.try_lock()
    {
        let _ = bar.update(n);
    }
}

/// Force a refresh so the bar shows "0 / total" before the first completion.
pub fn refresh_bar(pb: &Option<ProgressBar>) {
    if let Some(pb) = pb
        && let Ok(mut bar) = pb.try_lock()
    {
        let _ = bar.refresh();
    }
}
