//! Load `.orgstat.toml` from the working directory (CLI only). Lib callers
//! inject config via `Opts` directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;

#[derive(Debug, Deserialize)]
pub(crate) struct OrgstatToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    exec: Option<String>,
    concurrency: Option<i64>,
    size_limit: Option<i64>,
    force: Option<bool>,
    batch_size: Option<i64>,
    aggregate_name: Option<String>,
    timeout_secs: Option<u64>,
    verbose: Option<bool>,
}

/// Load `.orgstat.toml` from `dir` if present. Returns None when the file is
/// missing or unreadable; a malformed file is logged and ignored.
pub(crate) fn load_orgstat_toml(dir: &Path) -> Option<OrgstatToml> {
    let path = dir.join(".orgstat.toml");
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before
/// applying CLI values so the CLI wins.
pub(crate) fn apply_file_to_opts(file: &OrgstatToml, opts: &mut Opts) {
    let settings = &file.settings;
    if let Some(ref exec) = settings.exec {
        opts.exec = PathBuf::from(exec);
    }
    apply_file_opt!(settings, opts, concurrency);
    apply_file_opt!(settings, opts, size_limit);
    apply_file_opt!(settings, opts, force);
    apply_file_opt!(settings, opts, batch_size);
    if let Some(ref name) = settings.aggregate_name {
        opts.aggregate_name = name.clone();
    }
    if let Some(secs) = settings.timeout_secs {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    apply_file_opt!(settings, opts, verbose);
}
