//! Load the repository manifest: a CSV with a header row naming at least the
//! URL and local-directory columns (names configurable). Fields are plain
//! comma-separated values; quoting is not supported since URLs and paths in
//! the manifest never contain commas.

use anyhow::{Result, bail};
use std::path::Path;

use crate::types::WorkItem;

/// Read `path` and build one [`WorkItem`] per data row. `output_dir` is the
/// artifact root shared by all items. Blank lines are skipped; a row missing
/// either field is an error naming the offending line.
pub fn load_manifest(
    path: &Path,
    url_field: &str,
    directory_field: &str,
    output_dir: &Path,
) -> Result<Vec<WorkItem>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading manifest {}: {}", path.display(), e))?;
    let mut lines = text.lines();

    let header = match lines.next() {
        Some(h) => h,
        None => bail!("manifest {} is empty", path.display()),
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let url_idx = column_index(&columns, url_field, path)?;
    let dir_idx = column_index(&columns, directory_field, path)?;

    let mut items = Vec::new();
    for (lineno, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let (Some(url), Some(dir)) = (fields.get(url_idx), fields.get(dir_idx)) else {
            bail!(
                "manifest {} line {}: expected at least {} fields, got {}",
                path.display(),
                lineno + 2,
                url_idx.max(dir_idx) + 1,
                fields.len()
            );
        };
        items.push(WorkItem::new(*url, *dir, output_dir));
    }
    Ok(items)
}

fn column_index(columns: &[&str], field: &str, path: &Path) -> Result<usize> {
    match columns.iter().position(|c| *c == field) {
        Some(idx) => Ok(idx),
        None => bail!(
            "manifest {} should have column \"{}\" but got {:?}",
            path.display(),
            field,
            columns
        ),
    }
}
