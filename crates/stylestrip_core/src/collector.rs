use ignore::WalkBuilder;
use log::{debug, trace};
use std::{
    io,
    path::{Path, PathBuf},
};

use crate::error::StyleError;

pub struct CollectorConfig {
    /// Names (or name prefixes) of directories that root a per-page subtree
    pub start_with_dir: Vec<String>,
    /// File name suffix of stylesheets to collect
    pub end_with_file: String,
    /// Require directory names to equal an entry of `start_with_dir` instead of starting with it
    pub full_match: bool,
}

/// Returns true when a directory called `name` roots a per-page subtree.
pub fn dir_matches(name: &str, start_with_dir: &[String], full_match: bool) -> bool {
    start_with_dir
        .iter()
        .any(|start| if full_match { name == start } else { name.starts_with(start.as_str()) })
}

/// Collects stylesheets under `dir` in depth-first order, entries sorted by name.
///
/// Only the immediate subdirectories of `dir` are matched against
/// `start_with_dir`; once a subtree is entered, every descendant directory is
/// eligible regardless of its own name. Stylesheets sitting directly in `dir`
/// are skipped unless `further` is set, in which case `dir` is treated as part
/// of an already matched subtree.
pub fn collect_styles(
    cfg: &CollectorConfig,
    dir: &Path,
    further: bool,
) -> Result<Vec<PathBuf>, StyleError> {
    debug!("Collecting stylesheets ending with '{}'", cfg.end_with_file);
    debug!("Walking directory tree from: {}", dir.display());

    let start_with_dir = cfg.start_with_dir.clone();
    let full_match = cfg.full_match;
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |dent| {
            if further || dent.depth() != 1 || !dent.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            let name = dent.file_name().to_string_lossy();
            let matched = dir_matches(&name, &start_with_dir, full_match);
            if !matched {
                trace!("Skipping unmatched directory: {}", dent.path().display());
            }
            matched
        })
        .build();

    let mut files = Vec::new();
    for res in walker {
        let dent = res.map_err(|e| walk_error(dir, e))?;
        if !dent.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !further && dent.depth() < 2 {
            trace!("Skipping top-level file: {}", dent.path().display());
            continue;
        }
        if dent.file_name().to_string_lossy().ends_with(cfg.end_with_file.as_str()) {
            trace!("Found stylesheet: {}", dent.path().display());
            files.push(dent.into_path());
        }
    }

    debug!("Collected {} stylesheets", files.len());
    Ok(files)
}

fn walk_error(root: &Path, err: ignore::Error) -> StyleError {
    let msg = err.to_string();
    let source = err.into_io_error().unwrap_or_else(|| io::Error::other(msg));
    StyleError::fs(root, source)
}
