//! Input file list: glob expansion and existence checks.

use anyhow::{bail, Context, Result};
use log::warn;
use std::path::PathBuf;

/// Expand the command-line file arguments into a sorted, deduplicated list.
///
/// Arguments containing glob metacharacters are expanded; a pattern that
/// matches nothing only warns. A plain path that doesn't exist is an error.
pub fn make_file_list(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for arg in args {
        if is_pattern(arg) {
            let matches: Vec<PathBuf> = glob::glob(arg)
                .with_context(|| format!("invalid glob pattern: {}", arg))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect();
            if matches.is_empty() {
                warn!("no files matched: {}", arg);
            }
            files.extend(matches);
            continue;
        }

        let path = PathBuf::from(arg);
        if !path.is_file() {
            bail!("file '{}' couldn't be accessed", arg);
        }
        files.push(path);
    }

    if files.is_empty() {
        bail!("no input files");
    }
    // lexicographic order decides which duplicate definition wins
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}
