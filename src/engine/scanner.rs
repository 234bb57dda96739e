// src/engine/scanner.rs

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// List a directory's regular files for one poll cycle.
///
/// Returns a name → absolute-ish path mapping (paths are `root` joined with
/// the entry name, so they are as absolute as `root` itself is).
/// Subdirectories are skipped; symlinks count as files if their target is a
/// regular file. A name that is not valid UTF-8 is skipped: patterns are
/// strings, so such an entry could never match anything.
pub fn scan_directory(root: &Path) -> Result<HashMap<String, PathBuf>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("listing directory {:?}", root))?;

    let mut files = HashMap::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {:?}", root))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                files.insert(name, path);
            }
            Err(name) => {
                debug!(?name, "skipping non-UTF-8 file name");
            }
        }
    }

    Ok(files)
}
