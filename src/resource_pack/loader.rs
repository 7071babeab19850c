//! Resource pack discovery from directories.

use super::ResourcePack;
use crate::error::{PreviewError, Result};
use crate::report::Reporter;
use std::path::Path;
use walkdir::WalkDir;

/// Load a resource pack from a directory path.
///
/// Every regular file below `path` is recorded. Entries that cannot be read
/// are skipped; only an unreadable root is an error.
pub fn load_from_path<P: AsRef<Path>>(path: P, reporter: &dyn Reporter) -> Result<ResourcePack> {
    let path = path.as_ref();

    if !path.is_dir() {
        return Err(PreviewError::InvalidResourcePack(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    load_from_directory(path, reporter)
}

fn load_from_directory(root: &Path, reporter: &dyn Reporter) -> Result<ResourcePack> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                reporter.debug(&format!("Skipping unreadable entry: {}", e));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(relative) = relative_path(root, entry.path()) {
            files.push(relative);
        }
    }

    Ok(ResourcePack::new(root, files))
}

/// Path of `path` relative to `root`, with `/` separators.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let relative = relative.to_string_lossy().replace('\\', "/");
    if relative.is_empty() {
        None
    } else {
        Some(relative)
    }
}
