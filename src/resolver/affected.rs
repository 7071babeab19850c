//! Changed-file impact detection.

use crate::types::Entity;
use std::collections::HashSet;

/// Entities whose definition or any resolved dependency is in `changed_paths`.
///
/// Paths are compared by exact string equality. Output keeps the order of
/// `entities` and contains each record at most once; two records sharing an
/// identifier can both appear.
pub fn find_affected_entities<'a, S: AsRef<str>>(
    entities: &'a [Entity],
    changed_paths: &[S],
) -> Vec<&'a Entity> {
    let changed: HashSet<&str> = changed_paths.iter().map(AsRef::as_ref).collect();
    if changed.is_empty() {
        return Vec::new();
    }

    entities
        .iter()
        .filter(|entity| entity.files().any(|file| changed.contains(file)))
        .collect()
}

/// Rewrite repository-relative changed paths to be relative to a pack that
/// lives at `pack_prefix` inside the repository.
///
/// Paths outside the pack are dropped. An empty (or `.`) prefix means the
/// pack is the repository root and paths pass through unchanged.
pub fn to_pack_relative<S: AsRef<str>>(pack_prefix: &str, changed_paths: &[S]) -> Vec<String> {
    let prefix = pack_prefix
        .trim_start_matches("./")
        .trim_end_matches('/');

    if prefix.is_empty() || prefix == "." {
        return changed_paths
            .iter()
            .map(|path| path.as_ref().to_string())
            .collect();
    }

    changed_paths
        .iter()
        .filter_map(|path| {
            path.as_ref()
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('/'))
        })
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .collect()
}
