//! Logical asset names and their mapping onto real filesystem paths.

use std::path::{Path, PathBuf};

use crate::AssetError;

/// Convert every `\` separator in a logical name to `/`.
pub fn canonical_name(name: &str) -> String {
    name.replace('\\', "/")
}

/// Join a child name onto a logical container name.
///
/// The empty name denotes the bundle root, so joining onto it yields the
/// child unchanged.
pub fn join_name(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches(['/', '\\']);
    if parent.is_empty() {
        child.to_owned()
    } else {
        format!("{parent}/{child}")
    }
}

/// Map a logical name to a path under `root`.
///
/// The name is canonicalized and split on `/`; each component is joined
/// onto `root` in order. Empty and `.` components are skipped. `..` is
/// passed through untouched: names are expected to come from a trusted,
/// pre-built bundle. Use [`resolve_path_checked`] when they may not.
pub fn resolve_path(root: &Path, name: &str) -> PathBuf {
    let canonical = canonical_name(name);
    let mut path = root.to_path_buf();
    for component in canonical.split('/') {
        if component.is_empty() || component == "." {
            continue;
        }
        path.push(component);
    }
    path
}

/// Like [`resolve_path`], but rejects names that could escape `root`.
pub fn resolve_path_checked(root: &Path, name: &str) -> Result<PathBuf, AssetError> {
    let normalized = normalize(name)?;
    Ok(resolve_path(root, &normalized))
}

/// Normalize a logical name.
///
/// - Replaces backslashes with forward slashes
/// - Collapses redundant separators (`a///b` → `a/b`)
/// - Drops `.` segments
/// - Rejects `..` segments (path traversal not allowed)
/// - Strips leading and trailing slashes
///
/// Returns `Err(AssetError::InvalidPath)` if the name is empty or contains `..`.
pub fn normalize(name: &str) -> Result<String, AssetError> {
    let replaced = canonical_name(name);
    let mut segments = Vec::new();

    for segment in replaced.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(AssetError::InvalidPath(format!(
                "path traversal (..) not allowed in {name:?}"
            )));
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return Err(AssetError::InvalidPath("empty name".into()));
    }

    Ok(segments.join("/"))
}

/// Canonical lookup key for a bundle.
///
/// Uses the same components [`resolve_path`] joins: backslashes converted,
/// empty and `.` segments dropped, `..` kept. The bundle root is the empty
/// key.
pub(crate) fn lookup_key(name: &str) -> String {
    canonical_name(name)
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
