//! Path validation for externally supplied paths.

use crate::CodescopeError;
use std::path::{Component, Path, PathBuf};

/// Normalize `candidate` against `root` and confirm it stays inside the
/// project. Returns the project-relative path on success.
///
/// Normalization is purely lexical (the target may not exist yet); `..`
/// components are folded and any attempt to climb above the root is
/// rejected.
pub fn validate_project_path(root: &Path, candidate: &Path) -> Result<PathBuf, CodescopeError> {
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let root_norm = normalize(root);
    let cand_norm = normalize(&joined);

    match cand_norm.strip_prefix(&root_norm) {
        Ok(rel) => Ok(rel.to_path_buf()),
        Err(_) => Err(CodescopeError::PathEscape(
            candidate.to_string_lossy().into_owned(),
        )),
    }
}

/// Fold `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    // Climbing above the start keeps the parent component so
                    // the strip_prefix check below fails for escapes.
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}
