//! Element selection
//!
//! Resolves a user-supplied local name or path to exactly one configured
//! element. Local-name matches are authoritative and short-circuit on the
//! first hit; path matches are a looser heuristic where the last declared
//! match wins, mirroring the aggregator's override-last semantics.

use std::path::{Path, PathBuf};

use crate::error::{Result, WsyncError};

use super::element::WorkspaceElement;
use super::lexical_normalize;

/// Narrow the element list to one element, or `None` when no query is given
/// (meaning: operate on all elements).
pub fn select_element<'a>(
    elements: &'a [WorkspaceElement],
    query: Option<&str>,
) -> Result<Option<&'a WorkspaceElement>> {
    let Some(query) = query else {
        return Ok(None);
    };

    let query_path = comparable_path(Path::new(query));
    let mut path_candidate = None;

    for element in elements {
        if element.local_name() == query {
            return Ok(Some(element));
        }
        if query_path == comparable_path(element.path()) {
            path_candidate = Some(element);
        }
    }

    path_candidate
        .map(Some)
        .ok_or_else(|| WsyncError::SelectionFailed {
            query: query.to_string(),
        })
}

/// Comparable form of a path: canonical when it exists on disk, otherwise
/// absolutized and lexically normalized, so declared-but-not-yet-checked-out
/// trees can still be matched by path.
fn comparable_path(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        lexical_normalize(&absolute)
    })
}
