//! Concurrent status collection
//!
//! Builds one work unit per element (narrowed by the selector when a query is
//! given) and joins the results in configuration order. Backend-specific
//! status marker columns are re-aligned to a common width so that output from
//! mixed workspaces lines up.

use crate::config::{Configuration, WorkspaceElement, select_element};
use crate::distributor::{Distributor, WorkUnit};
use crate::error::Result;
use crate::vcs::ScmType;

/// Marker field width all backends are aligned to
const ALIGNED_COLUMNS: usize = 8;

/// Status of one element, in configuration order
pub struct ElementStatus {
    pub local_name: String,
    pub scm: ScmType,
    /// Currently checked-out version, when the backend knows one
    pub version: Option<String>,
    /// Aligned status text; `None` or empty means a clean tree
    pub status: Option<String>,
}

/// Collect status for all VCS elements, or the one selected by `query`
pub fn collect_status(
    config: &Configuration,
    query: Option<&str>,
    untracked: bool,
    jobs: Option<usize>,
) -> Result<Vec<ElementStatus>> {
    let targets = narrow(config, query)?;

    let units: Vec<WorkUnit<'_, ElementStatus>> = targets
        .into_iter()
        .map(|element| {
            Box::new(move || {
                let status = element
                    .status(untracked)?
                    .map(|text| align_status_columns(element.scm_type(), &text));
                Ok(ElementStatus {
                    local_name: element.local_name().to_string(),
                    scm: element.scm_type(),
                    version: element.current_version()?,
                    status,
                })
            }) as WorkUnit<'_, ElementStatus>
        })
        .collect();

    Distributor::new(jobs).run(units)
}

/// Elements a status/diff command operates on: one when selected, otherwise
/// every element under version control (plain entries are excluded).
pub(crate) fn narrow<'a>(
    config: &'a Configuration,
    query: Option<&str>,
) -> Result<Vec<&'a WorkspaceElement>> {
    match select_element(config.elements(), query)? {
        Some(element) => Ok(vec![element]),
        None => Ok(config
            .elements()
            .iter()
            .filter(|element| element.is_under_version_control())
            .collect()),
    }
}

/// Re-align a backend's change-type marker columns to [`ALIGNED_COLUMNS`].
///
/// Backends without a known marker width pass through unchanged.
pub(crate) fn align_status_columns(scm: ScmType, status: &str) -> String {
    let Some(columns) = scm.status_columns() else {
        return status.to_string();
    };

    let width = ALIGNED_COLUMNS;
    let mut aligned = String::with_capacity(status.len());
    for line in status.lines() {
        let split = line
            .char_indices()
            .nth(columns)
            .map_or(line.len(), |(index, _)| index);
        let (marker, rest) = line.split_at(split);
        aligned.push_str(&format!("{marker:<width$}"));
        aligned.push_str(rest);
        aligned.push('\n');
    }
    aligned
}
