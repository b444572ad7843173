//! Concurrent diff collection
//!
//! Same shape as status collection: one work unit per element, results joined
//! in configuration order. Diff text is passed through unmodified.

use crate::config::Configuration;
use crate::distributor::{Distributor, WorkUnit};
use crate::error::Result;

use super::status::narrow;

/// Diff of one element, in configuration order
pub struct ElementDiff {
    pub local_name: String,
    /// Unified diff text; `None` means no local changes
    pub diff: Option<String>,
}

/// Collect diffs for all VCS elements, or the one selected by `query`
pub fn collect_diff(
    config: &Configuration,
    query: Option<&str>,
    jobs: Option<usize>,
) -> Result<Vec<ElementDiff>> {
    let targets = narrow(config, query)?;

    let units: Vec<WorkUnit<'_, ElementDiff>> = targets
        .into_iter()
        .map(|element| {
            Box::new(move || {
                Ok(ElementDiff {
                    local_name: element.local_name().to_string(),
                    diff: element.diff()?,
                })
            }) as WorkUnit<'_, ElementDiff>
        })
        .collect();

    Distributor::new(jobs).run(units)
}
