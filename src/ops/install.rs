//! Two-phase install/update orchestration
//!
//! Phase 1 walks the configuration sequentially, asking each element to
//! evaluate its local tree against the declared state and collecting
//! preparation reports. Phase 2 fans the surviving reports out over the work
//! distributor to materialize the changes in parallel.
//!
//! Robust mode converts per-element failures into recorded outcomes and keeps
//! going; without it the first abort or failure terminates the run. Elements
//! after an abort point in phase 1 are never evaluated, and no phase-2 work
//! is started.

use std::fs;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Configuration, WorkspaceElement};
use crate::distributor::{Distributor, WorkUnit};
use crate::error::{Result, WsyncError};
use crate::vcs::{ConflictMode, PreparationReport};

/// Options for one install/update run
pub struct InstallOptions {
    /// Backup directory, relative to the workspace base path
    pub backup_dir: Option<PathBuf>,
    pub mode: ConflictMode,
    /// Continue past per-element failures instead of aborting the run
    pub robust: bool,
    /// Worker cap for the install phase; `None` means one worker per element
    pub jobs: Option<usize>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            backup_dir: None,
            mode: ConflictMode::Abort,
            robust: false,
            jobs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Fresh checkout was created
    Installed,
    /// Existing tree was updated in place
    Updated,
    /// Excluded from the install phase by policy
    Skipped,
    /// Failed, tolerated under robust mode
    Failed,
}

/// Per-element result of an install/update run
#[derive(Debug)]
pub struct ElementOutcome {
    pub local_name: String,
    pub kind: OutcomeKind,
    pub message: Option<String>,
}

/// Result of a whole run: the original boolean contract plus the per-element
/// detail it was computed from.
#[derive(Debug)]
pub struct InstallOutcome {
    /// True only when every element succeeded or was individually tolerated
    pub success: bool,
    pub elements: Vec<ElementOutcome>,
}

/// Make the local filesystem agree with the configuration.
///
/// See the module docs for the phase structure and failure policy.
pub fn install_or_update(config: &Configuration, options: &InstallOptions) -> Result<InstallOutcome> {
    let mut success = true;
    let mut outcomes = Vec::new();

    if !config.base_path().exists() {
        fs::create_dir_all(config.base_path()).map_err(|e| WsyncError::WorkspaceCreateFailed {
            path: config.base_path().display().to_string(),
            reason: e.to_string(),
        })?;
    }

    let abs_backup_path = options
        .backup_dir
        .as_ref()
        .map(|dir| config.base_path().join(dir));

    // Phase 1: sequential preparation, in configuration order
    let mut prepared: Vec<(&WorkspaceElement, PreparationReport)> = Vec::new();
    for element in config.elements() {
        let prepare_result =
            element.prepare_install(abs_backup_path.as_deref(), options.mode, options.robust);
        match prepare_result {
            Ok(None) => {}
            Ok(Some(report)) if report.abort => {
                let reason = report
                    .error
                    .clone()
                    .unwrap_or_else(|| "conflict detected".to_string());
                let err = WsyncError::PreparationAborted {
                    local_name: element.local_name().to_string(),
                    reason: reason.clone(),
                };
                if options.robust {
                    success = false;
                    eprintln!("Continuing despite failure: {err}");
                    outcomes.push(ElementOutcome {
                        local_name: element.local_name().to_string(),
                        kind: OutcomeKind::Failed,
                        message: Some(reason),
                    });
                } else {
                    return Err(err);
                }
            }
            Ok(Some(report)) if report.skip => {
                outcomes.push(ElementOutcome {
                    local_name: element.local_name().to_string(),
                    kind: OutcomeKind::Skipped,
                    message: report.error.clone(),
                });
            }
            Ok(Some(report)) => prepared.push((element, report)),
            Err(e) => {
                let err = WsyncError::PreparationFailed {
                    path: element.path().display().to_string(),
                    reason: e.to_string(),
                };
                if options.robust {
                    success = false;
                    eprintln!("Continuing despite failure: {err}");
                    outcomes.push(ElementOutcome {
                        local_name: element.local_name().to_string(),
                        kind: OutcomeKind::Failed,
                        message: Some(e.to_string()),
                    });
                } else {
                    return Err(err);
                }
            }
        }
    }

    // Phase 2: parallel materialization
    let progress = install_progress(prepared.len() as u64);
    let robust = options.robust;

    let units: Vec<WorkUnit<'_, ElementOutcome>> = prepared
        .iter()
        .map(|(element, report)| {
            let progress = progress.clone();
            Box::new(move || {
                let result = element.install(report);
                progress.inc(1);
                match result {
                    Ok(()) => Ok(ElementOutcome {
                        local_name: element.local_name().to_string(),
                        kind: if report.checkout {
                            OutcomeKind::Installed
                        } else {
                            OutcomeKind::Updated
                        },
                        message: None,
                    }),
                    Err(e) if robust => {
                        progress.println(format!(
                            "Error during install of '{}': {e}",
                            element.local_name()
                        ));
                        Ok(ElementOutcome {
                            local_name: element.local_name().to_string(),
                            kind: OutcomeKind::Failed,
                            message: Some(e.to_string()),
                        })
                    }
                    Err(e) => Err(WsyncError::InstallFailed {
                        local_name: element.local_name().to_string(),
                        reason: e.to_string(),
                    }),
                }
            }) as WorkUnit<'_, ElementOutcome>
        })
        .collect();

    let results = Distributor::new(options.jobs).run_collect(units)?;
    progress.finish_and_clear();

    let mut first_error = None;
    for result in results {
        match result {
            Ok(outcome) => {
                if outcome.kind == OutcomeKind::Failed {
                    success = false;
                }
                outcomes.push(outcome);
            }
            // Robust units never return Err, so any error here aborts the run
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    Ok(InstallOutcome {
        success,
        elements: outcomes,
    })
}

fn install_progress(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
