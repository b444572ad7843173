//! Install command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::InstallArgs;
use crate::error::{Result, WsyncError};
use crate::ops::{self, InstallOptions, OutcomeKind};

/// Run install command
pub fn run(workspace: Option<PathBuf>, sources: Vec<PathBuf>, args: InstallArgs) -> Result<()> {
    let config = super::load_config(workspace, &sources)?;

    let options = InstallOptions {
        backup_dir: args.backup_dir,
        mode: args.on_conflict,
        robust: args.robust,
        jobs: args.jobs,
    };
    let outcome = ops::install_or_update(&config, &options)?;

    let mut failed = 0;
    for element in &outcome.elements {
        let label = match element.kind {
            OutcomeKind::Installed => style("installed").green(),
            OutcomeKind::Updated => style("updated").green(),
            OutcomeKind::Skipped => style("skipped").yellow(),
            OutcomeKind::Failed => {
                failed += 1;
                style("failed").red().bold()
            }
        };
        match &element.message {
            Some(message) => println!("{label:>10}  {}  ({message})", element.local_name),
            None => println!("{label:>10}  {}", element.local_name),
        }
    }

    if !outcome.success {
        return Err(WsyncError::InstallIncomplete { failed });
    }
    Ok(())
}
