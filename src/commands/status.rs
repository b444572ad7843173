//! Status command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::StatusArgs;
use crate::error::Result;
use crate::ops;

/// Run status command
pub fn run(workspace: Option<PathBuf>, sources: Vec<PathBuf>, args: StatusArgs) -> Result<()> {
    let config = super::load_config(workspace, &sources)?;
    let entries = ops::collect_status(&config, args.element.as_deref(), args.untracked, args.jobs)?;

    for entry in entries {
        let Some(status) = entry.status else {
            continue;
        };
        if status.trim().is_empty() {
            continue;
        }
        let version = entry.version.as_deref().unwrap_or("-");
        println!(
            "{} {}",
            style(&entry.local_name).cyan().bold(),
            style(format!("({}, {version})", entry.scm)).dim()
        );
        print!("{status}");
    }
    Ok(())
}
