//! Diff command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::DiffArgs;
use crate::error::Result;
use crate::ops;

/// Run diff command
pub fn run(workspace: Option<PathBuf>, sources: Vec<PathBuf>, args: DiffArgs) -> Result<()> {
    let config = super::load_config(workspace, &sources)?;
    let entries = ops::collect_diff(&config, args.element.as_deref(), args.jobs)?;

    for entry in entries {
        let Some(diff) = entry.diff else {
            continue;
        };
        if diff.trim().is_empty() {
            continue;
        }
        println!("{}", style(&entry.local_name).cyan().bold());
        print!("{diff}");
    }
    Ok(())
}
