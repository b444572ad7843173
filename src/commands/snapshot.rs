//! Snapshot command implementation
//!
//! Writes the effective (aggregated, deduplicated) configuration back out in
//! the source file format. The write is atomic (temp file + rename) so a
//! concurrent reader never sees a partial file.

use std::fs;
use std::path::PathBuf;

use crate::cli::SnapshotArgs;
use crate::error::{Result, WsyncError};

/// Run snapshot command
pub fn run(workspace: Option<PathBuf>, sources: Vec<PathBuf>, args: SnapshotArgs) -> Result<()> {
    let config = super::load_config(workspace, &sources)?;
    let yaml = config.to_yaml()?;

    let map_err = |path: &PathBuf, e: std::io::Error| WsyncError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let tmp_path = args.output.with_extension("yaml.tmp");
    fs::write(&tmp_path, &yaml).map_err(|e| map_err(&tmp_path, e))?;
    fs::rename(&tmp_path, &args.output).map_err(|e| map_err(&args.output, e))?;

    println!(
        "Wrote {} element(s) to {}",
        config.elements().len(),
        args.output.display()
    );
    Ok(())
}
