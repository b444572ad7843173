//! Command implementations
//!
//! Each submodule wires one CLI subcommand to the operations layer:
//! aggregate the configuration, run the operation, print the result.

use std::path::PathBuf;

use crate::config::{self, Configuration};
use crate::error::Result;
use crate::vcs::VcsRegistry;

pub mod completions;
pub mod diff;
pub mod install;
pub mod snapshot;
pub mod status;
pub mod version;

/// Workspace base path: the `-w` flag, or the current directory
fn resolve_workspace(workspace: Option<PathBuf>) -> PathBuf {
    workspace.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Aggregate the workspace configuration for one command invocation
fn load_config(workspace: Option<PathBuf>, sources: &[PathBuf]) -> Result<Configuration> {
    let base_path = resolve_workspace(workspace);
    let registry = VcsRegistry::with_defaults();
    config::aggregate(
        sources,
        &base_path,
        config::WORKSPACE_CONFIG_FILE,
        &registry,
    )
}
