//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - install: Install/update command arguments
//! - status: Status command arguments
//! - diff: Diff command arguments
//! - snapshot: Snapshot command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod diff;
pub mod install;
pub mod snapshot;
pub mod status;

pub use completions::CompletionsArgs;
pub use diff::DiffArgs;
pub use install::InstallArgs;
pub use snapshot::SnapshotArgs;
pub use status::StatusArgs;

/// wsync - workspace synchronizer
///
/// Keep a workspace of independently version-controlled source trees in
/// agreement with a declarative configuration.
#[derive(Parser, Debug)]
#[command(
    name = "wsync",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Sync a workspace of version-controlled source trees against a declarative configuration",
    long_about = "wsync reads a declarative list of source trees (a wsync.yaml per workspace, \
                  plus any extra --config sources), checks out trees that are missing, updates \
                  trees that exist, and reports status and diffs across the whole workspace \
                  concurrently.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  wsync install                          \x1b[90m# Sync the workspace with wsync.yaml\x1b[0m\n   \
                  wsync install --on-conflict backup \\\n                 --backup-dir .backup        \x1b[90m# Move conflicting trees aside first\x1b[0m\n   \
                  wsync status                           \x1b[90m# Aggregate status across all trees\x1b[0m\n   \
                  wsync status tools/ros_comm            \x1b[90m# Status of one element\x1b[0m\n   \
                  wsync diff                             \x1b[90m# Aggregate diff across all trees\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Workspace directory (defaults to current directory)
    #[arg(long, short = 'w', global = true, env = "WSYNC_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Additional configuration sources (files, or directories containing wsync.yaml)
    #[arg(long = "config", short = 'c', global = true, value_name = "SOURCE")]
    pub config: Vec<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check out missing trees and update existing ones
    Install(InstallArgs),

    /// Show aggregate status across workspace trees
    Status(StatusArgs),

    /// Show local changes across workspace trees
    Diff(DiffArgs),

    /// Write the effective (aggregated) configuration to a file
    Snapshot(SnapshotArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
