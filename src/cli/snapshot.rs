use clap::Parser;
use std::path::PathBuf;

/// Arguments for the snapshot command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Persist the aggregated configuration:\n    wsync snapshot effective.yaml")]
pub struct SnapshotArgs {
    /// File to write the aggregated configuration to
    pub output: PathBuf,
}
