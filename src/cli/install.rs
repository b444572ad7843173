use clap::Parser;
use std::path::PathBuf;

use crate::vcs::ConflictMode;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Sync the whole workspace:\n    wsync install\n\n\
                  Back up conflicting trees before replacing them:\n    \
                  wsync install --on-conflict backup --backup-dir .backup\n\n\
                  Keep going past failing elements:\n    wsync install --robust\n\n\
                  Cap install parallelism:\n    wsync install --jobs 4")]
pub struct InstallArgs {
    /// How to resolve a tree that conflicts with its declaration
    #[arg(long = "on-conflict", value_enum, default_value = "abort")]
    pub on_conflict: ConflictMode,

    /// Directory (relative to the workspace) to move conflicting trees into
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Continue with remaining elements when one fails
    #[arg(long)]
    pub robust: bool,

    /// Maximum number of parallel install workers (default: one per element)
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Commands};
    use super::*;
    use clap::Parser;

    #[test]
    fn test_install_defaults() {
        let cli = Cli::try_parse_from(["wsync", "install"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.on_conflict, ConflictMode::Abort);
                assert_eq!(args.backup_dir, None);
                assert!(!args.robust);
                assert_eq!(args.jobs, None);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_install_backup_mode() {
        let cli = Cli::try_parse_from([
            "wsync",
            "install",
            "--on-conflict",
            "backup",
            "--backup-dir",
            ".backup",
            "--robust",
            "-j",
            "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.on_conflict, ConflictMode::Backup);
                assert_eq!(args.backup_dir, Some(PathBuf::from(".backup")));
                assert!(args.robust);
                assert_eq!(args.jobs, Some(4));
            }
            _ => panic!("Expected Install command"),
        }
    }
}
