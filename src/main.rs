//! wsync - workspace synchronizer
//!
//! A command line tool that keeps a workspace of independently
//! version-controlled source trees in agreement with a declarative
//! configuration: missing trees are checked out, existing trees updated,
//! and conflicting local state is backed up, skipped, or aborted on per
//! policy. Status and diff queries run concurrently across all trees.

use clap::Parser;

mod cli;
mod commands;
mod config;
mod distributor;
mod error;
mod ops;
mod vcs;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.workspace, cli.config, args),
        Commands::Status(args) => commands::status::run(cli.workspace, cli.config, args),
        Commands::Diff(args) => commands::diff::run(cli.workspace, cli.config, args),
        Commands::Snapshot(args) => commands::snapshot::run(cli.workspace, cli.config, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
