//! Version command implementation

use crate::error::Result;
use crate::vcs::VcsRegistry;

/// Run version command
pub fn run() -> Result<()> {
    println!("wsync {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());

    let registry = VcsRegistry::with_defaults();
    let backends: Vec<String> = registry
        .registered()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("  VCS backends: {}", backends.join(", "));

    Ok(())
}

fn rustc_version() -> &'static str {
    // This will be the version of rustc used to compile
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
