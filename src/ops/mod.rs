//! High-level operations over an aggregated configuration
//!
//! - `install.rs`: two-phase prepare/install orchestration
//! - `status.rs`: concurrent status collection with column realignment
//! - `diff.rs`: concurrent diff collection

pub mod diff;
pub mod install;
pub mod status;

pub use diff::collect_diff;
pub use install::{InstallOptions, OutcomeKind, install_or_update};
pub use status::collect_status;
