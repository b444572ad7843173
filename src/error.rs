//! Error types and handling for wsync
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//! All fallible operations in the crate return [`Result`].

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for wsync operations
#[derive(Error, Diagnostic, Debug)]
pub enum WsyncError {
    // Configuration errors
    #[error("No configuration sources found at '{searched}'")]
    #[diagnostic(
        code(wsync::config::no_sources),
        help("Create a wsync.yaml in the workspace or pass one or more --config sources")
    )]
    NoConfigSources { searched: String },

    #[error("Configuration contains no elements")]
    #[diagnostic(code(wsync::config::empty))]
    EmptyConfiguration,

    #[error("Element '{local_name}' declares scm type '{scm}' but no backend is registered for it")]
    #[diagnostic(
        code(wsync::config::unsupported_scm),
        help("Bundled backends: git, plain ('other'). Register additional backends via VcsRegistry")
    )]
    UnsupportedScm { local_name: String, scm: String },

    #[error("Element '{local_name}' ({scm}) is missing a uri")]
    #[diagnostic(code(wsync::config::missing_uri))]
    MissingUri { local_name: String, scm: String },

    // Declaration source errors
    #[error("Configuration source not found: {path}")]
    #[diagnostic(code(wsync::source::not_found))]
    SourceNotFound { path: String },

    #[error("Failed to read configuration source '{path}': {reason}")]
    #[diagnostic(code(wsync::source::read_failed))]
    SourceReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration source '{path}': {reason}")]
    #[diagnostic(
        code(wsync::source::parse_failed),
        help("Sources are YAML lists of single-key maps, e.g. '- git: {{local-name: x, uri: ...}}'")
    )]
    SourceParseFailed { path: String, reason: String },

    // Selection errors
    #[error("No configuration element matches '{query}'")]
    #[diagnostic(
        code(wsync::select::no_match),
        help("Pass an element's local-name or a path inside the workspace")
    )]
    SelectionFailed { query: String },

    // Preparation errors
    #[error("Aborting install of '{local_name}': {reason}")]
    #[diagnostic(
        code(wsync::prepare::aborted),
        help("Resolve the conflict manually, or rerun with --on-conflict backup|delete|skip")
    )]
    PreparationAborted { local_name: String, reason: String },

    #[error("Failed to prepare tree '{path}': {reason}")]
    #[diagnostic(code(wsync::prepare::failed))]
    PreparationFailed { path: String, reason: String },

    // Install errors
    #[error("Failed to install tree '{local_name}': {reason}")]
    #[diagnostic(code(wsync::install::failed))]
    InstallFailed { local_name: String, reason: String },

    #[error("Install finished with {failed} failed element(s)")]
    #[diagnostic(code(wsync::install::incomplete))]
    InstallIncomplete { failed: usize },

    #[error("Failed to back up '{path}' to '{target}': {reason}")]
    #[diagnostic(code(wsync::install::backup_failed))]
    BackupFailed {
        path: String,
        target: String,
        reason: String,
    },

    #[error("Failed to create workspace directory '{path}': {reason}")]
    #[diagnostic(code(wsync::workspace::create_failed))]
    WorkspaceCreateFailed { path: String, reason: String },

    // Git errors
    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(wsync::git::clone_failed),
        help("Check that the uri is correct and you have access to the repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(code(wsync::git::open_failed))]
    GitOpenFailed { path: String, reason: String },

    #[error("Failed to fetch from remote: {reason}")]
    #[diagnostic(code(wsync::git::fetch_failed))]
    GitFetchFailed { reason: String },

    #[error("Failed to checkout version '{version}': {reason}")]
    #[diagnostic(code(wsync::git::checkout_failed))]
    GitCheckoutFailed { version: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(wsync::git::operation_failed))]
    GitOperationFailed { message: String },

    // Infrastructure errors
    #[error("Failed to build worker pool: {reason}")]
    #[diagnostic(code(wsync::distributor::pool_failed))]
    WorkerPoolFailed { reason: String },

    #[error("Failed to write file '{path}': {reason}")]
    #[diagnostic(code(wsync::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },
}

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, WsyncError>;
