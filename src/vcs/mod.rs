//! Version-control capability layer
//!
//! The sync engine never talks to a VCS directly. Each workspace element owns
//! a boxed [`Vcs`] handle supplied by a [`VcsRegistry`] at configuration time,
//! and all clone/update/status/diff mechanics go through that trait.
//!
//! - `git.rs`: git backend built on libgit2
//! - `plain.rs`: backend for plain (non-versioned) directory entries

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::ElementDeclaration;
use crate::error::{Result, WsyncError};

pub mod git;
pub mod plain;

pub use git::GitVcs;
pub use plain::PlainVcs;

/// Closed set of scm types a declaration may carry.
///
/// Only `git` and `none` have bundled backends; the other tags exist so that
/// configurations mentioning them parse, status output for them aligns, and
/// external backends can be registered for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmType {
    Git,
    Svn,
    Hg,
    Bzr,
    Tar,
    None,
}

impl ScmType {
    /// Width of the change-type marker columns in this backend's status
    /// output, where known.
    ///
    /// Status lines from all backends are re-aligned to a common 8-column
    /// marker field; backends without a known width pass through unchanged.
    pub fn status_columns(self) -> Option<usize> {
        match self {
            ScmType::Git => Some(3),
            ScmType::Hg => Some(2),
            ScmType::Bzr => Some(4),
            ScmType::Svn | ScmType::Tar | ScmType::None => None,
        }
    }
}

impl fmt::Display for ScmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScmType::Git => "git",
            ScmType::Svn => "svn",
            ScmType::Hg => "hg",
            ScmType::Bzr => "bzr",
            ScmType::Tar => "tar",
            ScmType::None => "none",
        };
        f.write_str(name)
    }
}

/// Conflict-resolution policy for the prepare phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictMode {
    /// Abort the whole run when a tree conflicts with its declaration
    Abort,
    /// Move the conflicting tree into the backup directory, then check out fresh
    Backup,
    /// Delete the conflicting tree, then check out fresh
    Delete,
    /// Leave the conflicting tree alone and exclude it from the install phase
    Skip,
}

/// Outcome of one element's prepare step, consumed by the install phase.
///
/// Exactly one of proceed (neither flag), `skip` or `abort` is effective.
#[derive(Debug, Clone, Default)]
pub struct PreparationReport {
    /// Tree must be checked out fresh (missing, or replaced per policy)
    pub checkout: bool,
    /// Existing tree must be moved aside before checkout
    pub backup: bool,
    /// Where the existing tree is moved when `backup` is set
    pub backup_path: Option<PathBuf>,
    /// Terminate the whole orchestration
    pub abort: bool,
    /// Exclude this element from the install phase only
    pub skip: bool,
    /// Reason attached to abort/skip outcomes
    pub error: Option<String>,
}

impl PreparationReport {
    /// Fresh checkout at a path with no existing tree
    pub fn checkout() -> Self {
        Self {
            checkout: true,
            ..Self::default()
        }
    }

    /// Update an existing, matching tree in place
    pub fn update() -> Self {
        Self::default()
    }

    /// Move the existing tree to `target`, then check out fresh
    pub fn backup_then_checkout(target: PathBuf) -> Self {
        Self {
            checkout: true,
            backup: true,
            backup_path: Some(target),
            ..Self::default()
        }
    }

    pub fn abort(reason: String) -> Self {
        Self {
            abort: true,
            error: Some(reason),
            ..Self::default()
        }
    }

    pub fn skip(reason: String) -> Self {
        Self {
            skip: true,
            error: Some(reason),
            ..Self::default()
        }
    }
}

/// Capability interface every VCS backend provides to the engine.
///
/// Backends are stateless apart from their declared uri/version; the element's
/// filesystem path is passed into every call. Implementations must be safe to
/// call from the distributor's worker threads.
pub trait Vcs: Send + Sync {
    fn scm_type(&self) -> ScmType;

    /// Whether this element participates in status/diff iteration
    fn is_under_version_control(&self) -> bool {
        !matches!(self.scm_type(), ScmType::None)
    }

    /// Raw status text for the tree at `path`, `None` when not applicable
    fn status(&self, path: &Path, untracked: bool) -> Result<Option<String>>;

    /// Unified diff of local changes, `None` when not applicable or empty
    fn diff(&self, path: &Path) -> Result<Option<String>>;

    /// Evaluate the tree at `path` against the declared state.
    ///
    /// `backup_target` is the per-element destination (already including the
    /// element's local name) used when `mode` is [`ConflictMode::Backup`].
    /// Returns `None` when the element needs no action at all.
    fn prepare_install(
        &self,
        path: &Path,
        backup_target: Option<&Path>,
        mode: ConflictMode,
        robust: bool,
    ) -> Result<Option<PreparationReport>>;

    /// Materialize the change described by `report` at `path`.
    ///
    /// The element has already performed any backup move before this call.
    fn install(&self, path: &Path, report: &PreparationReport) -> Result<()>;

    /// Currently checked-out version identifier, `None` when unknown
    fn current_version(&self, path: &Path) -> Result<Option<String>>;
}

/// Factory producing a backend handle from a raw declaration
pub type VcsFactory = Box<dyn Fn(&ElementDeclaration) -> Result<Box<dyn Vcs>> + Send + Sync>;

/// Explicit table of scm type to backend factory.
///
/// Passed into configuration aggregation; nothing is looked up from ambient
/// process state. Tests register mock backends here.
pub struct VcsRegistry {
    factories: HashMap<ScmType, VcsFactory>,
}

impl VcsRegistry {
    /// Empty registry with no backends
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the bundled backends: git (libgit2) and plain entries
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            ScmType::Git,
            Box::new(|declaration| {
                let uri = declaration
                    .uri
                    .clone()
                    .ok_or_else(|| WsyncError::MissingUri {
                        local_name: declaration.local_name.clone(),
                        scm: ScmType::Git.to_string(),
                    })?;
                Ok(Box::new(GitVcs::new(uri, declaration.version.clone())) as Box<dyn Vcs>)
            }),
        );
        registry.register(
            ScmType::None,
            Box::new(|_declaration| Ok(Box::new(PlainVcs) as Box<dyn Vcs>)),
        );
        registry
    }

    pub fn register(&mut self, scm: ScmType, factory: VcsFactory) {
        self.factories.insert(scm, factory);
    }

    /// Build the backend handle for a declaration
    pub fn create(&self, declaration: &ElementDeclaration) -> Result<Box<dyn Vcs>> {
        let factory =
            self.factories
                .get(&declaration.scm)
                .ok_or_else(|| WsyncError::UnsupportedScm {
                    local_name: declaration.local_name.clone(),
                    scm: declaration.scm.to_string(),
                })?;
        factory(declaration)
    }

    /// Scm types with a registered backend, in display order
    pub fn registered(&self) -> Vec<ScmType> {
        let mut types: Vec<ScmType> = self.factories.keys().copied().collect();
        types.sort_by_key(|scm| scm.to_string());
        types
    }
}

impl Default for VcsRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(scm: ScmType, local_name: &str, uri: Option<&str>) -> ElementDeclaration {
        ElementDeclaration {
            scm,
            local_name: local_name.to_string(),
            uri: uri.map(String::from),
            version: None,
        }
    }

    #[test]
    fn test_status_columns_table() {
        assert_eq!(ScmType::Git.status_columns(), Some(3));
        assert_eq!(ScmType::Hg.status_columns(), Some(2));
        assert_eq!(ScmType::Bzr.status_columns(), Some(4));
        assert_eq!(ScmType::Svn.status_columns(), None);
        assert_eq!(ScmType::Tar.status_columns(), None);
        assert_eq!(ScmType::None.status_columns(), None);
    }

    #[test]
    fn test_default_registry_creates_git_backend() {
        let registry = VcsRegistry::with_defaults();
        let vcs = registry
            .create(&declaration(
                ScmType::Git,
                "foo",
                Some("https://example.com/foo.git"),
            ))
            .unwrap();
        assert_eq!(vcs.scm_type(), ScmType::Git);
        assert!(vcs.is_under_version_control());
    }

    #[test]
    fn test_default_registry_creates_plain_backend() {
        let registry = VcsRegistry::with_defaults();
        let vcs = registry
            .create(&declaration(ScmType::None, "docs", None))
            .unwrap();
        assert_eq!(vcs.scm_type(), ScmType::None);
        assert!(!vcs.is_under_version_control());
    }

    #[test]
    fn test_git_declaration_without_uri_is_rejected() {
        let registry = VcsRegistry::with_defaults();
        let result = registry.create(&declaration(ScmType::Git, "foo", None));
        assert!(matches!(result, Err(WsyncError::MissingUri { .. })));
    }

    #[test]
    fn test_unregistered_scm_is_rejected() {
        let registry = VcsRegistry::with_defaults();
        let result = registry.create(&declaration(
            ScmType::Svn,
            "legacy",
            Some("https://svn.example.com/legacy"),
        ));
        assert!(matches!(result, Err(WsyncError::UnsupportedScm { .. })));
    }

    #[test]
    fn test_external_backend_can_be_registered() {
        struct NullVcs;
        impl Vcs for NullVcs {
            fn scm_type(&self) -> ScmType {
                ScmType::Tar
            }
            fn status(&self, _path: &Path, _untracked: bool) -> Result<Option<String>> {
                Ok(None)
            }
            fn diff(&self, _path: &Path) -> Result<Option<String>> {
                Ok(None)
            }
            fn prepare_install(
                &self,
                _path: &Path,
                _backup_target: Option<&Path>,
                _mode: ConflictMode,
                _robust: bool,
            ) -> Result<Option<PreparationReport>> {
                Ok(None)
            }
            fn install(&self, _path: &Path, _report: &PreparationReport) -> Result<()> {
                Ok(())
            }
            fn current_version(&self, _path: &Path) -> Result<Option<String>> {
                Ok(None)
            }
        }

        let mut registry = VcsRegistry::new();
        registry.register(
            ScmType::Tar,
            Box::new(|_| Ok(Box::new(NullVcs) as Box<dyn Vcs>)),
        );
        let vcs = registry
            .create(&declaration(ScmType::Tar, "vendor", Some("x.tar")))
            .unwrap();
        assert_eq!(vcs.scm_type(), ScmType::Tar);
    }

    #[test]
    fn test_preparation_report_constructors() {
        let checkout = PreparationReport::checkout();
        assert!(checkout.checkout && !checkout.abort && !checkout.skip);

        let update = PreparationReport::update();
        assert!(!update.checkout && !update.abort && !update.skip);

        let backup = PreparationReport::backup_then_checkout(PathBuf::from("/ws/.backup/foo"));
        assert!(backup.checkout && backup.backup);
        assert_eq!(backup.backup_path.as_deref(), Some(Path::new("/ws/.backup/foo")));

        let abort = PreparationReport::abort("conflict".to_string());
        assert!(abort.abort && abort.error.is_some());

        let skip = PreparationReport::skip("local changes".to_string());
        assert!(skip.skip && !skip.abort);
    }
}
