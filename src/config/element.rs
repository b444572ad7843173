//! Workspace elements
//!
//! A [`WorkspaceElement`] is one declared, independently version-controlled
//! source tree: its identity (local name and resolved path) plus the VCS
//! capability handle that performs the actual tree operations. Elements are
//! immutable after aggregation; install/update mutate the tree on disk, not
//! the element.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, WsyncError};
use crate::vcs::{ConflictMode, PreparationReport, ScmType, Vcs};

/// Raw element declaration as read from a configuration source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDeclaration {
    pub scm: ScmType,
    /// Path relative to the workspace base path (or absolute); doubles as the
    /// element's display name
    pub local_name: String,
    pub uri: Option<String>,
    pub version: Option<String>,
}

/// One declared source tree plus its backend handle
pub struct WorkspaceElement {
    declaration: ElementDeclaration,
    /// Absolute location of the tree, resolved against the workspace base path
    path: PathBuf,
    vcs: Box<dyn Vcs>,
}

impl WorkspaceElement {
    pub fn new(declaration: ElementDeclaration, path: PathBuf, vcs: Box<dyn Vcs>) -> Self {
        Self {
            declaration,
            path,
            vcs,
        }
    }

    pub fn local_name(&self) -> &str {
        &self.declaration.local_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn declaration(&self) -> &ElementDeclaration {
        &self.declaration
    }

    pub fn scm_type(&self) -> ScmType {
        self.vcs.scm_type()
    }

    /// Whether this element participates in status/diff iteration when no
    /// explicit selection is given
    pub fn is_under_version_control(&self) -> bool {
        self.vcs.is_under_version_control()
    }

    pub fn status(&self, untracked: bool) -> Result<Option<String>> {
        self.vcs.status(&self.path, untracked)
    }

    pub fn diff(&self) -> Result<Option<String>> {
        self.vcs.diff(&self.path)
    }

    pub fn current_version(&self) -> Result<Option<String>> {
        self.vcs.current_version(&self.path)
    }

    /// Evaluate local filesystem state against the declared state.
    ///
    /// `backup_root` is the workspace-level backup directory; the per-element
    /// target under it is this element's local name.
    pub fn prepare_install(
        &self,
        backup_root: Option<&Path>,
        mode: ConflictMode,
        robust: bool,
    ) -> Result<Option<PreparationReport>> {
        let backup_target = backup_root.map(|root| root.join(&self.declaration.local_name));
        self.vcs
            .prepare_install(&self.path, backup_target.as_deref(), mode, robust)
    }

    /// Materialize the change described by `report`, moving any existing tree
    /// to its backup location first.
    pub fn install(&self, report: &PreparationReport) -> Result<()> {
        if report.backup {
            let target = report
                .backup_path
                .as_deref()
                .ok_or_else(|| WsyncError::BackupFailed {
                    path: self.path.display().to_string(),
                    target: "<unset>".to_string(),
                    reason: "backup requested without a backup path".to_string(),
                })?;
            backup_tree(&self.path, target)?;
        }
        self.vcs.install(&self.path, report)
    }
}

/// Move an existing tree aside before it is overwritten
fn backup_tree(path: &Path, target: &Path) -> Result<()> {
    let map_err = |e: std::io::Error| WsyncError::BackupFailed {
        path: path.display().to_string(),
        target: target.display().to_string(),
        reason: e.to_string(),
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(map_err)?;
    }
    fs::rename(path, target).map_err(map_err)
}
