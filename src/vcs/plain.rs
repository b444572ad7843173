//! Backend for plain directory entries (`- other: {local-name: ...}`)
//!
//! Plain entries reserve a place in the workspace without putting it under
//! version control. They are excluded from status/diff iteration unless
//! explicitly selected, and installing one only ensures the directory exists.

use std::fs;
use std::path::Path;

use crate::error::{Result, WsyncError};

use super::{ConflictMode, PreparationReport, ScmType, Vcs};

pub struct PlainVcs;

impl Vcs for PlainVcs {
    fn scm_type(&self) -> ScmType {
        ScmType::None
    }

    fn status(&self, _path: &Path, _untracked: bool) -> Result<Option<String>> {
        Ok(None)
    }

    fn diff(&self, _path: &Path) -> Result<Option<String>> {
        Ok(None)
    }

    fn prepare_install(
        &self,
        path: &Path,
        _backup_target: Option<&Path>,
        _mode: ConflictMode,
        _robust: bool,
    ) -> Result<Option<PreparationReport>> {
        if path.exists() {
            return Ok(None);
        }
        Ok(Some(PreparationReport::checkout()))
    }

    fn install(&self, path: &Path, report: &PreparationReport) -> Result<()> {
        if report.checkout {
            fs::create_dir_all(path).map_err(|e| WsyncError::WorkspaceCreateFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn current_version(&self, _path: &Path) -> Result<Option<String>> {
        Ok(None)
    }
}
