//! Git backend built on libgit2
//!
//! This module handles:
//! - Cloning declared repositories (HTTPS, SSH, and local paths)
//! - Updating existing clones (fetch + fast-forward or version checkout)
//! - Short status and unified diff of the working tree
//!
//! Authentication is delegated to git's native credential system: ssh-agent,
//! keys under ~/.ssh/, and configured credential helpers.

use std::fs;
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Cred, CredentialType, FetchOptions, RemoteCallbacks, Repository, Status, StatusOptions,
};

use crate::error::{Result, WsyncError};

use super::{ConflictMode, PreparationReport, ScmType, Vcs};

/// Git capability handle for one declared element
pub struct GitVcs {
    uri: String,
    version: Option<String>,
}

impl GitVcs {
    pub fn new(uri: String, version: Option<String>) -> Self {
        Self { uri, version }
    }

    fn clone_repo(&self, path: &Path) -> Result<Repository> {
        let mut callbacks = RemoteCallbacks::new();
        setup_auth_callbacks(&mut callbacks);

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);

        builder
            .clone(&self.uri, path)
            .map_err(|e| WsyncError::GitCloneFailed {
                url: self.uri.clone(),
                reason: e.message().to_string(),
            })
    }

    fn update(&self, path: &Path) -> Result<()> {
        let repo = open(path)?;
        fetch_origin(&repo)?;
        match &self.version {
            Some(version) => checkout_version(&repo, version),
            None => fast_forward(&repo),
        }
    }
}

impl Vcs for GitVcs {
    fn scm_type(&self) -> ScmType {
        ScmType::Git
    }

    fn status(&self, path: &Path, untracked: bool) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let repo = open(path)?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(untracked)
            .recurse_untracked_dirs(untracked);

        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| WsyncError::GitOperationFailed {
                message: e.message().to_string(),
            })?;

        let mut out = String::new();
        for entry in statuses.iter() {
            let status = entry.status();
            if status.contains(Status::IGNORED) {
                continue;
            }
            let file = entry.path().unwrap_or("<invalid utf-8>");
            out.push_str(&short_code(status));
            out.push(' ');
            out.push_str(file);
            out.push('\n');
        }
        Ok(if out.is_empty() { None } else { Some(out) })
    }

    fn diff(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let repo = open(path)?;

        let head_tree = repo.head().ok().and_then(|head| head.peel_to_tree().ok());
        let diff = repo
            .diff_tree_to_workdir_with_index(head_tree.as_ref(), None)
            .map_err(|e| WsyncError::GitOperationFailed {
                message: e.message().to_string(),
            })?;

        let mut out = String::new();
        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                out.push(line.origin());
            }
            out.push_str(&String::from_utf8_lossy(line.content()));
            true
        })
        .map_err(|e| WsyncError::GitOperationFailed {
            message: e.message().to_string(),
        })?;

        Ok(if out.is_empty() { None } else { Some(out) })
    }

    fn prepare_install(
        &self,
        path: &Path,
        backup_target: Option<&Path>,
        mode: ConflictMode,
        _robust: bool,
    ) -> Result<Option<PreparationReport>> {
        if !path.exists() {
            return Ok(Some(PreparationReport::checkout()));
        }

        let conflict = match Repository::open(path) {
            Ok(repo) => match origin_url(&repo) {
                Some(url) if same_uri(&url, &self.uri) => {
                    return Ok(Some(PreparationReport::update()));
                }
                Some(url) => format!(
                    "'{}' tracks '{}' but the configuration declares '{}'",
                    path.display(),
                    url,
                    self.uri
                ),
                None => format!("'{}' has no 'origin' remote", path.display()),
            },
            Err(_) => format!("'{}' exists but is not a git checkout", path.display()),
        };

        let report = match mode {
            ConflictMode::Abort => PreparationReport::abort(conflict),
            ConflictMode::Skip => PreparationReport::skip(conflict),
            ConflictMode::Delete => PreparationReport::checkout(),
            ConflictMode::Backup => match backup_target {
                Some(target) => PreparationReport::backup_then_checkout(target.to_path_buf()),
                None => PreparationReport::abort(format!(
                    "{conflict}; backup requested but no --backup-dir given"
                )),
            },
        };
        Ok(Some(report))
    }

    fn install(&self, path: &Path, report: &PreparationReport) -> Result<()> {
        if report.checkout {
            // A tree may still be present in delete mode; backup mode has
            // already moved it aside.
            if path.exists() {
                fs::remove_dir_all(path).map_err(|e| WsyncError::GitOperationFailed {
                    message: format!("failed to remove '{}': {e}", path.display()),
                })?;
            }
            let repo = self.clone_repo(path)?;
            if let Some(version) = &self.version {
                checkout_version(&repo, version)?;
            }
            Ok(())
        } else {
            self.update(path)
        }
    }

    fn current_version(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let repo = open(path)?;
        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| WsyncError::GitOperationFailed {
                message: e.message().to_string(),
            })?;
        let mut id = commit.id().to_string();
        id.truncate(12);
        Ok(Some(id))
    }
}

fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| WsyncError::GitOpenFailed {
        path: path.display().to_string(),
        reason: e.message().to_string(),
    })
}

fn origin_url(repo: &Repository) -> Option<String> {
    repo.find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(String::from))
}

/// Compare a clone's remote uri against the declared one.
///
/// Trailing slashes are insignificant; local-path uris compare equal when
/// they resolve to the same directory.
fn same_uri(a: &str, b: &str) -> bool {
    if a.trim_end_matches('/') == b.trim_end_matches('/') {
        return true;
    }
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

fn fetch_origin(repo: &Repository) -> Result<()> {
    let mut remote = repo
        .find_remote("origin")
        .map_err(|e| WsyncError::GitFetchFailed {
            reason: e.message().to_string(),
        })?;

    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    let mut opts = FetchOptions::new();
    opts.remote_callbacks(callbacks);

    // Empty refspec list fetches the remote's configured refspecs
    remote
        .fetch(&[] as &[&str], Some(&mut opts), None)
        .map_err(|e| WsyncError::GitFetchFailed {
            reason: e.message().to_string(),
        })
}

/// Check out a declared version (branch, tag, or sha) as a detached HEAD
fn checkout_version(repo: &Repository, version: &str) -> Result<()> {
    let object = repo
        .revparse_single(version)
        .or_else(|_| repo.revparse_single(&format!("origin/{version}")))
        .map_err(|e| WsyncError::GitCheckoutFailed {
            version: version.to_string(),
            reason: e.message().to_string(),
        })?;

    let commit = object
        .peel_to_commit()
        .map_err(|e| WsyncError::GitCheckoutFailed {
            version: version.to_string(),
            reason: e.message().to_string(),
        })?;

    repo.set_head_detached(commit.id())
        .map_err(|e| WsyncError::GitCheckoutFailed {
            version: version.to_string(),
            reason: e.message().to_string(),
        })?;

    force_checkout_head(repo).map_err(|e| WsyncError::GitCheckoutFailed {
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// Fast-forward the current branch to the just-fetched remote head.
///
/// Diverged local history is an error; wsync never merges or rebases.
fn fast_forward(repo: &Repository) -> Result<()> {
    let fetch_head = match repo.find_reference("FETCH_HEAD") {
        Ok(reference) => reference,
        // Nothing was fetched (e.g. empty remote)
        Err(_) => return Ok(()),
    };

    let annotated = repo
        .reference_to_annotated_commit(&fetch_head)
        .map_err(|e| WsyncError::GitOperationFailed {
            message: e.message().to_string(),
        })?;

    let (analysis, _) =
        repo.merge_analysis(&[&annotated])
            .map_err(|e| WsyncError::GitOperationFailed {
                message: e.message().to_string(),
            })?;

    if analysis.is_up_to_date() {
        return Ok(());
    }
    if !analysis.is_fast_forward() {
        return Err(WsyncError::GitFetchFailed {
            reason: "local branch has diverged from its remote; resolve manually".to_string(),
        });
    }

    let head = repo.head().map_err(|e| WsyncError::GitOperationFailed {
        message: e.message().to_string(),
    })?;

    if head.is_branch() {
        if let Some(name) = head.name().map(str::to_string) {
            let mut reference =
                repo.find_reference(&name)
                    .map_err(|e| WsyncError::GitOperationFailed {
                        message: e.message().to_string(),
                    })?;
            reference
                .set_target(annotated.id(), "wsync: fast-forward")
                .map_err(|e| WsyncError::GitOperationFailed {
                    message: e.message().to_string(),
                })?;
        }
    } else {
        repo.set_head_detached(annotated.id())
            .map_err(|e| WsyncError::GitOperationFailed {
                message: e.message().to_string(),
            })?;
    }

    force_checkout_head(repo).map_err(|e| WsyncError::GitOperationFailed {
        message: e.to_string(),
    })
}

fn force_checkout_head(repo: &Repository) -> std::result::Result<(), git2::Error> {
    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_head(Some(&mut checkout))
}

/// Two-character porcelain code for a status entry (index column, worktree column)
fn short_code(status: Status) -> String {
    if status == Status::WT_NEW {
        return "??".to_string();
    }

    let index = if status.contains(Status::INDEX_NEW) {
        'A'
    } else if status.contains(Status::INDEX_MODIFIED) {
        'M'
    } else if status.contains(Status::INDEX_DELETED) {
        'D'
    } else if status.contains(Status::INDEX_RENAMED) {
        'R'
    } else if status.contains(Status::INDEX_TYPECHANGE) {
        'T'
    } else {
        ' '
    };

    let worktree = if status.contains(Status::WT_MODIFIED) {
        'M'
    } else if status.contains(Status::WT_DELETED) {
        'D'
    } else if status.contains(Status::WT_RENAMED) {
        'R'
    } else if status.contains(Status::WT_TYPECHANGE) {
        'T'
    } else if status.contains(Status::WT_NEW) {
        '?'
    } else {
        ' '
    };

    format!("{index}{worktree}")
}

/// Set up authentication callbacks delegating to git's native credential system
fn setup_auth_callbacks(callbacks: &mut RemoteCallbacks) {
    callbacks.credentials(|url, username_from_url, allowed| {
        if allowed.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
            if let Some(cred) = ssh_key_from_disk(username) {
                return Ok(cred);
            }
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Ok(config) = git2::Config::open_default() {
                if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
                    return Ok(cred);
                }
            }
        }
        Cred::default()
    });
}

fn ssh_key_from_disk(username: &str) -> Option<Cred> {
    let home = dirs::home_dir()?;
    let ssh_dir = home.join(".ssh");

    for key_name in &["id_ed25519", "id_rsa", "id_ecdsa"] {
        let private_key = ssh_dir.join(key_name);
        if !private_key.exists() {
            continue;
        }
        let public_key = ssh_dir.join(format!("{key_name}.pub"));
        let public_key_path = public_key.exists().then_some(public_key.as_path());

        if let Ok(cred) = Cred::ssh_key(username, public_key_path, &private_key, None) {
            return Some(cred);
        }
    }
    None
}
