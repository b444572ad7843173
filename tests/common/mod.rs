//! Shared fixtures for CLI integration tests
//!
//! Tests run the real wsync binary against workspaces and "remote"
//! repositories created locally with git2, so no network access is needed.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn wsync_cmd() -> Command {
    Command::cargo_bin("wsync").unwrap()
}

/// Create a local "remote" repository with one committed file and return the
/// commit sha.
pub fn init_remote_repo(dir: &Path) -> String {
    std::fs::create_dir_all(dir).unwrap();
    let repo = git2::Repository::init(dir).unwrap();
    std::fs::write(dir.join("README.md"), "hello\n").unwrap();
    let oid = {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("wsync-test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap()
    };
    oid.to_string()
}

/// Add a file and commit it on top of the current HEAD
pub fn commit_file(dir: &Path, name: &str, content: &str, message: &str) -> String {
    let repo = git2::Repository::open(dir).unwrap();
    std::fs::write(dir.join(name), content).unwrap();
    let oid = {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("wsync-test", "test@example.com").unwrap();
        let parent = repo
            .head()
            .unwrap()
            .peel_to_commit()
            .unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap()
    };
    oid.to_string()
}

/// Write the workspace's wsync.yaml
pub fn write_workspace_config(workspace: &Path, yaml: &str) {
    std::fs::create_dir_all(workspace).unwrap();
    std::fs::write(workspace.join("wsync.yaml"), yaml).unwrap();
}

/// Config snippet for one git element
pub fn git_entry(local_name: &str, uri: &Path) -> String {
    format!(
        "- git:\n    local-name: {local_name}\n    uri: {}\n",
        uri.display()
    )
}
