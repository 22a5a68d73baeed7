//! Working-tree change detection.

use crate::error::{RemediationError, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Reports which paths differ from the committed state of a checkout
pub trait DiffProbe: Send + Sync {
    /// Repository-relative paths with uncommitted changes, in the order the
    /// VCS lists them
    fn changed_paths(&self, repo_dir: &Path) -> Result<Vec<String>>;
}

/// `git diff --name-only`, optionally extended with untracked files
#[derive(Debug, Clone, Default)]
pub struct GitDiffProbe {
    include_untracked: bool,
}

impl GitDiffProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report files git does not track yet (newly created files)
    pub fn with_untracked(mut self, include: bool) -> Self {
        self.include_untracked = include;
        self
    }
}

impl DiffProbe for GitDiffProbe {
    fn changed_paths(&self, repo_dir: &Path) -> Result<Vec<String>> {
        if !is_git_repo(repo_dir) {
            return Err(RemediationError::Vcs(format!(
                "{} is not a git work tree",
                repo_dir.display()
            )));
        }
        let mut paths = run_git(repo_dir, &["diff", "--name-only"])?;
        if self.include_untracked {
            for path in run_git(repo_dir, &["ls-files", "--others", "--exclude-standard"])? {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        debug!(changed = paths.len(), "Probed working tree");
        Ok(paths)
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<Vec<String>> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| RemediationError::Vcs(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RemediationError::Vcs(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}
