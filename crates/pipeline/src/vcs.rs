//! Version-control port used by the publisher

use apkbuilder_core::git::{GitRepo, PushMode};
use apkbuilder_core::Result;
use std::path::{Path, PathBuf};

/// Working-tree operations needed to publish a project
pub trait Vcs {
    /// Create the repository if the directory has none
    fn ensure_initialized(&self) -> Result<()>;

    /// Stage every change, including deletions, except under `exclude`
    fn stage_all(&self, exclude: &[PathBuf]) -> Result<()>;

    /// Whether the index differs from HEAD
    fn has_staged_changes(&self) -> Result<bool>;

    /// Whether the current branch has a commit
    fn has_head(&self) -> Result<bool>;

    fn commit(&self, message: &str, allow_empty: bool) -> Result<()>;

    /// Force-rename the current branch
    fn rename_branch(&self, branch: &str) -> Result<()>;

    /// Hash of HEAD
    fn head_revision(&self) -> Result<String>;

    /// Untrack everything except `keep`
    fn retain_only(&self, keep: &Path) -> Result<()>;

    /// Push HEAD to `branch` at `url`, scrubbing `secrets` from errors
    fn push(&self, url: &str, branch: &str, mode: &PushMode, secrets: &[&str]) -> Result<()>;

    /// Fast-forward from `branch` at `url`, scrubbing `secrets` from errors
    fn pull(&self, url: &str, branch: &str, secrets: &[&str]) -> Result<()>;
}

impl Vcs for GitRepo {
    fn ensure_initialized(&self) -> Result<()> {
        GitRepo::ensure_initialized(self)
    }

    fn stage_all(&self, exclude: &[PathBuf]) -> Result<()> {
        GitRepo::stage_all(self, exclude)
    }

    fn has_staged_changes(&self) -> Result<bool> {
        GitRepo::has_staged_changes(self)
    }

    fn has_head(&self) -> Result<bool> {
        GitRepo::has_head(self)
    }

    fn commit(&self, message: &str, allow_empty: bool) -> Result<()> {
        GitRepo::commit(self, message, allow_empty)
    }

    fn rename_branch(&self, branch: &str) -> Result<()> {
        GitRepo::rename_branch(self, branch)
    }

    fn head_revision(&self) -> Result<String> {
        GitRepo::head_revision(self)
    }

    fn retain_only(&self, keep: &Path) -> Result<()> {
        GitRepo::retain_only(self, keep)
    }

    fn push(&self, url: &str, branch: &str, mode: &PushMode, secrets: &[&str]) -> Result<()> {
        GitRepo::push(self, url, branch, mode, secrets)
    }

    fn pull(&self, url: &str, branch: &str, secrets: &[&str]) -> Result<()> {
        GitRepo::pull(self, url, branch, secrets)
    }
}
