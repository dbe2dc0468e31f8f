//! Git operations using command-line git
//!
//! Uses command-line git to avoid dependency issues with git2/libgit2.
//! Only the operations the publisher needs are exposed: initialise, stage,
//! commit, name the branch, resolve HEAD, push to and pull from an explicit
//! URL, and archive the working tree.

use crate::error::{Error, ErrorCode, Result};
use crate::process::{run_command_in_dir, run_command_in_dir_with_env, CommandResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identity used when the user has no `user.name`/`user.email` configured
const FALLBACK_NAME: &str = "apkbuilder";
const FALLBACK_EMAIL: &str = "apkbuilder@users.noreply.github.com";

/// Git repository wrapper
#[derive(Debug, Clone)]
pub struct GitRepo {
    workdir: PathBuf,
}

/// How a push treats the remote branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMode {
    /// Overwrite the remote branch unconditionally
    Force,
    /// Overwrite only if the remote branch still points at this commit
    ForceWithLease(String),
}

impl GitRepo {
    /// Treat `path` as a repository root without touching the filesystem
    pub fn at(path: &Path) -> Self {
        Self {
            workdir: path.to_path_buf(),
        }
    }

    /// Use `path` as a repository root, running `git init` if it has none
    pub fn init(path: &Path) -> Result<Self> {
        let repo = Self::at(path);
        repo.ensure_initialized()?;
        Ok(repo)
    }

    /// Run `git init` unless the working directory already has a `.git`
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.workdir.join(".git").exists() {
            return Ok(());
        }
        debug!(path = %self.workdir.display(), "Initialising git repository");
        let result = self.git(&["init", "-q"])?;
        ensure_success(&result, "git init")
    }

    /// Get the repository working directory
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Stage every change in the working tree, including deletions
    ///
    /// Paths in `exclude` are never staged, and are dropped from the index
    /// if an earlier commit tracked them. The files stay on disk.
    pub fn stage_all(&self, exclude: &[PathBuf]) -> Result<()> {
        let excludes: Vec<String> = exclude
            .iter()
            .map(|p| format!(":(exclude){}", pathspec(p)))
            .collect();
        let mut args = vec!["add", "-A", "--", "."];
        args.extend(excludes.iter().map(String::as_str));
        ensure_success(&self.git(&args)?, "git add")?;

        for path in exclude {
            let spec = pathspec(path);
            let result = self.git(&["rm", "-r", "-q", "--cached", "--ignore-unmatch", "--", &spec])?;
            ensure_success(&result, "git rm --cached")?;
        }
        Ok(())
    }

    /// Check whether the index differs from HEAD
    pub fn has_staged_changes(&self) -> Result<bool> {
        let result = self.git(&["diff", "--cached", "--quiet"])?;
        match result.exit_code {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(command_error("git diff --cached", &result)),
        }
    }

    /// Check whether the current branch has any commit yet
    pub fn has_head(&self) -> Result<bool> {
        let result = self.git(&["rev-parse", "--verify", "-q", "HEAD"])?;
        Ok(result.success)
    }

    /// Create a commit from the index
    pub fn commit(&self, message: &str, allow_empty: bool) -> Result<()> {
        let mut args: Vec<String> = Vec::new();
        if !self.has_identity() {
            args.push("-c".into());
            args.push(format!("user.name={FALLBACK_NAME}"));
            args.push("-c".into());
            args.push(format!("user.email={FALLBACK_EMAIL}"));
        }
        args.extend(["commit".into(), "-q".into(), "-m".into(), message.into()]);
        if allow_empty {
            args.push("--allow-empty".into());
        }

        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = self.git(&refs)?;
        ensure_success(&result, "git commit")
    }

    /// Rename the current branch, creating it if HEAD is unborn
    pub fn rename_branch(&self, branch: &str) -> Result<()> {
        let result = self.git(&["branch", "-M", branch])?;
        ensure_success(&result, "git branch -M")
    }

    /// Hash of the commit HEAD points at
    pub fn head_revision(&self) -> Result<String> {
        let result = self.git(&["rev-parse", "HEAD"])?;
        ensure_success(&result, "git rev-parse HEAD")?;

        let sha = result.stdout.trim().to_string();
        if sha.is_empty() {
            return Err(Error::git("git rev-parse HEAD returned empty output"));
        }
        Ok(sha)
    }

    /// Remove everything from the index, then re-add only `keep`
    pub fn retain_only(&self, keep: &Path) -> Result<()> {
        let result = self.git(&["rm", "-r", "-q", "--cached", "--ignore-unmatch", "."])?;
        ensure_success(&result, "git rm --cached")?;

        if self.workdir.join(keep).exists() {
            let result = self.git(&["add", "--", &keep.to_string_lossy()])?;
            ensure_success(&result, "git add")?;
        }
        Ok(())
    }

    /// Push HEAD to `branch` at `url`
    ///
    /// `secrets` are scrubbed from any error text, since git may echo the URL.
    pub fn push(&self, url: &str, branch: &str, mode: &PushMode, secrets: &[&str]) -> Result<()> {
        let refspec = format!("HEAD:refs/heads/{branch}");
        let lease;
        let mut args = vec!["push", "--porcelain"];
        match mode {
            PushMode::Force => args.push("--force"),
            PushMode::ForceWithLease(expected) => {
                lease = format!("--force-with-lease=refs/heads/{branch}:{expected}");
                args.push(&lease);
            }
        }
        args.push(url);
        args.push(&refspec);

        let result = run_command_in_dir_with_env(
            "git",
            &args,
            &self.workdir,
            &[("GIT_TERMINAL_PROMPT", "0")],
        )?;
        if result.success {
            return Ok(());
        }

        let detail = redact(result.combined_output().trim(), secrets);
        let lease_rejected = matches!(mode, PushMode::ForceWithLease(_))
            && (detail.contains("stale info") || detail.contains("[rejected]"));

        if lease_rejected {
            Err(Error::new(
                ErrorCode::LeaseRejected,
                format!("Remote branch '{branch}' moved since it was last seen"),
            )
            .with_context(detail)
            .with_suggestion("Fetch the remote head and retry, or push without a lease"))
        } else {
            Err(Error::new(ErrorCode::PushRejected, format!("Push to '{branch}' failed"))
                .with_context(detail)
                .with_suggestion("Check the repository URL, token scopes, and network access"))
        }
    }

    /// Fast-forward the current branch to `branch` at `url`
    ///
    /// Never merges; diverged local commits are an error.
    pub fn pull(&self, url: &str, branch: &str, secrets: &[&str]) -> Result<()> {
        let result = run_command_in_dir_with_env(
            "git",
            &["pull", "-q", "--ff-only", url, branch],
            &self.workdir,
            &[("GIT_TERMINAL_PROMPT", "0")],
        )?;
        if result.success {
            return Ok(());
        }

        Err(Error::new(
            ErrorCode::GitCommandFailed,
            format!("Pull from '{branch}' failed"),
        )
        .with_context(redact(result.combined_output().trim(), secrets))
        .with_suggestion("Local commits may have diverged; `apkbuilder build` overwrites the remote instead"))
    }

    fn has_identity(&self) -> bool {
        ["user.name", "user.email"].iter().all(|key| {
            self.git(&["config", "--get", key])
                .map(|r| r.success && !r.stdout.trim().is_empty())
                .unwrap_or(false)
        })
    }

    fn git(&self, args: &[&str]) -> Result<CommandResult> {
        run_command_in_dir("git", args, &self.workdir)
    }
}

/// Replace every non-empty secret in `text` with `***`
pub fn redact(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(text.to_string(), |acc, secret| acc.replace(secret, "***"))
}

/// Write a zip of the working tree at `dir` to `out`
///
/// Works from a throwaway git directory, so `dir` needs no repository of its
/// own and its index is never touched. `.gitignore` rules apply, `.git` is
/// never included, and `exclude` paths are left out.
pub fn archive_worktree(dir: &Path, exclude: &[PathBuf], out: &Path) -> Result<()> {
    let dir = dir.canonicalize()?;
    let dir = dir.as_path();
    let out = std::path::absolute(out)?;
    let scratch = tempfile::tempdir()?;
    let git_dir = scratch.path().join("archive.git");
    let git_dir_arg = format!("--git-dir={}", git_dir.display());
    let work_tree_arg = format!("--work-tree={}", dir.display());

    let result = run_command_in_dir(
        "git",
        &["init", "-q", "--bare", &git_dir.to_string_lossy()],
        scratch.path(),
    )?;
    ensure_success(&result, "git init")?;

    let excludes: Vec<String> = exclude
        .iter()
        .map(|p| format!(":(exclude){}", pathspec(p)))
        .collect();
    let mut add = vec![git_dir_arg.as_str(), work_tree_arg.as_str(), "add", "-A", "--", "."];
    add.extend(excludes.iter().map(String::as_str));
    ensure_success(&run_command_in_dir("git", &add, dir)?, "git add")?;

    let tree = run_command_in_dir("git", &[&git_dir_arg, "write-tree"], dir)?;
    ensure_success(&tree, "git write-tree")?;
    let tree = tree.stdout.trim().to_string();

    let out_arg = out.to_string_lossy();
    let result = run_command_in_dir(
        "git",
        &[&git_dir_arg, "archive", "--format=zip", "-o", &out_arg, &tree],
        dir,
    )?;
    ensure_success(&result, "git archive")?;
    debug!(out = %out.display(), tree = %tree, "Archived working tree");
    Ok(())
}

/// Repository-relative path in git's separator convention
fn pathspec(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn ensure_success(result: &CommandResult, what: &str) -> Result<()> {
    if result.success {
        Ok(())
    } else {
        Err(command_error(what, result))
    }
}

fn command_error(what: &str, result: &CommandResult) -> Error {
    Error::new(
        ErrorCode::GitCommandFailed,
        format!("{what} failed: {}", result.combined_output().trim()),
    )
}

/// Check if we're in a git repository
pub fn is_git_repo(path: &Path) -> bool {
    run_command_in_dir("git", &["rev-parse", "--git-dir"], path)
        .map(|r| r.success)
        .unwrap_or(false)
}
