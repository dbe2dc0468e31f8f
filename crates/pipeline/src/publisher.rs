//! Publish a project tree to the branch that triggers CI
//!
//! The push is the only trigger for a remote build. It is a single attempt:
//! a failed push surfaces as an error and is never retried.

use crate::vcs::Vcs;
use apkbuilder_core::credential::Credential;
use apkbuilder_core::git::{redact, PushMode};
use apkbuilder_core::remote::authenticated_url;
use apkbuilder_core::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Commit hash identifying what was pushed; the key used to find its CI run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    pub fn new(sha: impl Into<String>) -> Self {
        Self(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for display
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where and how a publish lands
#[derive(Debug, Clone)]
pub struct PublishTarget {
    /// Remote URL; https URLs get the credential injected at push time
    pub remote_url: String,
    /// Branch whose pushes trigger CI
    pub branch: String,
    /// Message for the automatic commit
    pub commit_message: String,
    /// Paths under the project directory that are never published
    pub exclude: Vec<PathBuf>,
}

/// Stages, commits, and force-pushes one project directory
pub struct Publisher<V> {
    vcs: V,
    project_dir: PathBuf,
    target: PublishTarget,
}

impl<V: Vcs> Publisher<V> {
    pub fn new(vcs: V, project_dir: impl Into<PathBuf>, target: PublishTarget) -> Self {
        Self {
            vcs,
            project_dir: project_dir.into(),
            target,
        }
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Publish the whole tree and return the pushed revision
    ///
    /// Fails before touching git when the credential is missing or the
    /// project directory does not exist.
    pub fn publish(&self, credential: Option<&Credential>, mode: &PushMode) -> Result<Revision> {
        let credential = self.preflight(credential)?;

        self.vcs.ensure_initialized()?;
        self.vcs.stage_all(&self.target.exclude)?;

        let has_head = self.vcs.has_head()?;
        let staged = self.vcs.has_staged_changes()?;
        if staged || !has_head {
            debug!(staged, has_head, "Creating build commit");
            self.vcs.commit(&self.target.commit_message, !staged)?;
        } else {
            debug!("Nothing to commit, pushing current HEAD");
        }

        self.push_head(credential, mode)
    }

    /// Push a commit that keeps only `keep` tracked
    ///
    /// Files stay on disk; they are only removed from the index.
    pub fn clean(&self, credential: Option<&Credential>, keep: &Path) -> Result<Revision> {
        let credential = self.preflight(credential)?;

        self.vcs.ensure_initialized()?;
        self.vcs.retain_only(keep)?;

        let has_head = self.vcs.has_head()?;
        let staged = self.vcs.has_staged_changes()?;
        if staged || !has_head {
            self.vcs.commit("Clean repository", !staged)?;
        }

        self.push_head(credential, &PushMode::Force)
    }

    /// Bring the local tree up to date with the CI branch
    ///
    /// The credential is optional here: public https remotes and local paths
    /// pull without one.
    pub fn refresh(&self, credential: Option<&Credential>) -> Result<Revision> {
        if !self.project_dir.is_dir() {
            return Err(Error::directory_not_found(&self.project_dir));
        }
        self.vcs.ensure_initialized()?;

        let branch = &self.target.branch;
        let (url, secrets) = match credential {
            Some(c) => (authenticated_url(&self.target.remote_url, c), vec![c.expose()]),
            None => (self.target.remote_url.clone(), Vec::new()),
        };
        info!(branch = %branch, remote = %redact(&url, &secrets), "Pulling");
        self.vcs.pull(&url, branch, &secrets)?;

        Ok(Revision::new(self.vcs.head_revision()?))
    }

    /// Revision of the current HEAD, without publishing anything
    pub fn current_revision(&self) -> Result<Revision> {
        if !self.project_dir.is_dir() {
            return Err(Error::directory_not_found(&self.project_dir));
        }
        Ok(Revision::new(self.vcs.head_revision()?))
    }

    fn preflight<'c>(&self, credential: Option<&'c Credential>) -> Result<&'c Credential> {
        let credential = credential.ok_or_else(Error::missing_credential)?;
        if !self.project_dir.is_dir() {
            return Err(Error::directory_not_found(&self.project_dir));
        }
        Ok(credential)
    }

    fn push_head(&self, credential: &Credential, mode: &PushMode) -> Result<Revision> {
        let branch = &self.target.branch;
        self.vcs.rename_branch(branch)?;
        let revision = Revision::new(self.vcs.head_revision()?);

        let url = authenticated_url(&self.target.remote_url, credential);
        info!(
            revision = %revision.short(),
            branch = %branch,
            remote = %redact(&url, &[credential.expose()]),
            "Pushing"
        );
        self.vcs.push(&url, branch, mode, &[credential.expose()])?;

        Ok(revision)
    }
}
