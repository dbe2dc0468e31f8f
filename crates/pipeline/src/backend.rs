//! CI backend port
//!
//! The poller and artifact retrieval talk to CI only through [`CiBackend`].
//! [`GithubBackend`] is the production adapter.

use apkbuilder_core::credential::Credential;
use apkbuilder_core::remote::RepoSlug;
use apkbuilder_core::{Error, ErrorCode, Result};
use apkbuilder_github::{gh, GithubClient, WorkflowRun};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Remote CI operations the pipeline needs
#[async_trait]
pub trait CiBackend: Send + Sync {
    /// Most recent `window` runs, newest first
    async fn list_runs(&self, window: u32, branch: Option<&str>) -> Result<Vec<WorkflowRun>>;

    /// One run by id
    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun>;

    /// Most recent `window` runs that concluded successfully
    async fn list_successful_runs(&self, window: u32) -> Result<Vec<WorkflowRun>>;

    /// Download artifact `name` of `run_id` into `dest`, returning the file path
    async fn download_artifact(&self, run_id: u64, name: &str, dest: &Path) -> Result<PathBuf>;

    /// Page a human can open to inspect runs manually
    fn actions_url(&self) -> String;
}

/// GitHub Actions over REST, with downloads through `gh`
#[derive(Clone)]
pub struct GithubBackend {
    client: GithubClient,
}

impl GithubBackend {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }

    fn repo(&self) -> &RepoSlug {
        &self.client.config().repo
    }

    fn token(&self) -> &Credential {
        &self.client.config().token
    }
}

#[async_trait]
impl CiBackend for GithubBackend {
    async fn list_runs(&self, window: u32, branch: Option<&str>) -> Result<Vec<WorkflowRun>> {
        Ok(self.client.runs().list(window, branch).await?)
    }

    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun> {
        Ok(self.client.runs().get(run_id).await?)
    }

    async fn list_successful_runs(&self, window: u32) -> Result<Vec<WorkflowRun>> {
        Ok(self.client.runs().list_successful(window).await?)
    }

    async fn download_artifact(&self, run_id: u64, name: &str, dest: &Path) -> Result<PathBuf> {
        if self.client.artifacts().find(run_id, name).await?.is_none() {
            return Err(Error::new(
                ErrorCode::ArtifactNotFound,
                format!("Run {run_id} has no unexpired artifact named {name}"),
            )
            .with_suggestion("Check the upload-artifact step name in the workflow"));
        }
        Ok(gh::download_artifact(self.repo(), self.token(), run_id, name, dest).await?)
    }

    fn actions_url(&self) -> String {
        self.repo().actions_url()
    }
}
