//! Artifact endpoints

use crate::client::GithubClient;
use crate::error::ApiResult;
use crate::models::{Artifact, ArtifactList};

/// Artifact API interface
#[derive(Clone)]
pub struct ArtifactsApi {
    client: GithubClient,
}

impl ArtifactsApi {
    pub(crate) fn new(client: GithubClient) -> Self {
        Self { client }
    }

    /// Artifacts uploaded by one run
    pub async fn for_run(&self, run_id: u64) -> ApiResult<Vec<Artifact>> {
        let list: ArtifactList = self
            .client
            .get_repo(&format!("actions/runs/{run_id}/artifacts"), &[])
            .await?;
        Ok(list.artifacts)
    }

    /// The unexpired artifact called `name`, if the run has one
    pub async fn find(&self, run_id: u64, name: &str) -> ApiResult<Option<Artifact>> {
        Ok(self
            .for_run(run_id)
            .await?
            .into_iter()
            .find(|a| a.name == name && !a.expired))
    }
}
