//! Workflow run endpoints

use crate::client::GithubClient;
use crate::error::ApiResult;
use crate::models::{RunList, WorkflowRun};

/// Largest page GitHub serves
const MAX_PER_PAGE: u32 = 100;

/// Workflow run API interface
#[derive(Clone)]
pub struct RunsApi {
    client: GithubClient,
}

impl RunsApi {
    pub(crate) fn new(client: GithubClient) -> Self {
        Self { client }
    }

    /// Most recent runs, newest first, optionally for one branch
    pub async fn list(&self, per_page: u32, branch: Option<&str>) -> ApiResult<Vec<WorkflowRun>> {
        let mut query = vec![("per_page", clamp(per_page).to_string())];
        if let Some(branch) = branch {
            query.push(("branch", branch.to_string()));
        }
        let list: RunList = self.client.get_repo("actions/runs", &query).await?;
        Ok(list.workflow_runs)
    }

    /// Most recent runs that concluded successfully
    pub async fn list_successful(&self, per_page: u32) -> ApiResult<Vec<WorkflowRun>> {
        let query = [
            ("status", "success".to_string()),
            ("per_page", clamp(per_page).to_string()),
        ];
        let list: RunList = self.client.get_repo("actions/runs", &query).await?;
        Ok(list.workflow_runs)
    }

    /// One run by id
    pub async fn get(&self, run_id: u64) -> ApiResult<WorkflowRun> {
        self.client
            .get_repo(&format!("actions/runs/{run_id}"), &[])
            .await
    }
}

fn clamp(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(clamp(0), 1);
        assert_eq!(clamp(10), 10);
        assert_eq!(clamp(500), 100);
    }
}
