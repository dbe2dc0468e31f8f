//! GitHub Actions response types
//!
//! Only the fields the build pipeline reads are modelled; unknown status and
//! conclusion strings deserialize to `Unknown` rather than failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Pending,
    Waiting,
    Requested,
    InProgress,
    Completed,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// `Completed` is the only status after which a run never changes
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Requested => "requested",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

/// Outcome of a completed workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    TimedOut,
    Skipped,
    Neutral,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

impl RunConclusion {
    /// Whether the run produced usable artifacts
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed out",
            Self::Skipped => "skipped",
            Self::Neutral => "neutral",
            Self::ActionRequired => "action required",
            Self::Stale => "stale",
            Self::StartupFailure => "startup failure",
            Self::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

/// One workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub head_sha: String,
    #[serde(default)]
    pub head_branch: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl WorkflowRun {
    /// Whether this run built `revision`
    pub fn built(&self, revision: &str) -> bool {
        self.head_sha.eq_ignore_ascii_case(revision)
    }
}

/// `GET /actions/runs` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RunList {
    #[serde(default)]
    pub total_count: u64,
    pub workflow_runs: Vec<WorkflowRun>,
}

/// One uploaded artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub size_in_bytes: u64,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub archive_download_url: String,
}

/// `GET /actions/runs/{id}/artifacts` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactList {
    #[serde(default)]
    pub total_count: u64,
    pub artifacts: Vec<Artifact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_list_deserialize() {
        let json = r#"{
            "total_count": 2,
            "workflow_runs": [
                {
                    "id": 30433642,
                    "name": "Build",
                    "head_sha": "ACB5820CED9479C074F688CC328BF03F341A511D",
                    "head_branch": "main",
                    "status": "completed",
                    "conclusion": "success",
                    "html_url": "https://github.com/acme/app/actions/runs/30433642",
                    "created_at": "2026-01-01T00:00:00Z",
                    "run_number": 562
                },
                {
                    "id": 30433643,
                    "head_sha": "deadbeef",
                    "status": "in_progress",
                    "conclusion": null
                }
            ]
        }"#;

        let list: RunList = serde_json::from_str(json).unwrap();
        assert_eq!(list.total_count, 2);
        let done = &list.workflow_runs[0];
        assert_eq!(done.status, RunStatus::Completed);
        assert_eq!(done.conclusion, Some(RunConclusion::Success));
        assert!(done.built("acb5820ced9479c074f688cc328bf03f341a511d"));

        let running = &list.workflow_runs[1];
        assert_eq!(running.status, RunStatus::InProgress);
        assert!(!running.status.is_terminal());
        assert_eq!(running.conclusion, None);
    }

    #[test]
    fn test_unknown_values_do_not_fail() {
        let run: WorkflowRun = serde_json::from_str(
            r#"{"id": 1, "head_sha": "a", "status": "brand_new", "conclusion": "mystery"}"#,
        )
        .unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert_eq!(run.conclusion, Some(RunConclusion::Unknown));
    }

    #[test]
    fn test_artifact_list_deserialize() {
        let json = r#"{
            "total_count": 1,
            "artifacts": [{
                "id": 11,
                "name": "app-release.apk",
                "size_in_bytes": 556,
                "expired": false,
                "archive_download_url": "https://api.github.com/repos/acme/app/actions/artifacts/11/zip"
            }]
        }"#;
        let list: ArtifactList = serde_json::from_str(json).unwrap();
        assert_eq!(list.artifacts[0].name, "app-release.apk");
        assert!(!list.artifacts[0].expired);
    }
}
