//! Artifact retrieval
//!
//! Fetches the named artifact of a successful run into the output directory,
//! replacing any earlier download of the same name. Contents are not verified.

use crate::backend::CiBackend;
use crate::cancel::CancelToken;
use apkbuilder_android::BuildType;
use apkbuilder_core::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Which artifact to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The configured name if any, else the APK Gradle produces for `build_type`
    pub fn for_build(build_type: BuildType, configured: Option<&str>) -> Self {
        match configured {
            Some(name) if !name.trim().is_empty() => Self::new(name.trim()),
            _ => Self::new(build_type.apk_name()),
        }
    }
}

/// Downloads artifacts from recent successful runs
pub struct ArtifactRetriever<'a> {
    backend: &'a dyn CiBackend,
    success_window: u32,
    cancel: CancelToken,
}

impl<'a> ArtifactRetriever<'a> {
    pub fn new(backend: &'a dyn CiBackend, success_window: u32) -> Self {
        Self {
            backend,
            success_window: success_window.max(1),
            cancel: CancelToken::never(),
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Download `artifact` into `dest`
    ///
    /// With `run_id`, only that run qualifies; without it, the newest
    /// successful run is used.
    pub async fn retrieve(
        &self,
        run_id: Option<u64>,
        artifact: &ArtifactSpec,
        dest: &Path,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(dest).map_err(|e| {
            Error::from(e).with_context(format!("Failed to create {}", dest.display()))
        })?;

        let link = self.backend.actions_url();
        let runs = self
            .cancel
            .guard(self.backend.list_successful_runs(self.success_window))
            .await
            .map_err(|e| e.with_link(link.clone()))?;

        let run = match run_id {
            Some(id) => runs.into_iter().find(|r| r.id == id),
            None => runs.into_iter().next(),
        };
        let Some(run) = run else {
            let which = run_id.map_or_else(|| "any run".to_string(), |id| format!("run {id}"));
            return Err(Error::new(
                ErrorCode::ArtifactNotFound,
                format!(
                    "No successful build found for {which} among the last {} successful runs",
                    self.success_window
                ),
            )
            .with_link(link));
        };

        info!(run_id = run.id, artifact = %artifact.name, "Retrieving artifact");
        let path = self
            .cancel
            .guard(self.backend.download_artifact(run.id, &artifact.name, dest))
            .await
            .map_err(|e| e.with_link(run.html_url.clone()))?;

        if !path.exists() {
            return Err(Error::new(
                ErrorCode::ArtifactNotFound,
                format!("Run {} has no artifact named {}", run.id, artifact.name),
            )
            .with_link(run.html_url));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::Canceller;
    use crate::fakes::{run, Event, Journal, ScriptedBackend};
    use std::time::Duration;
    use apkbuilder_core::ErrorKind;
    use apkbuilder_github::{RunConclusion, RunStatus};

    fn success(id: u64) -> apkbuilder_github::WorkflowRun {
        run(id, "abc", RunStatus::Completed, Some(RunConclusion::Success))
    }

    #[test]
    fn test_artifact_name_for_build() {
        assert_eq!(
            ArtifactSpec::for_build(BuildType::Release, None).name,
            "app-release.apk"
        );
        assert_eq!(
            ArtifactSpec::for_build(BuildType::Debug, Some("custom.apk")).name,
            "custom.apk"
        );
        assert_eq!(
            ArtifactSpec::for_build(BuildType::Debug, Some("  ")).name,
            "app-debug.apk"
        );
    }

    #[tokio::test]
    async fn test_retrieves_matching_run_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("outputs");
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone())
            .with_successful(vec![success(9), success(7)])
            .with_artifact(7, "app-release.apk", b"apk");

        let path = ArtifactRetriever::new(&backend, 5)
            .retrieve(Some(7), &ArtifactSpec::new("app-release.apk"), &dest)
            .await
            .unwrap();

        assert_eq!(path, dest.join("app-release.apk"));
        assert_eq!(std::fs::read(&path).unwrap(), b"apk");
        assert!(journal.events().contains(&Event::Download {
            run_id: 7,
            name: "app-release.apk".to_string()
        }));
    }

    #[tokio::test]
    async fn test_standalone_uses_newest_success() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::new(Journal::new())
            .with_successful(vec![success(9), success(7)])
            .with_artifact(9, "app-debug.apk", b"new");

        let path = ArtifactRetriever::new(&backend, 5)
            .retrieve(None, &ArtifactSpec::new("app-debug.apk"), dir.path())
            .await
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_run_outside_window_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone())
            .with_successful(vec![success(1), success(2), success(3)]);

        let err = ArtifactRetriever::new(&backend, 2)
            .retrieve(Some(3), &ArtifactSpec::new("app-release.apk"), dir.path())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ArtifactNotFound);
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert!(err.link.is_some());
        assert_eq!(journal.count(|e| matches!(e, Event::Download { .. })), 0);
    }

    #[tokio::test]
    async fn test_download_failure_is_transport() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::new(Journal::new()).with_successful(vec![success(4)]);

        let err = ArtifactRetriever::new(&backend, 5)
            .retrieve(Some(4), &ArtifactSpec::new("app-release.apk"), dir.path())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(
            err.link.as_deref(),
            Some("https://github.com/acme/app/actions/runs/4")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_hung_download() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone()).with_hanging_requests();
        let (canceller, token) = Canceller::new();

        let retriever = ArtifactRetriever::new(&backend, 5).with_cancel(token);
        let artifact = ArtifactSpec::new("app-release.apk");
        let retrieve = tokio::time::timeout(
            Duration::from_secs(2),
            retriever.retrieve(Some(4), &artifact, dir.path()),
        );
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        };

        let (result, ()) = tokio::join!(retrieve, cancel);
        let err = result.expect("retrieval should stop once cancelled").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(journal.count(|e| *e == Event::ListSuccessful), 1);
    }
}
