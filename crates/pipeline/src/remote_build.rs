//! Poll, then retrieve: everything after a successful push

use crate::artifact::{ArtifactRetriever, ArtifactSpec};
use crate::backend::CiBackend;
use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::poller::{BuildPoller, PollConfig, PollOutcome, ProgressSink};
use crate::publisher::Revision;
use apkbuilder_core::{Error, ErrorCode, Result};
use apkbuilder_github::{RunConclusion, WorkflowRun};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of waiting for a revision's build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The run succeeded and its artifact is on disk
    Delivered {
        run: WorkflowRun,
        artifact: PathBuf,
        elapsed: Duration,
    },
    /// The run completed without success; nothing was downloaded
    Failed {
        conclusion: RunConclusion,
        run_url: String,
    },
}

impl BuildOutcome {
    /// Escalate a failed run into a `RemoteFailure` error
    pub fn into_result(self) -> Result<(WorkflowRun, PathBuf, Duration)> {
        match self {
            Self::Delivered {
                run,
                artifact,
                elapsed,
            } => Ok((run, artifact, elapsed)),
            Self::Failed {
                conclusion,
                run_url,
            } => Err(Error::new(
                ErrorCode::RunFailed,
                format!("CI build finished with conclusion: {conclusion}"),
            )
            .with_link(run_url)),
        }
    }
}

/// Waits for a pushed revision and fetches its artifact
pub struct RemoteBuild<'a> {
    backend: &'a dyn CiBackend,
    clock: &'a dyn Clock,
    config: PollConfig,
    cancel: CancelToken,
}

impl<'a> RemoteBuild<'a> {
    pub fn new(backend: &'a dyn CiBackend, clock: &'a dyn Clock, config: PollConfig) -> Self {
        Self {
            backend,
            clock,
            config,
            cancel: CancelToken::never(),
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Poll until `revision`'s run completes; on success download `artifact`
    /// into `out_dir`
    pub async fn complete(
        &self,
        revision: &Revision,
        artifact: &ArtifactSpec,
        out_dir: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<BuildOutcome> {
        let poller = BuildPoller::new(self.backend, self.clock, self.config.clone())
            .with_cancel(self.cancel.clone());

        let start = self.clock.now();
        match poller.wait(revision, sink).await? {
            PollOutcome::Succeeded { run, .. } => {
                let retriever = ArtifactRetriever::new(self.backend, self.config.success_window)
                    .with_cancel(self.cancel.clone());
                let path = retriever.retrieve(Some(run.id), artifact, out_dir).await?;
                Ok(BuildOutcome::Delivered {
                    run,
                    artifact: path,
                    elapsed: self.clock.now().saturating_duration_since(start),
                })
            }
            PollOutcome::Failed {
                conclusion,
                run_url,
                ..
            } => Ok(BuildOutcome::Failed {
                conclusion,
                run_url,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::fakes::{run, Event, Journal, RecordingSink, ScriptedBackend};
    use apkbuilder_core::ErrorKind;
    use apkbuilder_github::RunStatus;

    const SHA: &str = "89e6c98d92887913cadf06b2adb97f26cde4849b";

    fn ours(status: RunStatus, conclusion: Option<RunConclusion>) -> WorkflowRun {
        run(5, SHA, status, conclusion)
    }

    fn config() -> PollConfig {
        PollConfig {
            branch: None,
            ..PollConfig::default()
        }
    }

    #[tokio::test]
    async fn test_two_reports_then_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new();
        let done = ours(RunStatus::Completed, Some(RunConclusion::Success));
        let backend = ScriptedBackend::new(journal.clone())
            .with_listings(vec![vec![ours(RunStatus::Queued, None)]])
            .with_statuses(vec![
                ours(RunStatus::InProgress, None),
                ours(RunStatus::InProgress, None),
                done.clone(),
            ])
            .with_successful(vec![done])
            .with_artifact(5, "app-release.apk", b"apk");
        let clock = ManualClock::new();
        let mut sink = RecordingSink::new(journal.clone());

        let outcome = RemoteBuild::new(&backend, &clock, config())
            .complete(
                &Revision::new(SHA),
                &ArtifactSpec::new("app-release.apk"),
                dir.path(),
                &mut sink,
            )
            .await
            .unwrap();

        let download = journal
            .position(|e| matches!(e, Event::Download { .. }))
            .unwrap();
        let reports_before = journal.events()[..download]
            .iter()
            .filter(|e| matches!(e, Event::Progress(_)))
            .count();
        assert_eq!(reports_before, 2);
        assert_eq!(journal.count(|e| matches!(e, Event::Progress(_))), 2);

        let (run, artifact, elapsed) = outcome.into_result().unwrap();
        assert_eq!(run.id, 5);
        assert!(artifact.exists());
        assert_eq!(elapsed, Duration::from_secs(40));
    }

    #[tokio::test]
    async fn test_failure_never_retrieves() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new();
        let failed = ours(RunStatus::Completed, Some(RunConclusion::Failure));
        let backend = ScriptedBackend::new(journal.clone())
            .with_listings(vec![vec![failed.clone()]])
            .with_statuses(vec![failed])
            .with_artifact(5, "app-release.apk", b"apk");
        let clock = ManualClock::new();

        let outcome = RemoteBuild::new(&backend, &clock, config())
            .complete(
                &Revision::new(SHA),
                &ArtifactSpec::new("app-release.apk"),
                &dir.path().join("out"),
                &mut RecordingSink::new(journal.clone()),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BuildOutcome::Failed {
                conclusion: RunConclusion::Failure,
                run_url: "https://github.com/acme/app/actions/runs/5".to_string(),
            }
        );
        assert_eq!(journal.count(|e| *e == Event::ListSuccessful), 0);
        assert_eq!(journal.count(|e| matches!(e, Event::Download { .. })), 0);
        assert!(!dir.path().join("out").exists());

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert!(err.link.is_some());
    }
}
