//! Build-status poller
//!
//! After a push, find the CI run whose head commit is the pushed revision,
//! then poll it until it completes:
//!
//! ```text
//! LocatingRun ──match──▶ Monitoring ──completed──▶ Terminal
//!      │ max attempts          │ deadline
//!      ▼                       ▼
//!   Timeout                 Timeout
//! ```
//!
//! Every suspension point observes the cancellation token. Any error from
//! the backend aborts the loop and carries a link for manual inspection.

use crate::backend::CiBackend;
use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::publisher::Revision;
use apkbuilder_core::config::PollSettings;
use apkbuilder_core::{Error, Result};
use apkbuilder_github::{RunConclusion, RunStatus, WorkflowRun};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timing and window parameters for one wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status polls of a located run
    pub interval: Duration,
    /// Delay between listings while locating the run
    pub locate_interval: Duration,
    /// Listings before giving up on locating the run
    pub max_locate_attempts: u32,
    /// Overall bound, measured from the start of the wait
    pub deadline: Duration,
    /// Static guess of build duration, reported as ETA
    pub estimated: Duration,
    /// Runs inspected per listing
    pub run_window: u32,
    /// Successful runs inspected by artifact retrieval
    pub success_window: u32,
    /// Restrict listings to this branch
    pub branch: Option<String>,
}

impl PollConfig {
    pub fn from_settings(settings: &PollSettings, branch: Option<String>) -> Self {
        Self {
            interval: settings.interval(),
            locate_interval: settings.locate_interval(),
            max_locate_attempts: settings.max_locate_attempts.max(1),
            deadline: settings.timeout(),
            estimated: settings.estimated(),
            run_window: settings.run_window.max(1),
            success_window: settings.success_window.max(1),
            branch,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::from_settings(&PollSettings::default(), Some("main".to_string()))
    }
}

/// Where the poller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    LocatingRun,
    Monitoring { run_id: u64 },
    Terminal,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocatingRun => f.write_str("locating run"),
            Self::Monitoring { run_id } => write!(f, "monitoring run {run_id}"),
            Self::Terminal => f.write_str("terminal"),
        }
    }
}

/// One non-terminal observation of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub run_id: u64,
    pub status: RunStatus,
    pub elapsed: Duration,
    pub estimated: Duration,
    pub run_url: String,
}

impl ProgressReport {
    /// Time left if the estimate holds; `None` once it is exceeded
    pub fn remaining(&self) -> Option<Duration> {
        self.estimated.checked_sub(self.elapsed)
    }
}

/// Receives poller events, e.g. to drive a spinner
pub trait ProgressSink {
    fn state_changed(&mut self, _state: PollState) {}

    /// A listing did not contain the revision
    fn locate_miss(&mut self, _attempt: u32, _max_attempts: u32) {}

    /// Exactly one call per non-terminal status observation
    fn progress(&mut self, report: &ProgressReport);
}

/// Sink that drops every event
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&mut self, _report: &ProgressReport) {}
}

/// How a located run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Succeeded {
        run: WorkflowRun,
        elapsed: Duration,
    },
    Failed {
        run: WorkflowRun,
        conclusion: RunConclusion,
        run_url: String,
        elapsed: Duration,
    },
}

impl PollOutcome {
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Succeeded { elapsed, .. } | Self::Failed { elapsed, .. } => *elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Waits for the CI run of one revision
pub struct BuildPoller<'a> {
    backend: &'a dyn CiBackend,
    clock: &'a dyn Clock,
    config: PollConfig,
    cancel: CancelToken,
}

impl<'a> BuildPoller<'a> {
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

    /// Block until the run for `revision` completes
    ///
    /// A failed run is an `Ok(PollOutcome::Failed)`; errors are reserved for
    /// timeouts, cancellation, and backend failures.
    pub async fn wait(
        &self,
        revision: &Revision,
        sink: &mut dyn ProgressSink,
    ) -> Result<PollOutcome> {
        let start = self.clock.now();
        info!(revision = %revision.short(), "Waiting for CI run");

        sink.state_changed(PollState::LocatingRun);
        let run = self.locate(revision, start, sink).await?;

        sink.state_changed(PollState::Monitoring { run_id: run.id });
        let outcome = self.monitor(run, start, sink).await?;

        sink.state_changed(PollState::Terminal);
        Ok(outcome)
    }

    async fn locate(
        &self,
        revision: &Revision,
        start: Instant,
        sink: &mut dyn ProgressSink,
    ) -> Result<WorkflowRun> {
        let max = self.config.max_locate_attempts;
        let actions_url = self.backend.actions_url();

        for attempt in 1..=max {
            self.checkpoint(start, &actions_url)?;

            let runs = self
                .cancel
                .guard(
                    self.backend
                        .list_runs(self.config.run_window, self.config.branch.as_deref()),
                )
                .await
                .map_err(|e| with_inspection_link(e, &actions_url))?;

            if let Some(run) = runs.into_iter().find(|r| r.built(revision.as_str())) {
                info!(run_id = run.id, attempt, "Located CI run");
                return Ok(run);
            }

            debug!(attempt, max, "Run not listed yet");
            sink.locate_miss(attempt, max);
            if attempt < max {
                self.pause(self.config.locate_interval).await?;
            }
        }

        warn!(attempts = max, revision = %revision.short(), "Gave up locating CI run");
        Err(Error::timeout(format!(
            "No CI run for {} after {max} listings",
            revision.short()
        ))
        .with_suggestion("Check that a workflow triggers on pushes to this branch")
        .with_link(actions_url))
    }

    async fn monitor(
        &self,
        located: WorkflowRun,
        start: Instant,
        sink: &mut dyn ProgressSink,
    ) -> Result<PollOutcome> {
        let run_id = located.id;
        let run_url = if located.html_url.is_empty() {
            self.backend.actions_url()
        } else {
            located.html_url.clone()
        };

        loop {
            self.checkpoint(start, &run_url)?;

            let run = self
                .cancel
                .guard(self.backend.get_run(run_id))
                .await
                .map_err(|e| with_inspection_link(e, &run_url))?;
            let elapsed = self.clock.now().saturating_duration_since(start);

            if run.status.is_terminal() {
                let conclusion = run.conclusion.unwrap_or(RunConclusion::Unknown);
                info!(
                    run_id,
                    conclusion = %conclusion,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "CI run completed"
                );
                return Ok(if conclusion.is_success() {
                    PollOutcome::Succeeded { run, elapsed }
                } else {
                    PollOutcome::Failed {
                        run,
                        conclusion,
                        run_url,
                        elapsed,
                    }
                });
            }

            debug!(run_id, status = %run.status, elapsed_ms = elapsed.as_millis() as u64, "CI run in progress");
            sink.progress(&ProgressReport {
                run_id,
                status: run.status,
                elapsed,
                estimated: self.config.estimated,
                run_url: run_url.clone(),
            });

            self.pause(self.config.interval).await?;
        }
    }

    /// Fail if cancelled or past the deadline
    fn checkpoint(&self, start: Instant, link: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::cancelled());
        }
        let elapsed = self.clock.now().saturating_duration_since(start);
        if elapsed >= self.config.deadline {
            return Err(Error::timeout(format!(
                "CI run did not finish within {}s",
                self.config.deadline.as_secs()
            ))
            .with_link(link));
        }
        Ok(())
    }

    async fn pause(&self, duration: Duration) -> Result<()> {
        self.cancel
            .guard(async {
                self.clock.sleep(duration).await;
                Ok(())
            })
            .await
    }
}

fn with_inspection_link(error: Error, link: &str) -> Error {
    if error.link.is_some() {
        error
    } else {
        error.with_link(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::Canceller;
    use crate::clock::ManualClock;
    use crate::fakes::{run, Event, Journal, RecordingSink, ScriptedBackend};
    use apkbuilder_core::ErrorKind;

    const SHA: &str = "3f786850e387550fdab836ed7e6dc881de23001b";

    fn config() -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(20),
            locate_interval: Duration::from_secs(10),
            max_locate_attempts: 5,
            deadline: Duration::from_secs(1800),
            estimated: Duration::from_secs(240),
            run_window: 10,
            success_window: 5,
            branch: Some("main".to_string()),
        }
    }

    fn other(id: u64) -> WorkflowRun {
        run(id, "0000000000000000000000000000000000000000", RunStatus::Completed, Some(RunConclusion::Success))
    }

    fn ours(status: RunStatus, conclusion: Option<RunConclusion>) -> WorkflowRun {
        run(42, SHA, status, conclusion)
    }

    #[tokio::test]
    async fn test_nth_listing_is_the_transition_point() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone())
            .with_listings(vec![
                vec![other(1)],
                vec![other(1)],
                vec![ours(RunStatus::Queued, None), other(1)],
            ])
            .with_statuses(vec![ours(RunStatus::Completed, Some(RunConclusion::Success))]);
        let clock = ManualClock::new();
        let mut sink = RecordingSink::new(journal.clone());

        let poller = BuildPoller::new(&backend, &clock, config());
        let outcome = poller.wait(&Revision::new(SHA), &mut sink).await.unwrap();
        assert!(outcome.is_success());

        let monitoring = journal
            .position(|e| matches!(e, Event::State(PollState::Monitoring { .. })))
            .unwrap();
        let lists_before = journal.events()[..monitoring]
            .iter()
            .filter(|e| **e == Event::ListRuns)
            .count();
        assert_eq!(lists_before, 3);
        assert_eq!(journal.count(|e| *e == Event::ListRuns), 3);
        assert_eq!(journal.count(|e| matches!(e, Event::LocateMiss(_))), 2);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(10), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_one_report_per_non_terminal_observation() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone())
            .with_listings(vec![vec![ours(RunStatus::Queued, None)]])
            .with_statuses(vec![
                ours(RunStatus::InProgress, None),
                ours(RunStatus::InProgress, None),
                ours(RunStatus::Completed, Some(RunConclusion::Success)),
            ]);
        let clock = ManualClock::new();
        let mut sink = RecordingSink::new(journal.clone());

        let outcome = BuildPoller::new(&backend, &clock, config())
            .wait(&Revision::new(SHA), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.reports.len(), 2);
        assert_eq!(sink.reports[0].elapsed, Duration::ZERO);
        assert_eq!(sink.reports[1].elapsed, Duration::from_secs(20));
        assert_eq!(sink.reports[1].remaining(), Some(Duration::from_secs(220)));
        assert_eq!(outcome.elapsed(), Duration::from_secs(40));
        assert_eq!(journal.count(|e| matches!(e, Event::GetRun(42))), 3);
    }

    #[tokio::test]
    async fn test_failed_run_is_an_outcome() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone())
            .with_listings(vec![vec![ours(RunStatus::Completed, Some(RunConclusion::Failure))]])
            .with_statuses(vec![ours(RunStatus::Completed, Some(RunConclusion::Failure))]);
        let clock = ManualClock::new();

        let outcome = BuildPoller::new(&backend, &clock, config())
            .wait(&Revision::new(SHA), &mut RecordingSink::new(journal.clone()))
            .await
            .unwrap();

        match outcome {
            PollOutcome::Failed {
                conclusion,
                run_url,
                ..
            } => {
                assert_eq!(conclusion, RunConclusion::Failure);
                assert_eq!(run_url, "https://github.com/acme/app/actions/runs/42");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(journal.events().last(), Some(&Event::State(PollState::Terminal)));
    }

    #[tokio::test]
    async fn test_locate_gives_up_after_max_attempts() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone()).with_listings(vec![vec![other(1)]]);
        let clock = ManualClock::new();
        let mut cfg = config();
        cfg.max_locate_attempts = 3;

        let err = BuildPoller::new(&backend, &clock, cfg)
            .wait(&Revision::new(SHA), &mut RecordingSink::new(journal.clone()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.link.as_deref(), Some("https://github.com/acme/app/actions"));
        assert_eq!(journal.count(|e| *e == Event::ListRuns), 3);
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_deadline_bounds_monitoring() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone())
            .with_listings(vec![vec![ours(RunStatus::Queued, None)]])
            .with_statuses(vec![ours(RunStatus::InProgress, None)]);
        let clock = ManualClock::new();
        let mut cfg = config();
        cfg.deadline = Duration::from_secs(60);
        let mut sink = RecordingSink::new(journal.clone());

        let err = BuildPoller::new(&backend, &clock, cfg)
            .wait(&Revision::new(SHA), &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(
            err.link.as_deref(),
            Some("https://github.com/acme/app/actions/runs/42")
        );
        assert_eq!(sink.reports.len(), 3);
    }

    #[tokio::test]
    async fn test_transport_error_carries_actions_link() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone()).with_failing_listings();
        let clock = ManualClock::new();

        let err = BuildPoller::new(&backend, &clock, config())
            .wait(&Revision::new(SHA), &mut RecordingSink::new(journal.clone()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.link.as_deref(), Some("https://github.com/acme/app/actions"));
        assert_eq!(journal.count(|e| *e == Event::ListRuns), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone());
        let clock = ManualClock::new();
        let (canceller, token) = Canceller::new();
        canceller.cancel();

        let err = BuildPoller::new(&backend, &clock, config())
            .with_cancel(token)
            .wait(&Revision::new(SHA), &mut RecordingSink::new(journal.clone()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(journal.count(|e| *e == Event::ListRuns), 0);
    }

    /// Cancels as soon as the first listing misses
    struct CancelOnMiss(Canceller);

    impl ProgressSink for CancelOnMiss {
        fn locate_miss(&mut self, _attempt: u32, _max_attempts: u32) {
            self.0.cancel();
        }

        fn progress(&mut self, _report: &ProgressReport) {}
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone()).with_listings(vec![vec![other(1)]]);
        let clock = ManualClock::new();
        let (canceller, token) = Canceller::new();

        let err = BuildPoller::new(&backend, &clock, config())
            .with_cancel(token)
            .wait(&Revision::new(SHA), &mut CancelOnMiss(canceller))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(journal.count(|e| *e == Event::ListRuns), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_hung_request() {
        let journal = Journal::new();
        let backend = ScriptedBackend::new(journal.clone()).with_hanging_requests();
        let clock = ManualClock::new();
        let (canceller, token) = Canceller::new();
        let mut sink = RecordingSink::new(journal.clone());

        let poller = BuildPoller::new(&backend, &clock, config()).with_cancel(token);
        let revision = Revision::new(SHA);
        let wait = tokio::time::timeout(
            Duration::from_secs(2),
            poller.wait(&revision, &mut sink),
        );
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        };

        let (result, ()) = tokio::join!(wait, cancel);
        let err = result.expect("wait should stop once cancelled").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(journal.count(|e| *e == Event::ListRuns), 1);
    }

    #[test]
    fn test_config_from_settings() {
        let cfg = PollConfig::default();
        assert_eq!(cfg.interval, Duration::from_secs(20));
        assert_eq!(cfg.locate_interval, Duration::from_secs(10));
        assert_eq!(cfg.max_locate_attempts, 30);
        assert_eq!(cfg.deadline, Duration::from_secs(1800));
        assert_eq!(cfg.branch.as_deref(), Some("main"));
    }
}
