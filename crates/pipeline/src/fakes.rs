//! In-memory fakes for the pipeline ports (testing only)
//!
//! `ScriptedBackend` answers CI calls from a script and writes artifacts to
//! disk; `RecordingSink` records poller events. Both can share a [`Journal`]
//! so tests can assert on the interleaving of calls and reports.

use crate::backend::CiBackend;
use crate::poller::{PollState, ProgressReport, ProgressSink};
use apkbuilder_core::{Error, ErrorCode, Result};
use apkbuilder_github::{RunConclusion, RunStatus, WorkflowRun};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Something that happened during a test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ListRuns,
    GetRun(u64),
    ListSuccessful,
    Download { run_id: u64, name: String },
    State(PollState),
    LocateMiss(u32),
    Progress(RunStatus),
}

/// Ordered, shareable event log
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        lock(&self.0).push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        lock(&self.0).clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        lock(&self.0).iter().filter(|e| pred(e)).count()
    }

    /// Position of the first event matching `pred`
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        lock(&self.0).iter().position(|e| pred(e))
    }
}

/// A run record for scripts
pub fn run(id: u64, sha: &str, status: RunStatus, conclusion: Option<RunConclusion>) -> WorkflowRun {
    WorkflowRun {
        id,
        name: Some("Android CI".to_string()),
        head_sha: sha.to_string(),
        head_branch: Some("main".to_string()),
        status,
        conclusion,
        html_url: format!("https://github.com/acme/app/actions/runs/{id}"),
        created_at: None,
    }
}

/// CI backend that replays scripted responses
///
/// Listings and statuses are consumed front to back; the last entry repeats
/// once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    journal: Journal,
    listings: Mutex<VecDeque<Vec<WorkflowRun>>>,
    statuses: Mutex<VecDeque<WorkflowRun>>,
    successful: Mutex<Vec<WorkflowRun>>,
    artifacts: Mutex<HashMap<(u64, String), Vec<u8>>>,
    failing_listings: bool,
    hanging: bool,
}

impl ScriptedBackend {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_listings(self, listings: Vec<Vec<WorkflowRun>>) -> Self {
        *lock(&self.listings) = listings.into();
        self
    }

    #[must_use]
    pub fn with_statuses(self, statuses: Vec<WorkflowRun>) -> Self {
        *lock(&self.statuses) = statuses.into();
        self
    }

    #[must_use]
    pub fn with_successful(self, runs: Vec<WorkflowRun>) -> Self {
        *lock(&self.successful) = runs;
        self
    }

    #[must_use]
    pub fn with_artifact(self, run_id: u64, name: &str, contents: &[u8]) -> Self {
        lock(&self.artifacts).insert((run_id, name.to_string()), contents.to_vec());
        self
    }

    /// Make every listing fail as if the network were down
    #[must_use]
    pub fn with_failing_listings(mut self) -> Self {
        self.failing_listings = true;
        self
    }

    /// Make every call journal itself and then never return
    #[must_use]
    pub fn with_hanging_requests(mut self) -> Self {
        self.hanging = true;
        self
    }

    async fn hang_if_scripted(&self) {
        if self.hanging {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl CiBackend for ScriptedBackend {
    async fn list_runs(&self, _window: u32, _branch: Option<&str>) -> Result<Vec<WorkflowRun>> {
        self.journal.push(Event::ListRuns);
        self.hang_if_scripted().await;
        if self.failing_listings {
            return Err(Error::api("connection reset by peer"));
        }
        Ok(next_or_last(&mut lock(&self.listings)).unwrap_or_default())
    }

    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun> {
        self.journal.push(Event::GetRun(run_id));
        self.hang_if_scripted().await;
        next_or_last(&mut lock(&self.statuses))
            .ok_or_else(|| Error::new(ErrorCode::RunNotFound, format!("run {run_id} not scripted")))
    }

    async fn list_successful_runs(&self, window: u32) -> Result<Vec<WorkflowRun>> {
        self.journal.push(Event::ListSuccessful);
        self.hang_if_scripted().await;
        Ok(lock(&self.successful)
            .iter()
            .take(window as usize)
            .cloned()
            .collect())
    }

    async fn download_artifact(&self, run_id: u64, name: &str, dest: &Path) -> Result<PathBuf> {
        self.journal.push(Event::Download {
            run_id,
            name: name.to_string(),
        });
        self.hang_if_scripted().await;
        let contents = lock(&self.artifacts)
            .get(&(run_id, name.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorCode::ArtifactDownloadFailed,
                    format!("no artifact {name} for run {run_id}"),
                )
            })?;
        let path = dest.join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    fn actions_url(&self) -> String {
        "https://github.com/acme/app/actions".to_string()
    }
}

/// Sink that journals every event and keeps the reports
#[derive(Debug, Default)]
pub struct RecordingSink {
    journal: Journal,
    pub reports: Vec<ProgressReport>,
}

impl RecordingSink {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            reports: Vec::new(),
        }
    }
}

impl ProgressSink for RecordingSink {
    fn state_changed(&mut self, state: PollState) {
        self.journal.push(Event::State(state));
    }

    fn locate_miss(&mut self, attempt: u32, _max_attempts: u32) {
        self.journal.push(Event::LocateMiss(attempt));
    }

    fn progress(&mut self, report: &ProgressReport) {
        self.journal.push(Event::Progress(report.status));
        self.reports.push(report.clone());
    }
}

fn next_or_last<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
