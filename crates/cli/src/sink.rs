//! Poller progress on the terminal
//!
//! On a TTY a spinner shows the latest status; otherwise each report is
//! printed as its own line so logs stay readable.

use crate::output::{format_eta, Status};
use crate::progress::{finish_error, finish_success, spinner};
use apkbuilder_pipeline::{PollState, ProgressReport, ProgressSink};
use indicatif::ProgressBar;

/// [`ProgressSink`] that renders to stderr
pub struct TerminalSink {
    bar: Option<ProgressBar>,
}

impl TerminalSink {
    /// Spinner on a terminal, plain lines otherwise
    pub fn new() -> Self {
        let bar = console::Term::stderr()
            .is_term()
            .then(|| spinner("Waiting for the CI run to appear"));
        Self { bar }
    }

    /// Plain lines regardless of the terminal
    pub fn plain() -> Self {
        Self { bar: None }
    }

    /// Stop the spinner with a final message
    pub fn finish(&mut self, success: bool, message: &str) {
        if let Some(bar) = self.bar.take() {
            if success {
                finish_success(&bar, message);
            } else {
                finish_error(&bar, message);
            }
        }
    }

    fn show(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.set_message(message.to_string()),
            None => Status::info(message),
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for TerminalSink {
    fn state_changed(&mut self, state: PollState) {
        match state {
            PollState::LocatingRun => self.show("Waiting for the CI run to appear"),
            PollState::Monitoring { run_id } => self.show(&format!("Found CI run {run_id}")),
            PollState::Terminal => {}
        }
    }

    fn locate_miss(&mut self, attempt: u32, max_attempts: u32) {
        if self.bar.is_some() {
            self.show(&format!(
                "Waiting for the CI run to appear (check {attempt}/{max_attempts})"
            ));
        }
    }

    fn progress(&mut self, report: &ProgressReport) {
        self.show(&format!(
            "Build {}: {}",
            report.status,
            format_eta(report.elapsed, report.remaining())
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkbuilder_github::RunStatus;
    use std::time::Duration;

    #[test]
    fn test_plain_sink_accepts_events() {
        let mut sink = TerminalSink::plain();
        sink.state_changed(PollState::LocatingRun);
        sink.locate_miss(1, 30);
        sink.state_changed(PollState::Monitoring { run_id: 7 });
        sink.progress(&ProgressReport {
            run_id: 7,
            status: RunStatus::InProgress,
            elapsed: Duration::from_secs(20),
            estimated: Duration::from_secs(240),
            run_url: "https://github.com/acme/app/actions/runs/7".to_string(),
        });
        sink.finish(true, "done");
    }
}
