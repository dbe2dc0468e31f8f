//! # apkbuilder-pipeline
//!
//! The remote build pipeline:
//!
//! 1. [`Publisher`] commits the project tree and force-pushes it, which
//!    triggers CI
//! 2. [`BuildPoller`] finds the CI run for the pushed revision and waits for
//!    it to complete
//! 3. [`ArtifactRetriever`] downloads the APK of the successful run
//!
//! [`RemoteBuild`] chains steps 2 and 3. CI access goes through the
//! [`CiBackend`] port and time through [`Clock`], so the whole pipeline runs
//! against in-memory fakes in tests.
//!
//! ## Example
//!
//! ```rust,ignore
//! use apkbuilder_pipeline::prelude::*;
//!
//! let revision = publisher.publish(Some(&token), &PushMode::Force)?;
//! let outcome = RemoteBuild::new(&backend, &SystemClock, poll_config)
//!     .complete(&revision, &artifact, &out_dir, &mut sink)
//!     .await?;
//! ```

pub mod artifact;
pub mod backend;
pub mod cancel;
pub mod clock;
pub mod fakes;
pub mod poller;
pub mod publisher;
pub mod remote_build;
pub mod vcs;

pub use artifact::{ArtifactRetriever, ArtifactSpec};
pub use backend::{CiBackend, GithubBackend};
pub use cancel::{CancelToken, Canceller};
pub use clock::{Clock, ManualClock, SystemClock};
pub use poller::{BuildPoller, NullSink, PollConfig, PollOutcome, PollState, ProgressReport, ProgressSink};
pub use publisher::{PublishTarget, Publisher, Revision};
pub use remote_build::{BuildOutcome, RemoteBuild};
pub use vcs::Vcs;

/// Prelude for common imports
pub mod prelude {
    pub use crate::artifact::{ArtifactRetriever, ArtifactSpec};
    pub use crate::backend::{CiBackend, GithubBackend};
    pub use crate::cancel::{CancelToken, Canceller};
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::poller::{BuildPoller, PollConfig, PollOutcome, ProgressReport, ProgressSink};
    pub use crate::publisher::{PublishTarget, Publisher, Revision};
    pub use crate::remote_build::{BuildOutcome, RemoteBuild};
    pub use apkbuilder_core::git::PushMode;
}
