//! GitHub Actions client for apkbuilder
//!
//! Covers exactly what the remote build pipeline needs:
//!
//! - **Runs**: list recent runs, list successful runs, get one run
//! - **Artifacts**: list a run's artifacts, download one through `gh`
//! - **Retry with exponential backoff** for transient HTTP failures
//!
//! # Example
//!
//! ```rust,no_run
//! use apkbuilder_core::{credential::Credential, remote::RepoSlug};
//! use apkbuilder_github::{ClientConfig, GithubClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepoSlug::parse("https://github.com/acme/app.git")?;
//!     let token = Credential::new("ghp_example").ok_or("empty token")?;
//!     let client = GithubClient::with_config(ClientConfig::new(repo, token))?;
//!
//!     for run in client.runs().list(5, Some("main")).await? {
//!         println!("{} {} {:?}", run.id, run.status, run.conclusion);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gh;
pub mod models;

pub use client::GithubClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use models::{Artifact, RunConclusion, RunStatus, WorkflowRun};
