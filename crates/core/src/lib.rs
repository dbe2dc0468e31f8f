//! Core utilities for apkbuilder
//!
//! This crate provides the pieces every other apkbuilder crate leans on:
//!
//! - **Error handling**: coded errors with a closed set of failure kinds
//! - **Git operations**: init, stage, commit, and push using command-line git
//! - **Process execution**: captured and streamed command execution
//! - **Configuration**: `apkbuilder.toml` loading and saving
//! - **Credentials**: token resolution from the environment or config
//!
//! # Example
//!
//! ```rust,no_run
//! use apkbuilder_core::{config::Config, credential, git::GitRepo};
//!
//! let config = Config::load(None)?;
//! let token = credential::resolve(config.schema.project.token.as_deref())?;
//! let repo = GitRepo::init(&config.project_dir())?;
//! println!("HEAD is {}", repo.head_revision()?);
//! # Ok::<(), apkbuilder_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod credential;
pub mod error;
pub mod git;
pub mod process;
pub mod remote;
pub mod retry;

pub use error::{Error, ErrorCode, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::credential::Credential;
    pub use crate::error::{exit_codes, Error, ErrorCode, ErrorKind, Result};
    pub use crate::git::{GitRepo, PushMode};
    pub use crate::remote::RepoSlug;
    pub use crate::retry::RetryConfig;
}
