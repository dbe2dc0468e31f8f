//! Configuration schema definitions
//!
//! Mirrors `apkbuilder.toml`. Every section has defaults so a file holding
//! only `[project]` is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub poll: PollSettings,

    #[serde(default)]
    pub github: GithubSettings,
}

/// Project identity and remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Application display name
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Java package, e.g. `com.example.app`
    #[serde(default)]
    pub package: String,

    /// Repository URL, e.g. `https://github.com/owner/repo.git`
    #[serde(default)]
    pub repo: String,

    /// Base64-obscured token. Obscured, not encrypted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// When the project was initialised (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Directory holding the Android project, relative to the config file
    #[serde(default = "default_project_dir")]
    pub dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            package: String::new(),
            repo: String::new(),
            token: None,
            created: None,
            dir: default_project_dir(),
        }
    }
}

fn default_app_name() -> String {
    "MyApp".to_string()
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Publish and artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Where downloaded artifacts land
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Artifact name override; defaults to `app-<type>.apk`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_name: Option<String>,

    /// Branch whose pushes trigger CI
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Commit message for automatic build commits
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            artifact_name: None,
            branch: default_branch(),
            commit_message: default_commit_message(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_commit_message() -> String {
    "Auto build commit from apkbuilder".to_string()
}

/// Remote build polling settings, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    /// Delay between status polls of a located run
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Delay between run listings while locating the run
    #[serde(default = "default_locate_interval_secs")]
    pub locate_interval_secs: u64,

    /// Listings to try before giving up on locating the run
    #[serde(default = "default_max_locate_attempts")]
    pub max_locate_attempts: u32,

    /// Overall bound on the wait, from the first listing
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Best-effort guess of a build's duration, shown as ETA
    #[serde(default = "default_estimated_secs")]
    pub estimated_secs: u64,

    /// How many recent runs each listing inspects
    #[serde(default = "default_run_window")]
    pub run_window: u32,

    /// How many recent successful runs artifact retrieval inspects
    #[serde(default = "default_success_window")]
    pub success_window: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            locate_interval_secs: default_locate_interval_secs(),
            max_locate_attempts: default_max_locate_attempts(),
            timeout_secs: default_timeout_secs(),
            estimated_secs: default_estimated_secs(),
            run_window: default_run_window(),
            success_window: default_success_window(),
        }
    }
}

impl PollSettings {
    /// Status poll interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Run listing interval
    pub fn locate_interval(&self) -> Duration {
        Duration::from_secs(self.locate_interval_secs)
    }

    /// Overall deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Estimated build duration
    pub fn estimated(&self) -> Duration {
        Duration::from_secs(self.estimated_secs)
    }
}

fn default_interval_secs() -> u64 {
    20
}

fn default_locate_interval_secs() -> u64 {
    10
}

fn default_max_locate_attempts() -> u32 {
    30
}

fn default_timeout_secs() -> u64 {
    1800
}

fn default_estimated_secs() -> u64 {
    240
}

fn default_run_window() -> u32 {
    10
}

fn default_success_window() -> u32 {
    5
}

/// GitHub API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubSettings {
    /// REST API root
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}
