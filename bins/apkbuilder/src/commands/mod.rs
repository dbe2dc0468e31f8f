//! CLI command implementations

pub mod assemble;
pub mod build;
pub mod clean_repo;
pub mod download;
pub mod info;
pub mod init;
pub mod refresh;
pub mod remove_build;
pub mod set_name;
pub mod wait;
pub mod zip;

use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::config::{Config, CONFIG_FILE};
use apkbuilder_core::credential::{self, Credential};
use apkbuilder_core::git::GitRepo;
use apkbuilder_core::process::command_exists;
use apkbuilder_core::{Error, Result};
use apkbuilder_github::{ClientConfig, GithubClient};
use apkbuilder_pipeline::{Canceller, CancelToken, GithubBackend, PollConfig, PublishTarget, Publisher};
use tracing::debug;

/// Load the project's config; commands other than `init` need one
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let config = Config::load(global.config.as_deref())?;
    if config.path.is_none() {
        return Err(Error::config_not_found(CONFIG_FILE));
    }
    Ok(config)
}

/// Token from the environment or the config file
pub(crate) fn resolve_credential(config: &Config) -> Result<Option<Credential>> {
    credential::resolve(config.schema.project.token.as_deref())
}

/// Artifact downloads go through the GitHub CLI; check before pushing
pub(crate) fn require_gh() -> Result<()> {
    if command_exists("gh") {
        Ok(())
    } else {
        Err(Error::command_not_found("gh")
            .with_suggestion("Install the GitHub CLI from https://cli.github.com"))
    }
}

pub(crate) fn publisher(config: &Config) -> Publisher<GitRepo> {
    let project_dir = config.project_dir();
    Publisher::new(
        GitRepo::at(&project_dir),
        project_dir,
        PublishTarget {
            remote_url: config.schema.project.repo.clone(),
            branch: config.schema.build.branch.clone(),
            commit_message: config.schema.build.commit_message.clone(),
            exclude: config.publish_excludes(),
        },
    )
}

pub(crate) fn backend(config: &Config, credential: &Credential) -> Result<GithubBackend> {
    let client_config = ClientConfig::from_config(config, credential.clone())?;
    debug!(api = %client_config.api_url, repo = %client_config.repo, "GitHub client");
    Ok(GithubBackend::new(GithubClient::with_config(client_config)?))
}

pub(crate) fn poll_config(config: &Config) -> PollConfig {
    PollConfig::from_settings(
        &config.schema.poll,
        Some(config.schema.build.branch.clone()),
    )
}

/// Cancellation wired to Ctrl-C
pub(crate) fn ctrl_c_token() -> CancelToken {
    let (canceller, token) = Canceller::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl-C received");
            canceller.cancel();
        }
    });
    token
}
