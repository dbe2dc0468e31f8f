//! `wait`: re-attach to the CI run of the current HEAD

use super::build::await_build;
use super::{load_config, publisher, require_gh, resolve_credential};
use apkbuilder_android::BuildType;
use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::git::is_git_repo;
use apkbuilder_core::Error;

pub async fn run(global: &GlobalArgs, build_type: BuildType) -> anyhow::Result<()> {
    let config = load_config(global)?;
    config.repo_slug()?;
    let credential = resolve_credential(&config)?.ok_or_else(Error::missing_credential)?;

    require_gh()?;

    if !is_git_repo(&config.project_dir()) {
        return Err(Error::not_a_git_repo().into());
    }
    let revision = publisher(&config).current_revision()?;
    Status::info(&format!("Waiting for the build of {}", revision.short()));

    await_build(&config, &credential, &revision, build_type).await?;
    Ok(())
}
