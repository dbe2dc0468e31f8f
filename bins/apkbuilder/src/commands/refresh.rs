//! `refresh`: fast-forward the project from the CI branch

use super::{load_config, publisher, resolve_credential};
use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;

pub fn run(global: &GlobalArgs) -> anyhow::Result<()> {
    let config = load_config(global)?;
    let credential = resolve_credential(&config)?;

    let revision = publisher(&config).refresh(credential.as_ref())?;
    Status::success(&format!(
        "Up to date with {} at {}",
        config.schema.build.branch,
        revision.short()
    ));
    Ok(())
}
