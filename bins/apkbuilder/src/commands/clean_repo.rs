//! `clean-repo`: leave only the CI workflows tracked on the remote

use super::{load_config, publisher, resolve_credential};
use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;
use std::path::Path;

const KEEP: &str = ".github/workflows";

pub fn run(global: &GlobalArgs) -> anyhow::Result<()> {
    let config = load_config(global)?;
    let credential = resolve_credential(&config)?;

    let revision = publisher(&config).clean(credential.as_ref(), Path::new(KEEP))?;
    Status::success(&format!(
        "Pushed {} with only {} tracked",
        revision.short(),
        KEEP
    ));
    Ok(())
}
