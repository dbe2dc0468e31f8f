//! `assemble`: local Gradle build

use super::load_config;
use apkbuilder_android::{gradle, BuildType};
use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;

pub fn run(global: &GlobalArgs, build_type: BuildType) -> anyhow::Result<()> {
    let config = load_config(global)?;
    Status::info(&format!("Running {}", build_type.assemble_task()));

    let apk = gradle::assemble(&config.project_dir(), build_type)?;
    Status::success(&format!("Built {}", apk.display()));
    Ok(())
}
