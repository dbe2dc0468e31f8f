//! `remove-build`: delete Gradle's local build output

use super::load_config;
use apkbuilder_android::gradle;
use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;

pub fn run(global: &GlobalArgs) -> anyhow::Result<()> {
    let config = load_config(global)?;
    if gradle::remove_build_dir(&config.project_dir())? {
        Status::success(&format!("Removed {}", gradle::BUILD_DIR));
    } else {
        Status::info(&format!("No {} to remove", gradle::BUILD_DIR));
    }
    Ok(())
}
