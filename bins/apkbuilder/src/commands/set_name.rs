//! `set-name`: rename the application

use super::load_config;
use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::{Error, ErrorCode};

pub fn run(global: &GlobalArgs, name: &str) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::new(ErrorCode::InvalidConfigValue, "App name cannot be empty").into());
    }

    let mut config = load_config(global)?;
    let previous = std::mem::replace(&mut config.schema.project.app_name, name.to_string());
    config.save()?;

    Status::success(&format!("Renamed {previous} to {name}"));
    Ok(())
}
