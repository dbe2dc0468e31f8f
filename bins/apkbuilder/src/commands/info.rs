//! `info`: print the configuration as JSON with the token masked

use super::load_config;
use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::config::Config;
use apkbuilder_core::credential::Credential;
use serde_json::{json, Value};

pub fn run(global: &GlobalArgs) -> anyhow::Result<()> {
    let config = load_config(global)?;
    println!("{}", serde_json::to_string_pretty(&describe(&config))?);
    Ok(())
}

fn describe(config: &Config) -> Value {
    let project = &config.schema.project;
    let token = project
        .token
        .as_deref()
        .and_then(|stored| match Credential::from_obscured(stored) {
            Ok(credential) => credential.map(|c| c.masked()),
            Err(e) => {
                tracing::warn!(error = %e, "Stored token cannot be decoded");
                Some("<invalid>".to_string())
            }
        });

    json!({
        "app_name": project.app_name,
        "package": project.package,
        "repo": project.repo,
        "token": token,
        "created": project.created,
        "project_dir": config.project_dir(),
        "output_dir": config.output_dir(),
        "branch": config.schema.build.branch,
        "config_path": config.path,
    })
}
