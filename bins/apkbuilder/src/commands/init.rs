//! `init`: write apkbuilder.toml

use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::config::{Config, ConfigSchema, CONFIG_FILE};
use apkbuilder_core::credential::Credential;
use apkbuilder_core::remote::RepoSlug;
use apkbuilder_core::{Error, ErrorCode, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Application display name
    #[arg(long)]
    pub app_name: String,

    /// Java package name, e.g. com.example.app
    #[arg(long)]
    pub package: String,

    /// GitHub repository URL
    #[arg(long)]
    pub repo: String,

    /// GitHub token to store (base64-obscured, not encrypted)
    #[arg(long)]
    pub token: Option<String>,

    /// Android project directory, relative to the config file
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

pub fn run(global: &GlobalArgs, args: &InitArgs) -> anyhow::Result<()> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    if path.exists() && !args.force {
        return Err(Error::new(
            ErrorCode::InvalidConfigValue,
            format!("{} already exists", path.display()),
        )
        .with_suggestion("Pass --force to overwrite it")
        .into());
    }

    let config = Config::new(schema_for(args, &chrono::Utc::now().to_rfc3339())?, path.clone());
    config.save()?;

    Status::success(&format!(
        "Wrote {} for {} ({})",
        path.display(),
        config.schema.project.app_name,
        config.schema.project.package
    ));
    if config.schema.project.token.is_none() {
        Status::info("No token stored; set APKBUILDER_TOKEN or GITHUB_TOKEN before building");
    }
    Ok(())
}

fn schema_for(args: &InitArgs, created: &str) -> Result<ConfigSchema> {
    validate_package(&args.package)?;
    let slug = RepoSlug::parse(&args.repo)?;

    let mut schema = ConfigSchema::default();
    schema.project.app_name = args.app_name.trim().to_string();
    schema.project.package = args.package.clone();
    schema.project.repo = slug.clone_url();
    schema.project.token = args
        .token
        .as_deref()
        .and_then(Credential::new)
        .map(|c| c.obscure());
    schema.project.created = Some(created.to_string());
    schema.project.dir = args.dir.clone();
    Ok(schema)
}

/// Dotted Java identifiers with at least two segments
fn validate_package(package: &str) -> Result<()> {
    let segments: Vec<&str> = package.split('.').collect();
    let valid = segments.len() >= 2
        && segments.iter().all(|s| {
            let mut chars = s.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(Error::new(
            ErrorCode::InvalidConfigValue,
            format!("Invalid package name: {package}"),
        )
        .with_suggestion("Use a dotted name such as com.example.app"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> InitArgs {
        InitArgs {
            app_name: " Demo ".to_string(),
            package: "com.example.demo".to_string(),
            repo: "https://github.com/acme/demo".to_string(),
            token: Some("tok123".to_string()),
            dir: PathBuf::from("."),
            force: false,
        }
    }

    #[test]
    fn test_schema_for() {
        let schema = schema_for(&args(), "2026-01-01T00:00:00+00:00").unwrap();
        assert_eq!(schema.project.app_name, "Demo");
        assert_eq!(schema.project.repo, "https://github.com/acme/demo.git");
        assert_eq!(schema.project.token.as_deref(), Some("dG9rMTIz"));
        assert_eq!(schema.project.created.as_deref(), Some("2026-01-01T00:00:00+00:00"));
    }

    #[test]
    fn test_blank_token_is_not_stored() {
        let mut args = args();
        args.token = Some("  ".to_string());
        let schema = schema_for(&args, "now").unwrap();
        assert!(schema.project.token.is_none());
    }

    #[test]
    fn test_validate_package() {
        assert!(validate_package("com.example.app").is_ok());
        assert!(validate_package("com.example.my_app2").is_ok());
        assert!(validate_package("app").is_err());
        assert!(validate_package("com.1example").is_err());
        assert!(validate_package("com..app").is_err());
    }
}
