//! Configuration file loading and saving

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use crate::remote::RepoSlug;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name
pub const CONFIG_FILE: &str = "apkbuilder.toml";

/// Environment override for the GitHub API root
pub const API_URL_ENV: &str = "APKBUILDER_API_URL";

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist; discovery falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let mut schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                schema.github.api_url = url;
            }
        }

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Configuration that will be written to `path`
    pub fn new(schema: ConfigSchema, path: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            path: Some(path.into()),
        }
    }

    /// Write the configuration back to its file
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new(CONFIG_FILE));
        let content = toml::to_string_pretty(&self.schema)?;
        std::fs::write(path, content).map_err(|e| {
            Error::new(
                ErrorCode::ConfigError,
                format!("Failed to write config file {}: {}", path.display(), e),
            )
        })?;
        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Directory paths in the file are relative to this
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    /// Resolved Android project directory
    pub fn project_dir(&self) -> PathBuf {
        self.base_dir().join(&self.schema.project.dir)
    }

    /// Resolved artifact output directory
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir().join(&self.schema.build.output_dir)
    }

    /// Paths inside the project directory that must never be pushed
    ///
    /// The config file carries the token and the output directory holds
    /// downloaded APKs. Both are relative to [`Config::project_dir`]; paths
    /// outside the project are omitted.
    pub fn publish_excludes(&self) -> Vec<PathBuf> {
        let project = self.project_dir();
        let config_file = self
            .path
            .clone()
            .unwrap_or_else(|| self.base_dir().join(CONFIG_FILE));

        [config_file, self.output_dir()]
            .iter()
            .filter_map(|p| p.strip_prefix(&project).ok())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .collect()
    }

    /// Parsed repository, failing if the project was never initialised
    pub fn repo_slug(&self) -> Result<RepoSlug> {
        if self.schema.project.repo.is_empty() {
            return Err(Error::new(
                ErrorCode::InvalidConfigValue,
                "No repository configured",
            )
            .with_suggestion("Run `apkbuilder init --repo https://github.com/<owner>/<repo>`"));
        }
        RepoSlug::parse(&self.schema.project.repo)
    }
}

/// Find configuration file in standard locations under `root`
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [CONFIG_FILE, ".config/apkbuilder.toml"];

    candidates
        .iter()
        .map(|c| root.join(c))
        .find(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {}", path.display(), e),
        )
    })
}
