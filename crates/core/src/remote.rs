//! Remote repository addressing

use crate::credential::Credential;
use crate::error::{Error, ErrorCode, Result};
use std::fmt;

/// `host/owner/name` parsed from an https repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse `https://<host>/<owner>/<repo>[.git][/]`
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = || {
            Error::new(
                ErrorCode::InvalidConfigValue,
                format!("Unsupported repository URL: {url}"),
            )
            .with_suggestion("Use the form https://github.com/<owner>/<repo>.git")
        };

        let rest = url.trim().strip_prefix("https://").ok_or_else(invalid)?;
        // Drop any userinfo a user may have pasted in.
        let rest = rest.rsplit_once('@').map_or(rest, |(_, r)| r);
        let rest = rest.trim_end_matches('/');
        let rest = rest.strip_suffix(".git").unwrap_or(rest);

        let mut parts = rest.split('/');
        let (Some(host), Some(owner), Some(name), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if host.is_empty() || owner.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Plain clone URL
    pub fn clone_url(&self) -> String {
        format!("https://{}/{}/{}.git", self.host, self.owner, self.name)
    }

    /// Web page listing the repository's CI runs
    pub fn actions_url(&self) -> String {
        format!("https://{}/{}/{}/actions", self.host, self.owner, self.name)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.name)
    }
}

/// Embed the credential into an https remote URL
///
/// Any other remote (a local path, `file://`, ssh) is returned unchanged.
pub fn authenticated_url(url: &str, credential: &Credential) -> String {
    match url.strip_prefix("https://") {
        Some(rest) => {
            let rest = rest.rsplit_once('@').map_or(rest, |(_, r)| r);
            format!("https://{}@{}", credential.expose(), rest)
        }
        None => url.to_string(),
    }
}
