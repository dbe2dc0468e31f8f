//! Bearer credential handling
//!
//! The token lives only in memory for one invocation. On disk it is stored
//! base64-obscured, which hides it from a casual glance and nothing more.

use crate::error::{Error, ErrorCode, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Environment variables consulted, in order, before the config file
pub const TOKEN_ENV_VARS: &[&str] = &["APKBUILDER_TOKEN", "GITHUB_TOKEN"];

/// An opaque bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, rejecting empty or whitespace-only values
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Decode a base64-obscured token from the config file
    pub fn from_obscured(encoded: &str) -> Result<Option<Self>> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            Error::new(ErrorCode::InvalidConfigValue, "Stored token is not valid base64")
                .with_source(e)
        })?;
        let token = String::from_utf8(bytes).map_err(|e| {
            Error::new(ErrorCode::InvalidConfigValue, "Stored token is not valid UTF-8")
                .with_source(e)
        })?;
        Ok(Self::new(token))
    }

    /// Base64 form for the config file
    pub fn obscure(&self) -> String {
        STANDARD.encode(self.0.as_bytes())
    }

    /// The raw token, for headers and URLs only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `abcd…wxyz`-style hint for display
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            "********".to_string()
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}…{tail}")
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Resolve the credential from the process environment, then `stored`
pub fn resolve(stored: Option<&str>) -> Result<Option<Credential>> {
    resolve_with(|key| std::env::var(key).ok(), stored)
}

/// Resolve with an injectable environment lookup
pub fn resolve_with<F>(lookup: F, stored: Option<&str>) -> Result<Option<Credential>>
where
    F: Fn(&str) -> Option<String>,
{
    for key in TOKEN_ENV_VARS {
        if let Some(credential) = lookup(key).and_then(Credential::new) {
            return Ok(Some(credential));
        }
    }

    match stored {
        Some(encoded) if !encoded.trim().is_empty() => Credential::from_obscured(encoded),
        _ => Ok(None),
    }
}
