//! Structured errors with codes, kinds, and recovery suggestions
//!
//! Every failure in the build pipeline is reported through [`Error`]:
//! - an [`ErrorCode`] for precise programmatic handling
//! - a coarse [`ErrorKind`] callers branch on (precondition, transport, ...)
//! - optional context, suggestion, and manual-inspection link

use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,
    Cancelled = 1002,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    DirectoryNotFound = 2004,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    InvalidConfigValue = 3004,
    MissingCredential = 3005,

    // Git errors (4xxx)
    GitError = 4000,
    NotAGitRepo = 4001,
    GitCommandFailed = 4002,
    PushRejected = 4003,
    LeaseRejected = 4004,

    // Process errors (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,
    CommandFailed = 5002,

    // Remote CI errors (6xxx)
    ApiError = 6000,
    ApiUnauthorized = 6001,
    RunNotFound = 6002,
    PollTimeout = 6003,
    RunFailed = 6004,
    ArtifactNotFound = 6005,
    ArtifactDownloadFailed = 6006,

    // Platform-specific errors (8xxx)
    GradleError = 8002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            4 => "Git",
            5 => "Process",
            6 => "Remote CI",
            8 => "Platform",
            _ => "Unknown",
        }
    }

    /// Map the code onto the closed set of failure causes
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential
            | Self::ConfigError
            | Self::ConfigNotFound
            | Self::ConfigParseError
            | Self::InvalidConfigValue
            | Self::DirectoryNotFound
            | Self::NotAGitRepo
            | Self::CommandNotFound => ErrorKind::Precondition,
            Self::PushRejected
            | Self::ApiError
            | Self::ApiUnauthorized
            | Self::RunNotFound
            | Self::ArtifactDownloadFailed => ErrorKind::Transport,
            Self::PollTimeout => ErrorKind::Timeout,
            Self::RunFailed | Self::ArtifactNotFound => ErrorKind::RemoteFailure,
            Self::LeaseRejected => ErrorKind::Conflict,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Unknown
            | Self::Internal
            | Self::IoError
            | Self::FileNotFound
            | Self::PermissionDenied
            | Self::GitError
            | Self::GitCommandFailed
            | Self::ProcessError
            | Self::CommandFailed
            | Self::GradleError => ErrorKind::Local,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Why an operation failed, independent of the exact code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing credential, project directory, or tool; nothing was attempted
    Precondition,
    /// Contacting the git remote or the CI API failed
    Transport,
    /// A bounded wait ran out
    Timeout,
    /// The remote run finished without a usable result
    RemoteFailure,
    /// The remote branch moved under a lease-protected push
    Conflict,
    /// The caller asked the operation to stop
    Cancelled,
    /// Local filesystem or process failure
    Local,
}

impl ErrorKind {
    /// Process exit code for this kind of failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Precondition => exit_codes::PRECONDITION,
            Self::Transport => exit_codes::TRANSPORT,
            Self::Timeout => exit_codes::TIMEOUT,
            Self::RemoteFailure => exit_codes::REMOTE_FAILURE,
            Self::Conflict => exit_codes::CONFLICT,
            Self::Cancelled => exit_codes::CANCELLED,
            Self::Local => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Precondition => "precondition",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::RemoteFailure => "remote failure",
            Self::Conflict => "conflict",
            Self::Cancelled => "cancelled",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Where the user can inspect the failure by hand
    pub link: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        if let Some(link) = &self.link {
            write!(f, "\n  Inspect: {}", link)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            link: None,
            source: None,
        }
    }

    /// Failure cause callers can branch on
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a link for manual inspection
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Run `apkbuilder init` first or pass --config")
    }

    pub fn missing_credential() -> Self {
        Self::new(ErrorCode::MissingCredential, "No GitHub token available")
            .with_suggestion(
                "Set APKBUILDER_TOKEN or GITHUB_TOKEN, or store a token with `apkbuilder init --token`",
            )
    }

    pub fn directory_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::DirectoryNotFound,
            format!("Project directory not found: {}", path.as_ref().display()),
        )
    }

    pub fn git(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GitError, message)
    }

    pub fn not_a_git_repo() -> Self {
        Self::new(ErrorCode::NotAGitRepo, "Not a git repository")
            .with_suggestion("Run `apkbuilder build` once to initialise the project repository")
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(
            ErrorCode::CommandNotFound,
            format!("Command not found: {}", cmd),
        )
        .with_suggestion(format!("Install {} and ensure it's in your PATH", cmd))
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Cancelled, "Operation cancelled")
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PollTimeout, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiError, message)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const PRECONDITION: i32 = 3;
    pub const TRANSPORT: i32 = 4;
    pub const REMOTE_FAILURE: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const TIMEOUT: i32 = 124;
    pub const CANCELLED: i32 = 130;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("JSON error: {}", err))
            .with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::new(ErrorCode::ConfigError, format!("TOML write error: {}", err))
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::MissingCredential.to_string(), "E3005");
        assert_eq!(ErrorCode::PollTimeout.to_string(), "E6003");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::PushRejected.category(), "Git");
        assert_eq!(ErrorCode::RunFailed.category(), "Remote CI");
    }

    #[test]
    fn test_kinds_cover_the_pipeline_taxonomy() {
        assert_eq!(Error::missing_credential().kind(), ErrorKind::Precondition);
        assert_eq!(Error::directory_not_found("/nope").kind(), ErrorKind::Precondition);
        assert_eq!(Error::api("boom").kind(), ErrorKind::Transport);
        assert_eq!(Error::timeout("waited").kind(), ErrorKind::Timeout);
        assert_eq!(
            Error::new(ErrorCode::RunFailed, "failed").kind(),
            ErrorKind::RemoteFailure
        );
        assert_eq!(
            Error::new(ErrorCode::LeaseRejected, "moved").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(Error::cancelled().kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let kinds = [
            ErrorKind::Precondition,
            ErrorKind::Transport,
            ErrorKind::Timeout,
            ErrorKind::RemoteFailure,
            ErrorKind::Conflict,
            ErrorKind::Cancelled,
            ErrorKind::Local,
        ];
        let mut codes: Vec<i32> = kinds.iter().map(ErrorKind::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&exit_codes::SUCCESS));
    }

    #[test]
    fn test_display_includes_link() {
        let err = Error::api("status poll failed")
            .with_link("https://github.com/acme/app/actions");
        let text = err.to_string();
        assert!(text.starts_with("[E6000]"));
        assert!(text.contains("Inspect: https://github.com/acme/app/actions"));
    }
}
