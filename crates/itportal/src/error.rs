//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `CoreError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use itportal_config::ConfigError;
use itportal_core::{BuildError, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the portal: {reason}")]
    #[diagnostic(
        code(itportal::connection_failed),
        help(
            "Check that base_url is correct and the portal is reachable.\n\
             Self-signed certificate? Try --insecure or set ca_cert."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(itportal::auth_failed),
        help("Verify the API key. It is sent verbatim in the Authorization header.")
    )]
    AuthFailed { message: String },

    #[error("No API key configured")]
    #[diagnostic(
        code(itportal::no_credentials),
        help(
            "Set api_key_env to the name of a variable holding the key,\n\
             store it in the system keyring (service \"itportal\", user \"api-key\"),\n\
             or set api_key in {path}"
        )
    )]
    NoCredentials { path: String },

    // ── Snapshot ─────────────────────────────────────────────────────
    #[error("Snapshot build failed while fetching {kind}: {message}")]
    #[diagnostic(code(itportal::fetch_failed))]
    FetchFailed { kind: String, message: String },

    #[error("Snapshot build timed out after {seconds}s")]
    #[diagnostic(
        code(itportal::timeout),
        help("Raise snapshot.build_timeout or lower snapshot.limit_per_entity.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {path}")]
    #[diagnostic(code(itportal::not_found))]
    NotFound { path: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(itportal::api_error))]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(itportal::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(itportal::config),
        help("Config file: {path}")
    )]
    Config { message: String, path: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(itportal::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Config { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the config path to configuration errors.
    pub fn from_config(err: ConfigError, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials => Self::NoCredentials { path },
            ConfigError::Figment(e) => Self::Config {
                message: e.to_string(),
                path,
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<BuildError> for CliError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Fetch { kind, source } => {
                // Credential and reachability problems surface the same way
                // whichever collection hit them first.
                match CoreError::from(source) {
                    core @ (CoreError::AuthenticationFailed { .. }
                    | CoreError::ConnectionFailed { .. }) => core.into(),
                    other => CliError::FetchFailed {
                        kind: kind.to_string(),
                        message: other.to_string(),
                    },
                }
            }
            BuildError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            BuildError::TaskFailed { message } => CliError::Api { message },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InitialBuild(e) | CoreError::Build(e) => e.into(),
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::NotFound { path } => CliError::NotFound { path },
            CoreError::Api { message, .. } => CliError::Api { message },
            CoreError::Config { message } => CliError::Validation {
                field: "portal".into(),
                reason: message,
            },
        }
    }
}
