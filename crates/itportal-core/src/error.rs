// ── Core error types ──
//
// A snapshot build either produces a complete aggregate or one `BuildError`.
// `CoreError` is what consumers of the cache see; the `From<itportal_api::Error>`
// impl translates transport-layer failures for ad-hoc client use.

use itportal_api::EntityKind;
use thiserror::Error;

/// Why a snapshot build produced no aggregate.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The first collection fetch that failed; every other fetch was aborted.
    #[error("fetching {kind} failed: {source}")]
    Fetch {
        kind: EntityKind,
        #[source]
        source: itportal_api::Error,
    },

    #[error("snapshot build timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// A fetch task panicked or was cancelled by the runtime.
    #[error("snapshot fetch task failed: {message}")]
    TaskFailed { message: String },
}

impl BuildError {
    /// Collection whose fetch failed, when the failure was a fetch.
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Self::Fetch { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Snapshot errors ──────────────────────────────────────────────
    /// The synchronous first build failed, so there is nothing to serve.
    #[error("initial snapshot build failed: {0}")]
    InitialBuild(#[source] BuildError),

    #[error("snapshot refresh failed: {0}")]
    Build(#[source] BuildError),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach ITPortal: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Entity not found: {path}")]
    NotFound { path: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<itportal_api::Error> for CoreError {
    fn from(err: itportal_api::Error) -> Self {
        if err.is_not_found() {
            return CoreError::NotFound {
                path: err.path().unwrap_or_default().to_owned(),
            };
        }

        match err {
            itportal_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            itportal_api::Error::Transport {
                method,
                path,
                source,
            } => CoreError::ConnectionFailed {
                reason: format!("{method} {path}: {source}"),
            },
            itportal_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            itportal_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            other => CoreError::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
