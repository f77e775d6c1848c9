use thiserror::Error;

/// Top-level error type for the `itportal-api` crate.
///
/// Every remote operation surfaces exactly one of these to its caller.
/// Nothing here is retried; `itportal-core` decides what a failure means
/// for the snapshot it is building.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API key was rejected (HTTP 401/403) or is not a valid header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error on {method} {path}: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be constructed (bad MIME type, unserializable body).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Remote service ──────────────────────────────────────────────
    /// Non-2xx response from the ITPortal API.
    #[error("ITPortal API {method} {path} -> {status}: {message}")]
    Remote {
        method: String,
        path: String,
        status: u16,
        message: String,
    },

    /// A single-item fetch returned an empty result set.
    #[error("No entity found at {path}")]
    NotFound { path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error for {path}: {message}")]
    Deserialization {
        path: String,
        message: String,
        body: String,
    },
}

impl Error {
    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for a 404 from the service or an empty single-item fetch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. }) || self.status() == Some(404)
    }

    /// Returns `true` if the failure is likely transient.
    ///
    /// Informational only: the client itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Request path the error relates to, when known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Transport { path, .. }
            | Self::Remote { path, .. }
            | Self::NotFound { path }
            | Self::Deserialization { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_exposes_status_and_path() {
        let err = Error::Remote {
            method: "GET".into(),
            path: "/api/2.0/sites/".into(),
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.path(), Some("/api/2.0/sites/"));
        assert!(err.is_transient());
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "ITPortal API GET /api/2.0/sites/ -> 503: maintenance"
        );
    }

    #[test]
    fn not_found_covers_empty_fetch_and_404() {
        let empty = Error::NotFound {
            path: "/api/2.0/devices/7/".into(),
        };
        let missing = Error::Remote {
            method: "GET".into(),
            path: "/api/2.0/devices/7/".into(),
            status: 404,
            message: "Not Found".into(),
        };
        assert!(empty.is_not_found());
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());
    }
}
