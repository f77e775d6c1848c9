//! Configuration for ITPortal tools.
//!
//! Layered loading (defaults, TOML file, `ITPORTAL_*` environment),
//! API key resolution (env var, keyring, plaintext) and translation to
//! `itportal_core::PortalConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use itportal_core::{PortalConfig, SnapshotConfig, TlsMode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const KEYRING_SERVICE: &str = "itportal";
const KEYRING_USER: &str = "api-key";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured (set api_key_env, store one in the keyring, or set api_key)")]
    NoCredentials,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Portal base URL (e.g., "https://portal.example.com").
    pub base_url: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub snapshot: SnapshotSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            api_key_env: None,
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            snapshot: SnapshotSection::default(),
        }
    }
}

/// `[snapshot]` table. Durations use humantime syntax ("30m", "90s").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SnapshotSection {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    #[serde(default = "default_limit_per_entity")]
    pub limit_per_entity: usize,

    #[serde(default = "default_build_timeout")]
    pub build_timeout: String,
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            limit_per_entity: default_limit_per_entity(),
            build_timeout: default_build_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> String {
    "30m".into()
}
fn default_limit_per_entity() -> usize {
    1000
}
fn default_build_timeout() -> String {
    "5m".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "itportal", "itportal").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("itportal");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// The layered provider stack: defaults, then `path`, then environment.
///
/// Environment keys are `ITPORTAL_` + upper-case field name; nested tables
/// are split on `__` (e.g. `ITPORTAL_SNAPSHOT__LIMIT_PER_ENTITY`).
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ITPORTAL_").split("__"))
}

/// Load the config from `path` (or the platform default) and environment.
/// A missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    debug!(path = %path.display(), "loading config");
    load_from(&figment(&path))
}

pub fn load_from(figment: &Figment) -> Result<Config, ConfigError> {
    Ok(figment.extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: `api_key_env` variable, then system keyring, then
/// plaintext `api_key`.
pub fn resolve_api_key(config: &Config) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(ref env_name) = config.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = config.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials)
}

// ── Translation ─────────────────────────────────────────────────────

fn parse_duration(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("{raw:?}: {e}"),
    })
}

impl Config {
    /// Validated snapshot settings.
    pub fn snapshot_config(&self) -> Result<SnapshotConfig, ConfigError> {
        let refresh_interval =
            parse_duration("snapshot.refresh_interval", &self.snapshot.refresh_interval)?;
        let build_timeout = parse_duration("snapshot.build_timeout", &self.snapshot.build_timeout)?;
        if build_timeout.is_zero() {
            return Err(ConfigError::Validation {
                field: "snapshot.build_timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }

        Ok(SnapshotConfig {
            limit_per_entity: self.snapshot.limit_per_entity,
            refresh_interval,
            build_timeout,
        })
    }

    /// Build a `PortalConfig` with an already-resolved key.
    pub fn to_portal_config_with_key(
        &self,
        api_key: SecretString,
    ) -> Result<PortalConfig, ConfigError> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConfigError::Validation {
                field: "base_url".into(),
                reason: "is required".into(),
            })?;
        let base_url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "base_url".into(),
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            });
        }

        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        Ok(PortalConfig {
            base_url,
            api_key,
            tls,
            timeout: Duration::from_secs(self.timeout),
            snapshot: self.snapshot_config()?,
        })
    }

    /// Resolve the API key and build a `PortalConfig`.
    pub fn to_portal_config(&self) -> Result<PortalConfig, ConfigError> {
        let api_key = resolve_api_key(self)?;
        self.to_portal_config_with_key(api_key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write as _;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn from_toml(toml: &str) -> Result<Config, ConfigError> {
        load_from(
            &Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::string(toml)),
        )
    }

    fn key() -> SecretString {
        SecretString::from("k".to_string())
    }

    #[test]
    fn defaults_apply_when_file_is_empty() {
        let config = from_toml("").unwrap();
        assert_eq!(config, Config::default());

        let snapshot = config.snapshot_config().unwrap();
        assert_eq!(snapshot.refresh_interval, Duration::from_secs(30 * 60));
        assert_eq!(snapshot.build_timeout, Duration::from_secs(5 * 60));
        assert_eq!(snapshot.limit_per_entity, 1000);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = from_toml(
            r#"
            base_url = "https://portal.example.com"
            timeout = 10
            insecure = true

            [snapshot]
            refresh_interval = "90s"
            limit_per_entity = 250
            "#,
        )
        .unwrap();

        let portal = config.to_portal_config_with_key(key()).unwrap();
        assert_eq!(portal.base_url.as_str(), "https://portal.example.com/");
        assert_eq!(portal.timeout, Duration::from_secs(10));
        assert!(matches!(portal.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(portal.snapshot.refresh_interval, Duration::from_secs(90));
        assert_eq!(portal.snapshot.limit_per_entity, 250);
        assert_eq!(portal.snapshot.build_timeout, Duration::from_secs(300));
        assert_eq!(portal.api_key.expose_secret(), "k");
    }

    #[test]
    fn config_file_is_read_from_given_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://docs.internal\"").unwrap();
        writeln!(file, "ca_cert = \"/etc/itportal/ca.pem\"").unwrap();

        let config = load_from(&figment(file.path())).unwrap();
        let portal = config.to_portal_config_with_key(key()).unwrap();
        assert_eq!(portal.base_url.host_str(), Some("docs.internal"));
        assert!(
            matches!(portal.tls, TlsMode::CustomCa(ref p) if p == Path::new("/etc/itportal/ca.pem"))
        );
    }

    #[test]
    fn missing_base_url_is_rejected() {
        let err = Config::default()
            .to_portal_config_with_key(key())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "base_url"));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let config = Config {
            base_url: Some("ftp://portal.example.com".into()),
            ..Config::default()
        };
        assert!(matches!(
            config.to_portal_config_with_key(key()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn bad_durations_are_rejected() {
        let config = Config {
            snapshot: SnapshotSection {
                refresh_interval: "soon".into(),
                ..SnapshotSection::default()
            },
            ..Config::default()
        };
        let err = config.snapshot_config().unwrap_err();
        assert!(err.to_string().contains("snapshot.refresh_interval"));

        let config = Config {
            snapshot: SnapshotSection {
                build_timeout: "0s".into(),
                ..SnapshotSection::default()
            },
            ..Config::default()
        };
        assert!(config.snapshot_config().is_err());
    }

    #[test]
    fn zero_refresh_interval_is_allowed() {
        let config = Config {
            snapshot: SnapshotSection {
                refresh_interval: "0s".into(),
                ..SnapshotSection::default()
            },
            ..Config::default()
        };
        assert!(config.snapshot_config().unwrap().refresh_interval.is_zero());
    }
}
