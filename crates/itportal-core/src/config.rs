// ── Runtime portal configuration ──
//
// These types describe how to reach the portal and how to build snapshots.
// They carry the credential but never touch disk; `itportal-config` builds
// a `PortalConfig` and hands it in.

use std::time::Duration;

use itportal_api::{ItPortalClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Snapshot sizing and scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Maximum records fetched per collection.
    pub limit_per_entity: usize,
    /// Background refresh period. `Duration::ZERO` disables the loop.
    pub refresh_interval: Duration,
    /// Deadline for one whole build.
    pub build_timeout: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            limit_per_entity: 1000,
            refresh_interval: Duration::from_secs(30 * 60),
            build_timeout: Duration::from_secs(5 * 60),
        }
    }
}

/// Everything needed to talk to one ITPortal instance.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Portal URL (e.g., `https://portal.example.com`).
    pub base_url: Url,
    pub api_key: SecretString,
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    pub snapshot: SnapshotConfig,
}

impl PortalConfig {
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            base_url,
            api_key,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            snapshot: SnapshotConfig::default(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    /// Build an authenticated client for this portal.
    pub fn build_client(&self) -> Result<ItPortalClient, CoreError> {
        ItPortalClient::new(self.base_url.as_str(), &self.api_key, &self.transport())
            .map_err(CoreError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PortalConfig::new(
            "https://portal.example.com".parse().unwrap(),
            SecretString::from("key".to_string()),
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.snapshot.limit_per_entity, 1000);
        assert_eq!(config.snapshot.refresh_interval, Duration::from_secs(1800));
        assert_eq!(config.snapshot.build_timeout, Duration::from_secs(300));
        assert!(config.build_client().is_ok());
    }
}
