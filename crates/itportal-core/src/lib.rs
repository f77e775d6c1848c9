// itportal-core: Snapshot cache between itportal-api and consumers (CLI/servers).

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod render;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use builder::SnapshotBuilder;
pub use cache::SnapshotCache;
pub use config::{PortalConfig, SnapshotConfig};
pub use error::{BuildError, CoreError};
pub use snapshot::{Collections, Snapshot};

// Re-export the client surface so consumers need only this crate.
pub use itportal_api::{
    EntityKind, Error as ApiError, ItPortalClient, ListFilters, TlsMode, TypeCategory,
    UploadTarget,
};
