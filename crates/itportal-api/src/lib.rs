// itportal-api: Async Rust client for the ITPortal REST API v2.0

pub mod client;
pub mod devices;
pub mod error;
pub mod filters;
pub mod kind;
pub mod models;
pub mod objects;
pub mod transport;

pub use client::{ItPortalClient, PAGE_SIZE};
pub use error::Error;
pub use filters::ListFilters;
pub use kind::{API_PREFIX, Entity, EntityKind, TypeCategory, UploadTarget};
pub use models::Page;
pub use transport::{TlsMode, TransportConfig};
