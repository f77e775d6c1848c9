// ── Entity kind descriptors ──
//
// Every top-level ITPortal collection is named by an `EntityKind`; the
// `Entity` trait ties a model type to its kind so the pagination routine
// can be written once.

use serde::de::DeserializeOwned;

/// Path prefix shared by every v2.0 endpoint.
pub const API_PREFIX: &str = "/api/2.0";

/// A top-level ITPortal collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Companies,
    Sites,
    Devices,
    Kbs,
    Contacts,
    Agreements,
    IpNetworks,
    Documents,
    Accounts,
    Facilities,
    Cabinets,
    Configurations,
    AdditionalCredentials,
    FormInstances,
}

impl EntityKind {
    /// Kinds that make up an aggregate snapshot, in rendering order.
    pub const SNAPSHOT: [Self; 12] = [
        Self::Companies,
        Self::Sites,
        Self::Devices,
        Self::Kbs,
        Self::Contacts,
        Self::Agreements,
        Self::IpNetworks,
        Self::Documents,
        Self::Accounts,
        Self::Facilities,
        Self::Cabinets,
        Self::Configurations,
    ];

    /// URL segment of the collection.
    pub fn segment(self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Sites => "sites",
            Self::Devices => "devices",
            Self::Kbs => "kbs",
            Self::Contacts => "contacts",
            Self::Agreements => "agreements",
            Self::IpNetworks => "ipnetworks",
            Self::Documents => "documents",
            Self::Accounts => "accounts",
            Self::Facilities => "facilities",
            Self::Cabinets => "cabinets",
            Self::Configurations => "configurations",
            Self::AdditionalCredentials => "additionalCredentials",
            Self::FormInstances => "forminstances",
        }
    }

    /// Collection path, e.g. `/api/2.0/devices/`.
    pub fn collection_path(self) -> String {
        format!("{API_PREFIX}/{}/", self.segment())
    }

    /// Single-item path, e.g. `/api/2.0/devices/42/`.
    pub fn item_path(self, id: i64) -> String {
        format!("{API_PREFIX}/{}/{id}/", self.segment())
    }
}

/// A model type decoded from one top-level collection.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;
}

/// Categories served under `/api/2.0/types/<category>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TypeCategory {
    Device,
    Company,
    Account,
    Contact,
    Document,
    Agreement,
    Facility,
}

impl TypeCategory {
    pub fn path(self) -> String {
        format!("{API_PREFIX}/types/{self}/")
    }
}

/// Endpoints that accept a multipart file upload for a given record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum UploadTarget {
    DeviceConfig,
    Kb,
    ContactPhoto,
    DocumentFile,
    AgreementFile,
}

impl UploadTarget {
    /// Upload path for the record with the given ID.
    pub fn path(self, id: i64) -> String {
        match self {
            Self::DeviceConfig => format!("{API_PREFIX}/devices/{id}/configurationFiles/"),
            Self::Kb => format!("{API_PREFIX}/kbs/{id}/file/"),
            Self::ContactPhoto => format!("{API_PREFIX}/contacts/{id}/file/"),
            Self::DocumentFile => format!("{API_PREFIX}/documents/{id}/file/"),
            Self::AgreementFile => format!("{API_PREFIX}/agreements/{id}/file/"),
        }
    }
}
