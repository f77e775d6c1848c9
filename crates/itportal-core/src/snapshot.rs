// ── Aggregate snapshot ──
//
// One immutable, point-in-time view of every snapshot collection plus its
// rendered Markdown. Built in one piece by `SnapshotBuilder`; never mutated.

use chrono::{DateTime, Utc};
use itportal_api::EntityKind;
use itportal_api::models::{
    Account, Agreement, Cabinet, Company, Configuration, Contact, Device, Document, Facility,
    IpNetwork, Kb, Site,
};

/// The twelve collections held by a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub companies: Vec<Company>,
    pub sites: Vec<Site>,
    pub devices: Vec<Device>,
    pub kbs: Vec<Kb>,
    pub contacts: Vec<Contact>,
    pub agreements: Vec<Agreement>,
    pub ip_networks: Vec<IpNetwork>,
    pub documents: Vec<Document>,
    pub accounts: Vec<Account>,
    pub facilities: Vec<Facility>,
    pub cabinets: Vec<Cabinet>,
    pub configurations: Vec<Configuration>,
}

impl Collections {
    /// Number of records held for `kind`. Kinds outside the snapshot are 0.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Companies => self.companies.len(),
            EntityKind::Sites => self.sites.len(),
            EntityKind::Devices => self.devices.len(),
            EntityKind::Kbs => self.kbs.len(),
            EntityKind::Contacts => self.contacts.len(),
            EntityKind::Agreements => self.agreements.len(),
            EntityKind::IpNetworks => self.ip_networks.len(),
            EntityKind::Documents => self.documents.len(),
            EntityKind::Accounts => self.accounts.len(),
            EntityKind::Facilities => self.facilities.len(),
            EntityKind::Cabinets => self.cabinets.len(),
            EntityKind::Configurations => self.configurations.len(),
            EntityKind::AdditionalCredentials | EntityKind::FormInstances => 0,
        }
    }

    /// `(kind, count)` for every snapshot kind, in rendering order.
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        EntityKind::SNAPSHOT
            .iter()
            .map(|&kind| (kind, self.count(kind)))
            .collect()
    }

    pub fn total(&self) -> usize {
        EntityKind::SNAPSHOT.iter().map(|&k| self.count(k)).sum()
    }
}

/// A published aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub collections: Collections,
    pub markdown: String,
}

impl Snapshot {
    /// Stamp and render `collections` as of `generated_at`.
    pub fn new(collections: Collections, generated_at: DateTime<Utc>) -> Self {
        let markdown = crate::render::render_snapshot(&collections, generated_at);
        Self {
            generated_at,
            collections,
            markdown,
        }
    }
}
