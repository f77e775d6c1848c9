// ── Snapshot builder ──
//
// Fan-out/fan-in: one task per snapshot collection on a JoinSet, joined
// under a single deadline. Dropping the set aborts whatever is still in
// flight, which is how both the first-failure and timeout paths cancel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use itportal_api::models::{
    Account, Agreement, Cabinet, Company, Configuration, Contact, Device, Document, Facility,
    IpNetwork, Kb, Site,
};
use itportal_api::{Entity, ItPortalClient, ListFilters};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::SnapshotConfig;
use crate::error::BuildError;
use crate::snapshot::{Collections, Snapshot};

/// Result of one collection fetch, tagged with where it belongs.
enum Fetched {
    Companies(Vec<Company>),
    Sites(Vec<Site>),
    Devices(Vec<Device>),
    Kbs(Vec<Kb>),
    Contacts(Vec<Contact>),
    Agreements(Vec<Agreement>),
    IpNetworks(Vec<IpNetwork>),
    Documents(Vec<Document>),
    Accounts(Vec<Account>),
    Facilities(Vec<Facility>),
    Cabinets(Vec<Cabinet>),
    Configurations(Vec<Configuration>),
}

impl Fetched {
    fn store(self, c: &mut Collections) {
        match self {
            Self::Companies(v) => c.companies = v,
            Self::Sites(v) => c.sites = v,
            Self::Devices(v) => c.devices = v,
            Self::Kbs(v) => c.kbs = v,
            Self::Contacts(v) => c.contacts = v,
            Self::Agreements(v) => c.agreements = v,
            Self::IpNetworks(v) => c.ip_networks = v,
            Self::Documents(v) => c.documents = v,
            Self::Accounts(v) => c.accounts = v,
            Self::Facilities(v) => c.facilities = v,
            Self::Cabinets(v) => c.cabinets = v,
            Self::Configurations(v) => c.configurations = v,
        }
    }
}

type FetchSet = JoinSet<Result<Fetched, BuildError>>;

/// Builds complete snapshots from the portal.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    client: Arc<ItPortalClient>,
    limit_per_entity: usize,
    timeout: Duration,
}

impl SnapshotBuilder {
    pub fn new(client: Arc<ItPortalClient>, config: &SnapshotConfig) -> Self {
        Self {
            client,
            limit_per_entity: config.limit_per_entity,
            timeout: config.build_timeout,
        }
    }

    /// The client used for fetches, for ad-hoc requests outside the snapshot.
    pub fn client(&self) -> &Arc<ItPortalClient> {
        &self.client
    }

    /// Fetch every collection and assemble a rendered snapshot.
    ///
    /// All-or-nothing: the first failed fetch or an elapsed deadline aborts
    /// the remaining fetches and no snapshot is produced.
    pub async fn build(&self) -> Result<Snapshot, BuildError> {
        let started = Instant::now();
        debug!(
            limit_per_entity = self.limit_per_entity,
            timeout_secs = self.timeout.as_secs(),
            "building snapshot"
        );

        let Ok(fetched) = tokio::time::timeout(self.timeout, self.fetch_all()).await else {
            return Err(BuildError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            });
        };
        let collections = fetched?;

        self.warn_on_budget(&collections);
        let snapshot = Snapshot::new(collections, Utc::now());

        debug!(
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "snapshot built"
        );
        Ok(snapshot)
    }

    async fn fetch_all(&self) -> Result<Collections, BuildError> {
        let mut set = FetchSet::new();
        self.spawn(&mut set, Fetched::Companies);
        self.spawn(&mut set, Fetched::Sites);
        self.spawn(&mut set, Fetched::Devices);
        self.spawn(&mut set, Fetched::Kbs);
        self.spawn(&mut set, Fetched::Contacts);
        self.spawn(&mut set, Fetched::Agreements);
        self.spawn(&mut set, Fetched::IpNetworks);
        self.spawn(&mut set, Fetched::Documents);
        self.spawn(&mut set, Fetched::Accounts);
        self.spawn(&mut set, Fetched::Facilities);
        self.spawn(&mut set, Fetched::Cabinets);
        self.spawn(&mut set, Fetched::Configurations);

        let mut collections = Collections::default();
        while let Some(joined) = set.join_next().await {
            let fetched = joined.map_err(|e| BuildError::TaskFailed {
                message: e.to_string(),
            })??;
            fetched.store(&mut collections);
        }
        Ok(collections)
    }

    fn spawn<T: Entity>(
        &self,
        set: &mut FetchSet,
        wrap: impl FnOnce(Vec<T>) -> Fetched + Send + 'static,
    ) {
        let client = Arc::clone(&self.client);
        let limit = self.limit_per_entity;

        set.spawn(async move {
            let items = client
                .list_all::<T>(&ListFilters::default(), limit)
                .await
                .map_err(|source| BuildError::Fetch {
                    kind: T::KIND,
                    source,
                })?;
            debug!(kind = %T::KIND, count = items.len(), "collection fetched");
            Ok(wrap(items))
        });
    }

    /// A collection that filled its whole budget was probably cut short.
    fn warn_on_budget(&self, collections: &Collections) {
        if self.limit_per_entity == 0 {
            return;
        }
        for (kind, count) in collections.counts() {
            if count >= self.limit_per_entity {
                warn!(
                    kind = %kind,
                    count,
                    limit = self.limit_per_entity,
                    "collection reached its fetch budget, snapshot may be incomplete"
                );
            }
        }
    }
}
