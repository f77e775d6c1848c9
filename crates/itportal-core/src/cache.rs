// ── Snapshot cache ──
//
// Owns the published snapshot. Readers load an `Arc<Snapshot>` from an
// `ArcSwap` and never wait on the network; builds run outside the slot and
// are published with a single atomic store. A failed build publishes nothing.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::builder::SnapshotBuilder;
use crate::config::SnapshotConfig;
use crate::error::CoreError;
use crate::render::summary_label;
use crate::snapshot::Snapshot;

/// Shared handle to the published snapshot. Cheaply cloneable.
#[derive(Clone)]
pub struct SnapshotCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    builder: SnapshotBuilder,
    current: ArcSwap<Snapshot>,
    /// Generation time of the latest publish.
    published: watch::Sender<DateTime<Utc>>,
    refresh_interval: Duration,
}

impl SnapshotCache {
    /// Run the first build and start serving it.
    ///
    /// There is no empty state: if this build fails the cache is never
    /// created.
    pub async fn initialize(
        builder: SnapshotBuilder,
        config: &SnapshotConfig,
    ) -> Result<Self, CoreError> {
        let snapshot = builder.build().await.map_err(CoreError::InitialBuild)?;
        log_publish(&snapshot);

        let (published, _) = watch::channel(snapshot.generated_at);
        Ok(Self {
            inner: Arc::new(CacheInner {
                builder,
                current: ArcSwap::from_pointee(snapshot),
                published,
                refresh_interval: config.refresh_interval,
            }),
        })
    }

    /// The most recently published snapshot.
    pub fn get(&self) -> Arc<Snapshot> {
        self.inner.current.load_full()
    }

    /// Build now and publish on success.
    ///
    /// On failure the published snapshot is left untouched and the error is
    /// returned to this caller only. Concurrent calls each build; the last
    /// to finish is what readers see.
    pub async fn refresh_now(&self) -> Result<Arc<Snapshot>, CoreError> {
        let snapshot = Arc::new(self.inner.builder.build().await.map_err(CoreError::Build)?);
        self.publish(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Notified with the generation time after every publish.
    pub fn subscribe(&self) -> watch::Receiver<DateTime<Utc>> {
        self.inner.published.subscribe()
    }

    /// The builder behind this cache, for ad-hoc client access.
    pub fn builder(&self) -> &SnapshotBuilder {
        &self.inner.builder
    }

    /// Start the periodic refresh loop.
    ///
    /// Returns `None` when the configured interval is zero. The token is
    /// only checked between ticks, so a build already running when it is
    /// cancelled still completes or times out.
    pub fn spawn_background_refresh(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let interval = self.inner.refresh_interval;
        if interval.is_zero() {
            info!("background refresh disabled");
            return None;
        }

        info!(interval_secs = interval.as_secs(), "starting background refresh");
        Some(tokio::spawn(refresh_task(self.clone(), interval, cancel)))
    }

    fn publish(&self, snapshot: Arc<Snapshot>) {
        log_publish(&snapshot);
        let generated_at = snapshot.generated_at;
        self.inner.current.store(snapshot);
        self.inner.published.send_replace(generated_at);
    }
}

fn log_publish(snapshot: &Snapshot) {
    let counts = snapshot
        .collections
        .counts()
        .into_iter()
        .map(|(kind, n)| format!("{n} {}", summary_label(kind)))
        .collect::<Vec<_>>()
        .join(", ");
    info!(
        generated_at = %snapshot.generated_at,
        total = snapshot.collections.total(),
        counts = %counts,
        "snapshot published"
    );
}

async fn refresh_task(cache: SnapshotCache, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = cache.refresh_now().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }

    debug!("background refresh stopped");
}
