#![allow(clippy::unwrap_used)]
// Integration tests for `SnapshotBuilder` and `SnapshotCache` against a
// wiremock portal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use itportal_core::{
    BuildError, CoreError, EntityKind, PortalConfig, Snapshot, SnapshotBuilder, SnapshotCache,
    SnapshotConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn snapshot_config() -> SnapshotConfig {
    SnapshotConfig {
        limit_per_entity: 1000,
        refresh_interval: Duration::ZERO,
        build_timeout: Duration::from_secs(10),
    }
}

fn builder_for(server: &MockServer, config: &SnapshotConfig) -> SnapshotBuilder {
    let portal = PortalConfig::new(
        server.uri().parse().unwrap(),
        SecretString::from("test-key".to_string()),
    );
    SnapshotBuilder::new(Arc::new(portal.build_client().unwrap()), config)
}

fn query_usize(req: &Request, key: &str) -> Option<usize> {
    req.url
        .query_pairs()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.parse().ok())
}

fn page_of(kind: EntityKind, total: usize, req: &Request) -> Value {
    let offset = query_usize(req, "offset").unwrap_or(0);
    let limit = query_usize(req, "limit").unwrap_or(total);
    let end = (offset + limit).min(total);
    let results: Vec<Value> = (offset..end)
        .map(|i| json!({ "id": i + 1, "name": format!("{kind}-{}", i + 1) }))
        .collect();
    json!({
        "code": 200,
        "data": { "results": results, "total": total, "offset": offset, "limit": limit }
    })
}

async fn mount_collection(server: &MockServer, kind: EntityKind, total: usize) {
    Mock::given(method("GET"))
        .and(path(kind.collection_path()))
        .respond_with(move |req: &Request| {
            ResponseTemplate::new(200).set_body_json(page_of(kind, total, req))
        })
        .mount(server)
        .await;
}

/// Serve `total` records for every snapshot collection except `skip`.
async fn mount_all_except(server: &MockServer, total: usize, skip: Option<EntityKind>) {
    for kind in EntityKind::SNAPSHOT {
        if Some(kind) != skip {
            mount_collection(server, kind, total).await;
        }
    }
}

async fn mount_all(server: &MockServer, total: usize) {
    mount_all_except(server, total, None).await;
}

/// Every collection has the same count and the Markdown agrees with it.
fn assert_consistent(snapshot: &Snapshot) {
    let counts = snapshot.collections.counts();
    let expected = counts[0].1;
    for (kind, n) in &counts {
        assert_eq!(*n, expected, "{kind} count differs within one snapshot");
    }
    let heading = format!("## Sites ({expected})");
    assert!(
        snapshot.markdown.contains(&heading),
        "markdown does not match collections"
    );
}

// ── Builder ─────────────────────────────────────────────────────────

#[tokio::test]
async fn build_fetches_every_collection() {
    let server = MockServer::start().await;
    // Sites span three pages.
    mount_all_except(&server, 3, Some(EntityKind::Sites)).await;
    mount_collection(&server, EntityKind::Sites, 250).await;

    let snapshot = builder_for(&server, &snapshot_config())
        .build()
        .await
        .unwrap();

    assert_eq!(snapshot.collections.sites.len(), 250);
    assert_eq!(snapshot.collections.companies.len(), 3);
    assert_eq!(snapshot.collections.configurations.len(), 3);
    assert_eq!(snapshot.collections.total(), 250 + 11 * 3);
    assert!(snapshot.markdown.contains("## Sites (250)"));
    assert!(snapshot.markdown.contains("### sites-250 (ID: 250)"));
    assert!(snapshot.markdown.contains(&format!(
        "_Generated: {} UTC_",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S")
    )));
}

#[tokio::test]
async fn build_respects_per_collection_budget() {
    let server = MockServer::start().await;
    mount_all(&server, 250).await;

    let config = SnapshotConfig {
        limit_per_entity: 150,
        ..snapshot_config()
    };
    let snapshot = builder_for(&server, &config).build().await.unwrap();

    for (kind, n) in snapshot.collections.counts() {
        assert_eq!(n, 150, "{kind} exceeded its budget");
    }
}

#[tokio::test]
async fn one_failed_collection_fails_the_build() {
    let server = MockServer::start().await;
    mount_all_except(&server, 2, Some(EntityKind::Sites)).await;
    Mock::given(method("GET"))
        .and(path("/api/2.0/sites/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let result = builder_for(&server, &snapshot_config()).build().await;

    match result {
        Err(BuildError::Fetch { kind, source }) => {
            assert_eq!(kind, EntityKind::Sites);
            assert_eq!(source.status(), Some(500));
        }
        other => panic!("expected Fetch error, got: {other:?}"),
    }
}

#[tokio::test]
async fn slow_collection_times_out_the_build() {
    let server = MockServer::start().await;
    mount_all_except(&server, 1, Some(EntityKind::Devices)).await;
    Mock::given(method("GET"))
        .and(path("/api/2.0/devices/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": 200, "data": { "results": [], "total": 0 } }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = SnapshotConfig {
        build_timeout: Duration::from_millis(200),
        ..snapshot_config()
    };
    let started = std::time::Instant::now();
    let result = builder_for(&server, &config).build().await;

    assert!(
        matches!(result, Err(BuildError::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(5));
}

// ── Cache ───────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_fails_without_a_first_snapshot() {
    let server = MockServer::start().await;
    mount_all_except(&server, 1, Some(EntityKind::Contacts)).await;
    Mock::given(method("GET"))
        .and(path("/api/2.0/contacts/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = snapshot_config();
    let result = SnapshotCache::initialize(builder_for(&server, &config), &config).await;

    assert!(
        matches!(
            result,
            Err(CoreError::InitialBuild(BuildError::Fetch {
                kind: EntityKind::Contacts,
                ..
            }))
        ),
        "expected InitialBuild error"
    );
}

#[tokio::test]
async fn failed_refresh_keeps_the_published_snapshot() {
    let server = MockServer::start().await;
    mount_all(&server, 2).await;

    let config = snapshot_config();
    let cache = SnapshotCache::initialize(builder_for(&server, &config), &config)
        .await
        .unwrap();
    let before = cache.get();

    server.reset().await;
    mount_all_except(&server, 5, Some(EntityKind::Sites)).await;
    Mock::given(method("GET"))
        .and(path("/api/2.0/sites/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = cache.refresh_now().await;
    assert!(
        matches!(result, Err(CoreError::Build(BuildError::Fetch { .. }))),
        "expected Build error"
    );

    let after = cache.get();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.collections.devices.len(), 2);
}

#[tokio::test]
async fn refresh_now_publishes_and_notifies() {
    let server = MockServer::start().await;
    mount_all(&server, 2).await;

    let config = snapshot_config();
    let cache = SnapshotCache::initialize(builder_for(&server, &config), &config)
        .await
        .unwrap();
    let mut rx = cache.subscribe();
    assert!(!rx.has_changed().unwrap());

    server.reset().await;
    mount_all(&server, 4).await;

    let fresh = cache.refresh_now().await.unwrap();

    assert!(Arc::ptr_eq(&fresh, &cache.get()));
    assert_eq!(cache.get().collections.kbs.len(), 4);
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), fresh.generated_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_a_mixed_snapshot() {
    let server = MockServer::start().await;
    mount_all(&server, 1).await;

    let config = snapshot_config();
    let cache = SnapshotCache::initialize(builder_for(&server, &config), &config)
        .await
        .unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let reads = Arc::new(AtomicUsize::new(0));
    let mut readers = Vec::new();
    for _ in 0..4 {
        let cache = cache.clone();
        let stop = Arc::clone(&stop);
        let reads = Arc::clone(&reads);
        readers.push(tokio::spawn(async move {
            while !stop.load(Ordering::Relaxed) {
                assert_consistent(&cache.get());
                reads.fetch_add(1, Ordering::Relaxed);
                tokio::task::yield_now().await;
            }
        }));
    }

    for round in 2..=5 {
        server.reset().await;
        mount_all(&server, round).await;
        cache.refresh_now().await.unwrap();
        assert_eq!(cache.get().collections.sites.len(), round);
    }

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.await.unwrap();
    }
    assert!(reads.load(Ordering::Relaxed) > 0);
}

// ── Background refresh ──────────────────────────────────────────────

#[tokio::test]
async fn zero_interval_disables_background_refresh() {
    let server = MockServer::start().await;
    mount_all(&server, 1).await;

    let config = snapshot_config();
    let cache = SnapshotCache::initialize(builder_for(&server, &config), &config)
        .await
        .unwrap();

    let cancel = tokio_util::sync::CancellationToken::new();
    assert!(cache.spawn_background_refresh(cancel).is_none());
}

#[tokio::test]
async fn background_refresh_publishes_until_cancelled() {
    let server = MockServer::start().await;
    mount_all(&server, 1).await;

    let config = SnapshotConfig {
        refresh_interval: Duration::from_millis(50),
        ..snapshot_config()
    };
    let cache = SnapshotCache::initialize(builder_for(&server, &config), &config)
        .await
        .unwrap();
    let mut rx = cache.subscribe();

    server.reset().await;
    mount_all(&server, 3).await;

    let cancel = tokio_util::sync::CancellationToken::new();
    let handle = cache.spawn_background_refresh(cancel.clone()).unwrap();

    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("background refresh never published")
        .unwrap();
    assert_eq!(cache.get().collections.cabinets.len(), 3);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("refresh loop did not stop")
        .unwrap();
}

#[tokio::test]
async fn background_refresh_survives_failed_builds() {
    let server = MockServer::start().await;
    mount_all(&server, 1).await;

    let config = SnapshotConfig {
        refresh_interval: Duration::from_millis(30),
        ..snapshot_config()
    };
    let cache = SnapshotCache::initialize(builder_for(&server, &config), &config)
        .await
        .unwrap();
    let before = cache.get();
    let mut rx = cache.subscribe();

    // Everything fails for a while.
    server.reset().await;
    let cancel = tokio_util::sync::CancellationToken::new();
    let handle = cache.spawn_background_refresh(cancel.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(Arc::ptr_eq(&before, &cache.get()));

    // Then the portal recovers and the loop picks it up.
    mount_all(&server, 2).await;
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("loop stopped after failures")
        .unwrap();
    assert_eq!(cache.get().collections.accounts.len(), 2);

    cancel.cancel();
    handle.await.unwrap();
}
