//! `itportal serve`: keep a snapshot fresh until interrupted.
//!
//! The first build must succeed. After that the background loop refreshes
//! on the configured interval and every publish rewrites the output.

use std::path::Path;

use itportal_core::{PortalConfig, SnapshotCache};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ServeArgs, portal: &PortalConfig) -> Result<(), CliError> {
    let builder = super::snapshot_builder(portal)?;
    let cache = SnapshotCache::initialize(builder, &portal.snapshot).await?;
    let output = args.output.as_deref();

    let mut published = cache.subscribe();
    write_current(&cache, output)?;

    let cancel = CancellationToken::new();
    let refresher = cache.spawn_background_refresh(cancel.clone());
    tokio::spawn(cancel_on_signal(cancel.clone()));

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = published.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Err(e) = write_current(&cache, output) {
                    warn!(error = %e, "failed to write snapshot");
                }
            }
        }
    }

    if let Some(handle) = refresher {
        if let Err(e) = handle.await {
            warn!(error = %e, "background refresh task failed");
        }
    }
    info!("stopped");
    Ok(())
}

fn write_current(cache: &SnapshotCache, output: Option<&Path>) -> std::io::Result<()> {
    let snapshot = cache.get();
    output::emit(&snapshot.markdown, output)?;
    debug!(generated_at = %snapshot.generated_at, "snapshot written");
    Ok(())
}

async fn cancel_on_signal(cancel: CancellationToken) {
    shutdown_signal().await;
    info!("shutdown signal received");
    cancel.cancel();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
