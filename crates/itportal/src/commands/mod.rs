//! Command dispatch: bridges CLI args to the snapshot cache and output.

pub mod serve;
pub mod snapshot;

use std::sync::Arc;

use itportal_core::{PortalConfig, SnapshotBuilder};

use crate::cli::Command;
use crate::error::CliError;

/// Dispatch a portal-bound command to its handler.
pub async fn dispatch(cmd: Command, portal: &PortalConfig) -> Result<(), CliError> {
    match cmd {
        Command::Snapshot(args) => snapshot::handle(args, portal).await,
        Command::Serve(args) => serve::handle(args, portal).await,
    }
}

fn snapshot_builder(portal: &PortalConfig) -> Result<SnapshotBuilder, CliError> {
    let client = portal.build_client()?;
    Ok(SnapshotBuilder::new(Arc::new(client), &portal.snapshot))
}
