//! `itportal snapshot`: one build, printed once.

use itportal_core::PortalConfig;
use tracing::info;

use crate::cli::{SnapshotArgs, SnapshotFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: SnapshotArgs, portal: &PortalConfig) -> Result<(), CliError> {
    let builder = super::snapshot_builder(portal)?;
    let snapshot = builder.build().await?;
    info!(total = snapshot.collections.total(), "snapshot built");

    let rendered = match args.format {
        SnapshotFormat::Markdown => snapshot.markdown,
        SnapshotFormat::Summary => output::render_summary(&snapshot),
    };
    output::emit(&rendered, args.output.as_deref())?;
    Ok(())
}
