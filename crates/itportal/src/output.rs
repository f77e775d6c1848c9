//! Output helpers: summary table and file/stdout sinks.

use std::io::{self, Write};
use std::path::Path;

use itportal_core::Snapshot;
use itportal_core::render::summary_label;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Collection")]
    collection: &'static str,
    #[tabled(rename = "Records")]
    records: usize,
}

/// Per-collection record counts as a rounded table, with a total row.
pub fn render_summary(snapshot: &Snapshot) -> String {
    let mut rows: Vec<CountRow> = snapshot
        .collections
        .counts()
        .into_iter()
        .map(|(kind, records)| CountRow {
            collection: summary_label(kind),
            records,
        })
        .collect();
    rows.push(CountRow {
        collection: "total",
        records: snapshot.collections.total(),
    });

    let mut out = Table::new(rows).with(Style::rounded()).to_string();
    out.push_str(&format!(
        "\nGenerated {}",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn emit(content: &str, path: Option<&Path>) -> io::Result<()> {
    match path {
        Some(path) => write_file(path, content),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()
        }
    }
}

/// Replace `path` with `content` via a sibling temp file and rename, so a
/// reader never sees a half-written document.
pub fn write_file(path: &Path, content: &str) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use itportal_api::models::{Device, Site};
    use itportal_core::Collections;

    use super::*;

    #[test]
    fn summary_lists_every_collection_and_total() {
        let collections = Collections {
            sites: vec![Site::default(), Site::default()],
            devices: vec![Device::default()],
            ..Collections::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let table = render_summary(&Snapshot::new(collections, at));

        assert!(table.contains("Collection"));
        assert!(table.contains("configurations"));
        assert!(table.contains("total"));
        assert!(table.contains("Generated 2024-05-01 12:00:00 UTC"));
        assert_eq!(table.lines().filter(|l| l.contains("│ 2 ")).count(), 1);
    }

    #[test]
    fn write_file_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.md");

        write_file(&path, "first").unwrap();
        write_file(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("snapshot.md.tmp").exists());
    }
}
