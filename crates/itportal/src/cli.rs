//! Clap derive structures for the `itportal` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// itportal -- Markdown snapshots of an ITPortal documentation instance
#[derive(Debug, Parser)]
#[command(
    name = "itportal",
    version,
    about = "Build and serve Markdown snapshots of ITPortal documentation",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "ITPORTAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Portal URL (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build one snapshot and print it
    Snapshot(SnapshotArgs),

    /// Keep a snapshot fresh in the background until interrupted
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SnapshotFormat {
    /// Full Markdown document
    #[default]
    Markdown,
    /// Per-collection record counts
    Summary,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// What to print
    #[arg(long, short = 'f', value_enum, default_value_t = SnapshotFormat::Markdown)]
    pub format: SnapshotFormat,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// File rewritten with the Markdown after every publish
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn parses_snapshot_summary() {
        let cli = Cli::try_parse_from([
            "itportal",
            "-vv",
            "--base-url",
            "https://portal.example.com",
            "snapshot",
            "--format",
            "summary",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 2);
        assert_eq!(
            cli.global.base_url.as_deref(),
            Some("https://portal.example.com")
        );
        let Command::Snapshot(args) = cli.command else {
            panic!("expected snapshot command");
        };
        assert_eq!(args.format, SnapshotFormat::Summary);
        assert!(args.output.is_none());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn global_flags_follow_the_subcommand() {
        let cli =
            Cli::try_parse_from(["itportal", "serve", "--output", "out.md", "--log-json", "-k"])
                .unwrap();
        assert!(cli.global.log_json);
        assert!(cli.global.insecure);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.output, Some(PathBuf::from("out.md")));
    }
}
