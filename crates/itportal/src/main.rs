mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use itportal_config::Config;
use itportal_core::PortalConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_json);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let portal = portal_config(&cli.global)?;
    tracing::debug!(command = ?cli.command, base_url = %portal.base_url, "dispatching command");
    commands::dispatch(cli.command, &portal).await
}

/// Build a `PortalConfig` from the config file, environment and CLI overrides.
fn portal_config(global: &GlobalOpts) -> Result<PortalConfig, CliError> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(itportal_config::config_path);
    let config = itportal_config::load_config(Some(&path))
        .map_err(|e| CliError::from_config(e, &path))?;

    apply_overrides(config, global)
        .to_portal_config()
        .map_err(|e| CliError::from_config(e, &path))
}

fn apply_overrides(mut config: Config, global: &GlobalOpts) -> Config {
    if let Some(ref url) = global.base_url {
        config.base_url = Some(url.clone());
    }
    if global.insecure {
        config.insecure = true;
    }
    config
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn flags_override_the_config_file() {
        let cli = Cli::try_parse_from([
            "itportal",
            "--base-url",
            "https://override.example.com",
            "--insecure",
            "snapshot",
        ])
        .unwrap();
        let file = Config {
            base_url: Some("https://file.example.com".into()),
            ..Config::default()
        };

        let merged = apply_overrides(file, &cli.global);
        assert_eq!(
            merged.base_url.as_deref(),
            Some("https://override.example.com")
        );
        assert!(merged.insecure);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn absent_flags_keep_file_values() {
        let cli = Cli::try_parse_from(["itportal", "snapshot"]).unwrap();
        let file = Config {
            base_url: Some("https://file.example.com".into()),
            insecure: true,
            ..Config::default()
        };

        let merged = apply_overrides(file.clone(), &cli.global);
        assert_eq!(merged, file);
    }
}
