use anyhow::Result;
use clap::Parser;
use std::path::Path;

use sheets_cli::cli::commands::run::{RunStatus, handle_run_command};
use sheets_cli::cli::{Cli, Commands};
use sheets_cli::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // .env may set RUST_LOG, so it is loaded before the logger is built
    let dotenv_error = load_dotenv(None);
    logger(cli.global.verbose).init();
    if let Some(e) = dotenv_error {
        log::warn!("Failed to load .env: {}", e);
    }

    if cli.global.no_color {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(RunStatus::Completed) => {}
        Ok(RunStatus::CompletedWithFailures) => std::process::exit(2),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<RunStatus> {
    let mut config = Config::from_env()?;
    cli.global.apply(&mut config);

    match cli.command {
        Commands::Run(args) => handle_run_command(args, &config).await,
        Commands::Plan(args) => handle_run_command(args.into(), &config).await,
    }
}

/// Load `.env` (or `path`) into the process environment. A missing file is not an error.
fn load_dotenv(path: Option<&Path>) -> Option<dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    loaded.err().filter(|e| !e.not_found())
}

fn logger(verbose: bool) -> env_logger::Builder {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    builder.format_target(false);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_from_dotenv_reaches_logger() {
        if std::env::var_os("RUST_LOG").is_some() {
            // an inherited RUST_LOG wins over .env
            return;
        }
        let path = std::env::temp_dir().join(format!("sheets-cli-{}.env", std::process::id()));
        std::fs::write(&path, "RUST_LOG=warn\n").unwrap();

        assert!(load_dotenv(Some(&path)).is_none());
        assert_eq!(logger(true).build().filter(), log::LevelFilter::Warn);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_dotenv_is_not_an_error() {
        let path = std::env::temp_dir().join("sheets-cli-does-not-exist.env");
        assert!(load_dotenv(Some(&path)).is_none());
    }
}
