//! Command-line interface definitions

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use commands::run::{PlanCommands, RunCommands};

#[derive(Parser)]
#[command(
    name = "sheets-cli",
    author,
    version,
    about = "Provision employee and supervisor spreadsheets from an organisational mapping sheet"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy, fill and share a spreadsheet for every employee and supervisor
    Run(RunCommands),
    /// Show what `run` would provision without touching any spreadsheet
    Plan(PlanCommands),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Title of the mapping spreadsheet (overrides MAPPING_SPREADSHEET)
    #[arg(long, global = true)]
    pub mapping_spreadsheet: Option<String>,

    /// Tab of the mapping spreadsheet (overrides MAPPING_SHEET)
    #[arg(long, global = true)]
    pub mapping_tab: Option<String>,

    /// Service-account key file (overrides GOOGLE_APPLICATION_CREDENTIALS)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl GlobalArgs {
    /// Apply command-line overrides on top of the environment configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(title) = &self.mapping_spreadsheet {
            config.mapping_spreadsheet = title.clone();
        }
        if let Some(tab) = &self.mapping_tab {
            config.mapping_tab = tab.clone();
        }
        if let Some(path) = &self.credentials {
            config.credentials_path = path.clone();
        }
    }
}
