//! `run` and `plan` commands

mod handler;

pub use handler::{RunStatus, handle_run_command};

use clap::{Args, ValueEnum};

#[derive(Args, Debug, Clone, Default)]
pub struct RunCommands {
    /// Read and parse the mapping sheet, print the plan, and stop
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for the plan and the run summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// `plan` always stops after printing, so it only takes the output format
#[derive(Args, Debug, Clone, Default)]
pub struct PlanCommands {
    /// Output format for the plan
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl From<PlanCommands> for RunCommands {
    fn from(args: PlanCommands) -> Self {
        RunCommands {
            dry_run: true,
            format: args.format,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
