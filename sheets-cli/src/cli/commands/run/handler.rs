//! Run/plan command handler

use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;

use super::{OutputFormat, RunCommands};
use crate::api::{AuthManager, GoogleClient, Provisioned, SheetManager};
use crate::config::Config;
use crate::provision::{
    Counts, PartyResult, Plan, ProvisionReport, ProvisionSettings, Provisioner, load_mapping,
};

/// How a completed command should be reported to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    CompletedWithFailures,
}

/// Handle `run` (and `plan`, which forces `dry_run`)
pub async fn handle_run_command(args: RunCommands, config: &Config) -> Result<RunStatus> {
    config.validate()?;

    // Template IDs are checked before any network traffic
    let settings = if args.dry_run {
        None
    } else {
        Some(ProvisionSettings::from_config(config)?)
    };

    let manager = build_manager(config)?;

    let records = load_mapping(&manager, config).await?;
    let plan = Plan::from_records(&records, &config.reports_column)?;

    let Some(settings) = settings else {
        print_plan(&plan, args.format)?;
        return Ok(RunStatus::Completed);
    };

    let start = Instant::now();
    let report = Provisioner::new(&manager, &settings).run(&plan).await;
    log::info!("Provisioning finished in {:.1}s", start.elapsed().as_secs_f64());

    print_report(&report, args.format)?;

    Ok(if report.has_failures() {
        RunStatus::CompletedWithFailures
    } else {
        RunStatus::Completed
    })
}

/// Authenticate once and wrap the client in the sheet facade
fn build_manager(config: &Config) -> Result<SheetManager<GoogleClient>> {
    let auth = AuthManager::from_service_account_file(&config.credentials_path, config.scopes.clone())
        .with_context(|| {
            format!(
                "Failed to load service account from {}",
                config.credentials_path.display()
            )
        })?;
    log::debug!("Authenticating as {}", auth.client_email());

    let client = GoogleClient::new(auth, config.http_timeout)?;
    Ok(SheetManager::new(client))
}

fn print_plan(plan: &Plan, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let json = serde_json::json!({
            "employees": plan.employees,
            "supervisors": plan.groups,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to format plan as JSON")?
        );
        return Ok(());
    }

    println!("{}", format!("Employees ({})", plan.employees.len()).bold());
    for employee in &plan.employees {
        println!(
            "  {} <{}>  {} {}",
            employee.employee_name.bright_green(),
            employee.employee_email,
            "reports to".dimmed(),
            employee.supervisor_name
        );
    }

    println!();
    println!("{}", format!("Supervisors ({})", plan.groups.len()).bold());
    for group in &plan.groups {
        println!(
            "  {} <{}>  {}",
            group.sheet_title().bright_green(),
            group.key.email,
            group.emails().join(", ").dimmed()
        );
    }

    Ok(())
}

fn print_report(report: &ProvisionReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to format report as JSON")?
        );
        return Ok(());
    }

    println!();
    print_counts("Employees", &report.employee_counts());
    print_counts("Supervisors", &report.supervisor_counts());

    if report.has_failures() {
        println!();
        println!("{}", "Failures:".red().bold());
        for result in report.failures() {
            print_failure(result);
        }
    }

    Ok(())
}

fn print_counts(label: &str, counts: &Counts) {
    println!(
        "{:<12} {} created, {} reused, {}",
        label,
        counts.created.to_string().bright_green(),
        counts.reused.to_string().cyan(),
        if counts.failed == 0 {
            "0 failed".normal()
        } else {
            format!("{} failed", counts.failed).red()
        }
    );
}

fn print_failure(result: &PartyResult) {
    let state = match result.provisioned {
        Some(Provisioned::Created) => " (created)",
        Some(Provisioned::Existing) => " (reused)",
        None => "",
    };
    for failure in &result.failures {
        println!(
            "  {}{} [{} / {}{}] {}",
            result.title.yellow(),
            state,
            failure.stage,
            failure.kind,
            if failure.transient { ", retryable" } else { "" },
            failure.message.dimmed()
        );
    }
}
