//! Runtime configuration loaded from the environment (and `.env`)

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::constants::DEFAULT_SCOPES;
use crate::mapping::DIRECT_REPORTS_COLUMN;

pub const DEFAULT_MAPPING_SPREADSHEET: &str = "GH Sample Data";
pub const DEFAULT_CREDENTIALS_FILE: &str = "service_account.json";
pub const DEFAULT_TARGET_TAB: &str = "Orders";
pub const DEFAULT_TARGET_CELL: &str = "B1";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Environment variable names
pub mod vars {
    pub const MAPPING_SPREADSHEET: &str = "MAPPING_SPREADSHEET";
    pub const MAPPING_SHEET: &str = "MAPPING_SHEET";
    pub const EMPLOYEE_TEMPLATE: &str = "EMPLOYEE_TEMPLATE";
    pub const SUPERVISOR_TEMPLATE: &str = "SUPERVISOR_TEMPLATE";
    pub const CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
    pub const SCOPES: &str = "GOOGLE_SCOPES";
    pub const REPORTS_COLUMN: &str = "REPORTS_COLUMN";
    pub const TARGET_TAB: &str = "TARGET_TAB";
    pub const TARGET_CELL: &str = "TARGET_CELL";
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Title of the spreadsheet holding the organisational mapping
    pub mapping_spreadsheet: String,
    /// Tab inside the mapping spreadsheet
    pub mapping_tab: String,
    /// Column with the `Name (email), ...` lists
    pub reports_column: String,
    pub employee_template: Option<String>,
    pub supervisor_template: Option<String>,
    pub credentials_path: PathBuf,
    pub scopes: Vec<String>,
    pub target_tab: String,
    pub target_cell: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let scopes = match get(vars::SCOPES) {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        };

        let http_timeout = match get(vars::HTTP_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().with_context(|| {
                format!("{} must be a whole number of seconds, got '{}'", vars::HTTP_TIMEOUT_SECS, raw)
            })?),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Config {
            mapping_spreadsheet: get(vars::MAPPING_SPREADSHEET)
                .unwrap_or_else(|| DEFAULT_MAPPING_SPREADSHEET.to_string()),
            mapping_tab: get(vars::MAPPING_SHEET).unwrap_or_default(),
            reports_column: get(vars::REPORTS_COLUMN)
                .unwrap_or_else(|| DIRECT_REPORTS_COLUMN.to_string()),
            employee_template: get(vars::EMPLOYEE_TEMPLATE),
            supervisor_template: get(vars::SUPERVISOR_TEMPLATE),
            credentials_path: get(vars::CREDENTIALS)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE)),
            scopes,
            target_tab: get(vars::TARGET_TAB).unwrap_or_else(|| DEFAULT_TARGET_TAB.to_string()),
            target_cell: get(vars::TARGET_CELL).unwrap_or_else(|| DEFAULT_TARGET_CELL.to_string()),
            http_timeout,
        })
    }

    /// Check the settings every command needs
    pub fn validate(&self) -> Result<()> {
        if self.mapping_tab.is_empty() {
            bail!(
                "No mapping tab configured. Set {} or pass --mapping-tab",
                vars::MAPPING_SHEET
            );
        }
        if self.scopes.is_empty() {
            bail!("{} is set but lists no scopes", vars::SCOPES);
        }
        Ok(())
    }

    /// The (employee, supervisor) template IDs, required before anything is copied
    pub fn templates(&self) -> Result<(String, String)> {
        let employee = self
            .employee_template
            .clone()
            .with_context(|| format!("{} is not set", vars::EMPLOYEE_TEMPLATE))?;
        let supervisor = self
            .supervisor_template
            .clone()
            .with_context(|| format!("{} is not set", vars::SUPERVISOR_TEMPLATE))?;
        Ok((employee, supervisor))
    }
}
