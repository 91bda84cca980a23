//! Per-party outcomes collected during a provisioning run

use serde::Serialize;
use std::fmt;

use crate::api::{ApiError, Provisioned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Employee,
    Supervisor,
}

/// The step of the workflow a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Duplicate,
    Update,
    Share,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Duplicate => write!(f, "duplicate"),
            Stage::Update => write!(f, "update"),
            Stage::Share => write!(f, "share"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub stage: Stage,
    /// `ApiError::kind()` of the underlying error
    pub kind: &'static str,
    pub transient: bool,
    pub message: String,
}

impl Failure {
    pub fn new(stage: Stage, error: &ApiError) -> Self {
        Self {
            stage,
            kind: error.kind(),
            transient: error.is_transient(),
            message: error.to_string(),
        }
    }
}

/// What happened to one employee or supervisor spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyResult {
    pub kind: PartyKind,
    /// Spreadsheet title (employee name, supervisor name or email)
    pub title: String,
    /// Address the spreadsheet is shared with
    pub email: String,
    pub spreadsheet_id: Option<String>,
    pub provisioned: Option<Provisioned>,
    pub shared: bool,
    pub failures: Vec<Failure>,
}

impl PartyResult {
    pub fn new(kind: PartyKind, title: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            email: email.into(),
            spreadsheet_id: None,
            provisioned: None,
            shared: false,
            failures: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub created: usize,
    pub reused: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub employees: Vec<PartyResult>,
    pub supervisors: Vec<PartyResult>,
}

impl ProvisionReport {
    pub fn employee_counts(&self) -> Counts {
        counts(&self.employees)
    }

    pub fn supervisor_counts(&self) -> Counts {
        counts(&self.supervisors)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PartyResult> {
        self.employees
            .iter()
            .chain(self.supervisors.iter())
            .filter(|r| !r.is_ok())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

fn counts(results: &[PartyResult]) -> Counts {
    let mut counts = Counts::default();
    for result in results {
        match result.provisioned {
            Some(Provisioned::Created) => counts.created += 1,
            Some(Provisioned::Existing) => counts.reused += 1,
            None => {}
        }
        if !result.is_ok() {
            counts.failed += 1;
        }
    }
    counts
}
