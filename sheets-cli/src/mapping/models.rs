//! Records derived from the mapping sheet

use serde::Serialize;

/// One row of the mapping sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub direct_reports: String,
    pub supervisor_name: String,
    pub supervisor_email: String,
}

/// One direct report, carrying the supervisor fields of the row it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmployeeRecord {
    pub employee_name: String,
    pub employee_email: String,
    pub supervisor_name: String,
    pub supervisor_email: String,
}

impl EmployeeRecord {
    pub fn supervisor_key(&self) -> SupervisorKey {
        SupervisorKey {
            name: self.supervisor_name.clone(),
            email: self.supervisor_email.clone(),
        }
    }
}

/// Grouping key: (supervisor name, supervisor email)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SupervisorKey {
    pub name: String,
    pub email: String,
}

/// All employees reporting to one supervisor key, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorGroup {
    pub key: SupervisorKey,
    pub employees: Vec<EmployeeRecord>,
}

impl SupervisorGroup {
    pub fn emails(&self) -> Vec<String> {
        self.employees
            .iter()
            .map(|e| e.employee_email.clone())
            .collect()
    }

    /// Spreadsheet title for this supervisor: the name, or the email when the name is blank
    pub fn sheet_title(&self) -> &str {
        if self.key.name.trim().is_empty() {
            &self.key.email
        } else {
            &self.key.name
        }
    }
}
