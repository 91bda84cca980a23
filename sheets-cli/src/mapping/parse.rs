//! Splits `"Name (email), Name (email)"` lists into employee records

use log::debug;
use thiserror::Error;

use super::models::{EmployeeRecord, MappingRow};
use super::{SUPERVISOR_EMAIL_COLUMN, SUPERVISOR_NAME_COLUMN};
use crate::api::Record;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Record {record}: missing column '{column}'")]
    MissingColumn { record: usize, column: String },

    #[error("Record {record}: '{segment}' is not of the form 'Name (email)'")]
    MissingEmail { record: usize, segment: String },
}

impl MappingRow {
    /// Pull the report list and supervisor fields out of a header-keyed record.
    /// `index` is the 1-based record position used in error messages.
    pub fn from_record(record: &Record, reports_column: &str, index: usize) -> Result<Self, ParseError> {
        let get = |column: &str| {
            record
                .get(column)
                .cloned()
                .ok_or_else(|| ParseError::MissingColumn {
                    record: index,
                    column: column.to_string(),
                })
        };

        Ok(MappingRow {
            direct_reports: get(reports_column)?,
            supervisor_name: get(SUPERVISOR_NAME_COLUMN)?,
            supervisor_email: get(SUPERVISOR_EMAIL_COLUMN)?,
        })
    }

    /// One employee record per `Name (email)` pair in `direct_reports`
    pub fn employees(&self, index: usize) -> Result<Vec<EmployeeRecord>, ParseError> {
        Ok(split_pairs(&self.direct_reports, index)?
            .into_iter()
            .map(|(name, email)| EmployeeRecord {
                employee_name: name,
                employee_email: email,
                supervisor_name: self.supervisor_name.clone(),
                supervisor_email: self.supervisor_email.clone(),
            })
            .collect())
    }
}

/// Split a comma-separated list of `Name (email)` pairs.
///
/// Each pair is split on its first `(`; the name is trimmed and the email
/// loses its trailing `)` and surrounding whitespace. Blank segments (e.g.
/// from a trailing comma) are skipped. A non-blank segment without `(` is an
/// error.
pub fn split_pairs(text: &str, index: usize) -> Result<Vec<(String, String)>, ParseError> {
    let mut pairs = Vec::new();

    for segment in text.split(',') {
        if segment.trim().is_empty() {
            debug!("Record {}: skipping blank segment", index);
            continue;
        }

        let Some((name, email)) = segment.split_once('(') else {
            return Err(ParseError::MissingEmail {
                record: index,
                segment: segment.trim().to_string(),
            });
        };

        let email = email.trim();
        let email = email.strip_suffix(')').unwrap_or(email).trim();
        pairs.push((name.trim().to_string(), email.to_string()));
    }

    Ok(pairs)
}

/// Expand every mapping record into employee records, preserving row then pair order
pub fn split_employee_data(
    records: &[Record],
    column_name: &str,
) -> Result<Vec<EmployeeRecord>, ParseError> {
    let mut employees = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let index = i + 1;
        let row = MappingRow::from_record(record, column_name, index)?;
        employees.extend(row.employees(index)?);
    }

    Ok(employees)
}
