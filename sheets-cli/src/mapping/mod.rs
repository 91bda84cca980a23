//! Mapping sheet parsing and supervisor grouping

mod group;
mod models;
mod parse;

pub use group::group_by_supervisor;
pub use models::{EmployeeRecord, MappingRow, SupervisorGroup, SupervisorKey};
pub use parse::{ParseError, split_employee_data, split_pairs};

/// Column holding the `"Name (email), ..."` list
pub const DIRECT_REPORTS_COLUMN: &str = "Direct Reports";
pub const SUPERVISOR_NAME_COLUMN: &str = "Supervisor Name";
pub const SUPERVISOR_EMAIL_COLUMN: &str = "Supervisor Email";
