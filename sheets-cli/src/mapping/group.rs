//! Grouping of employee records by supervisor

use std::collections::BTreeMap;

use super::models::{EmployeeRecord, SupervisorGroup, SupervisorKey};

/// Partition employees by (supervisor name, supervisor email).
///
/// Groups come back ordered by key; employees keep their input order within
/// a group.
pub fn group_by_supervisor(employees: &[EmployeeRecord]) -> Vec<SupervisorGroup> {
    let mut groups: BTreeMap<SupervisorKey, Vec<EmployeeRecord>> = BTreeMap::new();

    for employee in employees {
        groups
            .entry(employee.supervisor_key())
            .or_default()
            .push(employee.clone());
    }

    groups
        .into_iter()
        .map(|(key, employees)| SupervisorGroup { key, employees })
        .collect()
}
