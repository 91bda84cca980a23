//! Employee and supervisor spreadsheet provisioning
//!
//! A run is two independent sequential passes: one spreadsheet per employee
//! record, then one per supervisor group. Each party is handled on its own;
//! an API failure is logged, recorded in the report, and the loop moves on.

mod report;

pub use report::{Counts, Failure, PartyKind, PartyResult, ProvisionReport, Stage};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::api::{ApiError, Record, Role, SheetManager, SheetsApi};
use crate::config::Config;
use crate::mapping::{EmployeeRecord, SupervisorGroup, group_by_supervisor, split_employee_data};

/// Templates and write target for a run
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub employee_template: String,
    pub supervisor_template: String,
    pub target_tab: String,
    pub target_cell: String,
    pub share_role: Role,
}

impl ProvisionSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let (employee_template, supervisor_template) = config.templates()?;
        Ok(Self {
            employee_template,
            supervisor_template,
            target_tab: config.target_tab.clone(),
            target_cell: config.target_cell.clone(),
            share_role: Role::Writer,
        })
    }
}

/// Parsed employees and their supervisor groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub employees: Vec<EmployeeRecord>,
    pub groups: Vec<SupervisorGroup>,
}

impl Plan {
    pub fn from_records(records: &[Record], reports_column: &str) -> Result<Self> {
        let employees = split_employee_data(records, reports_column)
            .context("Failed to parse the mapping sheet")?;
        let groups = group_by_supervisor(&employees);
        Ok(Self { employees, groups })
    }
}

/// Read the configured mapping tab into header-keyed records
pub async fn load_mapping<A: SheetsApi>(manager: &SheetManager<A>, config: &Config) -> Result<Vec<Record>> {
    let (sheet, tab) = manager
        .get_sheet_and_tab_by_name(&config.mapping_spreadsheet, &config.mapping_tab)
        .await
        .with_context(|| {
            format!(
                "Failed to open mapping tab '{}' of '{}'",
                config.mapping_tab, config.mapping_spreadsheet
            )
        })?;

    let records = manager
        .get_all_records(&sheet.id, &tab.title)
        .await
        .context("Failed to read mapping records")?;

    info!(
        "Loaded {} mapping rows from '{}'/'{}'",
        records.len(),
        sheet.title,
        tab.title
    );
    Ok(records)
}

pub struct Provisioner<'a, A: SheetsApi> {
    manager: &'a SheetManager<A>,
    settings: &'a ProvisionSettings,
}

impl<'a, A: SheetsApi> Provisioner<'a, A> {
    pub fn new(manager: &'a SheetManager<A>, settings: &'a ProvisionSettings) -> Self {
        Self { manager, settings }
    }

    /// Run both passes over a plan
    pub async fn run(&self, plan: &Plan) -> ProvisionReport {
        let employees = self.provision_employees(&plan.employees).await;
        let supervisors = self.provision_supervisors(&plan.groups).await;
        ProvisionReport {
            employees,
            supervisors,
        }
    }

    pub async fn provision_employees(&self, employees: &[EmployeeRecord]) -> Vec<PartyResult> {
        let mut results = Vec::with_capacity(employees.len());
        for employee in employees {
            results.push(self.provision_employee(employee).await);
        }
        results
    }

    pub async fn provision_supervisors(&self, groups: &[SupervisorGroup]) -> Vec<PartyResult> {
        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            results.push(self.provision_supervisor(group).await);
        }
        results
    }

    /// Employee copy: `[[employee email]]` at the target cell, shared with the employee
    pub async fn provision_employee(&self, employee: &EmployeeRecord) -> PartyResult {
        info!(
            "Processing: {} ({})",
            employee.employee_name, employee.employee_email
        );
        let result = PartyResult::new(
            PartyKind::Employee,
            &employee.employee_name,
            &employee.employee_email,
        );
        let values = vec![vec![employee.employee_email.clone()]];
        self.provision(result, &self.settings.employee_template, values)
            .await
    }

    /// Supervisor copy: every report's email in one row at the target cell,
    /// shared with the supervisor
    pub async fn provision_supervisor(&self, group: &SupervisorGroup) -> PartyResult {
        info!(
            "Processing Supervisor: {} ({})",
            group.key.name, group.key.email
        );
        let result = PartyResult::new(PartyKind::Supervisor, group.sheet_title(), &group.key.email);
        let values = vec![group.emails()];
        self.provision(result, &self.settings.supervisor_template, values)
            .await
    }

    /// Duplicate-or-reuse, write, and share only if the copy is new
    async fn provision(
        &self,
        mut result: PartyResult,
        template_id: &str,
        values: Vec<Vec<String>>,
    ) -> PartyResult {
        let (sheet, provisioned) = match self.manager.duplicate_sheet(template_id, &result.title).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Skipping '{}': {}", result.title, e);
                result.failures.push(Failure::new(Stage::Duplicate, &e));
                return result;
            }
        };
        result.spreadsheet_id = Some(sheet.id.clone());
        result.provisioned = Some(provisioned);

        if let Err(e) = self
            .manager
            .update_cell_in_tab(
                &sheet.id,
                &self.settings.target_tab,
                &self.settings.target_cell,
                &values,
            )
            .await
        {
            result.failures.push(Failure::new(Stage::Update, &e));
        }

        if provisioned.is_created() {
            if result.email.trim().is_empty() {
                warn!("'{}' has no email address to share with", result.title);
                let missing = ApiError::InvalidRequest("no email address to share with".to_string());
                result.failures.push(Failure::new(Stage::Share, &missing));
            } else {
                match self
                    .manager
                    .share_sheet(&sheet.id, &result.email, self.settings.share_role)
                    .await
                {
                    Ok(()) => result.shared = true,
                    Err(e) => result.failures.push(Failure::new(Stage::Share, &e)),
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Provisioned;
    use crate::api::memory::MemoryApi;
    use crate::mapping::{DIRECT_REPORTS_COLUMN, SUPERVISOR_EMAIL_COLUMN, SUPERVISOR_NAME_COLUMN};

    struct Fixture {
        manager: SheetManager<MemoryApi>,
        settings: ProvisionSettings,
    }

    fn fixture() -> Fixture {
        let api = MemoryApi::new();
        let employee_template = api.add_spreadsheet("Employee Template", &["Orders"]);
        let supervisor_template = api.add_spreadsheet("Supervisor Template", &["Summary", "Orders"]);
        Fixture {
            manager: SheetManager::new(api),
            settings: ProvisionSettings {
                employee_template,
                supervisor_template,
                target_tab: "Orders".to_string(),
                target_cell: "B1".to_string(),
                share_role: Role::Writer,
            },
        }
    }

    fn record(reports: &str, name: &str, email: &str) -> Record {
        [
            (DIRECT_REPORTS_COLUMN, reports),
            (SUPERVISOR_NAME_COLUMN, name),
            (SUPERVISOR_EMAIL_COLUMN, email),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn plan(records: &[Record]) -> Plan {
        Plan::from_records(records, DIRECT_REPORTS_COLUMN).unwrap()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_single_row() {
        let fx = fixture();
        let plan = plan(&[record("Alice (a@x.com)", "Sup", "sup@x.com")]);

        let report = Provisioner::new(&fx.manager, &fx.settings).run(&plan).await;
        let api = fx.manager.api();

        assert!(!report.has_failures());

        let alice = api.titled("Alice");
        assert_eq!(alice.len(), 1);
        let alice_writes = api.writes_to("Alice");
        assert_eq!(alice_writes.len(), 1);
        assert_eq!(alice_writes[0].range, "'Orders'!B1");
        assert_eq!(alice_writes[0].values, vec![row(&["a@x.com"])]);

        let sup = api.titled("Sup");
        assert_eq!(sup.len(), 1);
        let sup_writes = api.writes_to("Sup");
        assert_eq!(sup_writes[0].range, "'Orders'!B1");
        assert_eq!(sup_writes[0].values, vec![row(&["a@x.com"])]);

        let shares = api.shares();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].file_id, alice[0].id);
        assert_eq!(shares[0].email, "a@x.com");
        assert_eq!(shares[0].role, Role::Writer);
        assert_eq!(shares[1].file_id, sup[0].id);
        assert_eq!(shares[1].email, "sup@x.com");
        assert_eq!(shares[1].role, Role::Writer);

        let copies = api.copies();
        assert_eq!(copies[0].source_id, fx.settings.employee_template);
        assert_eq!(copies[1].source_id, fx.settings.supervisor_template);
    }

    #[tokio::test]
    async fn test_supervisor_row_lists_all_reports() {
        let fx = fixture();
        let plan = plan(&[
            record("Alice (a@x.com), Bob (b@x.com)", "Sup", "sup@x.com"),
            record("Carol (c@x.com)", "Sup", "sup@x.com"),
        ]);

        let report = Provisioner::new(&fx.manager, &fx.settings).run(&plan).await;

        assert_eq!(report.employees.len(), 3);
        assert_eq!(report.supervisors.len(), 1);
        let writes = fx.manager.api().writes_to("Sup");
        assert_eq!(writes[0].values, vec![row(&["a@x.com", "b@x.com", "c@x.com"])]);
    }

    #[tokio::test]
    async fn test_rerun_reuses_and_does_not_reshare() {
        let fx = fixture();
        let plan = plan(&[record("Alice (a@x.com)", "Sup", "sup@x.com")]);
        let provisioner = Provisioner::new(&fx.manager, &fx.settings);

        provisioner.run(&plan).await;
        let report = provisioner.run(&plan).await;
        let api = fx.manager.api();

        assert_eq!(api.copies().len(), 2);
        assert_eq!(api.shares().len(), 2);
        assert_eq!(api.titled("Alice").len(), 1);
        assert_eq!(api.titled("Sup").len(), 1);
        // values are rewritten on every run
        assert_eq!(api.writes().len(), 4);

        assert_eq!(report.employee_counts().reused, 1);
        assert_eq!(report.supervisor_counts().reused, 1);
        assert!(report.employees.iter().all(|r| !r.shared));
    }

    #[tokio::test]
    async fn test_share_only_on_create() {
        let fx = fixture();
        fx.manager.api().add_spreadsheet("Alice", &["Orders"]);
        let plan = plan(&[record("Alice (a@x.com), Bob (b@x.com)", "Sup", "sup@x.com")]);

        let provisioner = Provisioner::new(&fx.manager, &fx.settings);
        let results = provisioner.provision_employees(&plan.employees).await;

        assert_eq!(results[0].provisioned, Some(Provisioned::Existing));
        assert!(!results[0].shared);
        assert_eq!(results[1].provisioned, Some(Provisioned::Created));
        assert!(results[1].shared);

        let shares = fx.manager.api().shares();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].email, "b@x.com");
    }

    #[tokio::test]
    async fn test_missing_supervisor_name_uses_email_title() {
        let fx = fixture();
        let plan = plan(&[record("Alice (a@x.com)", "", "sup@x.com")]);

        let results = Provisioner::new(&fx.manager, &fx.settings)
            .provision_supervisors(&plan.groups)
            .await;

        assert_eq!(results[0].title, "sup@x.com");
        assert_eq!(fx.manager.api().titled("sup@x.com").len(), 1);
        assert_eq!(fx.manager.api().shares()[0].email, "sup@x.com");
    }

    #[tokio::test]
    async fn test_failure_does_not_block_others() {
        let fx = fixture();
        fx.manager.api().fail_copies_titled("Alice");
        let plan = plan(&[record("Alice (a@x.com), Bob (b@x.com)", "Sup", "sup@x.com")]);

        let report = Provisioner::new(&fx.manager, &fx.settings).run(&plan).await;
        let api = fx.manager.api();

        assert_eq!(report.employees[0].failures[0].stage, Stage::Duplicate);
        assert_eq!(report.employees[0].failures[0].kind, "permission-denied");
        assert!(report.employees[0].spreadsheet_id.is_none());
        assert!(api.writes_to("Alice").is_empty());

        assert!(report.employees[1].is_ok());
        assert_eq!(api.titled("Bob").len(), 1);
        assert_eq!(api.titled("Sup").len(), 1);
        assert_eq!(report.employee_counts().failed, 1);
    }

    #[tokio::test]
    async fn test_update_failure_still_shares_new_copy() {
        let mut fx = fixture();
        fx.settings.target_tab = "Missing".to_string();
        let plan = plan(&[record("Alice (a@x.com)", "Sup", "sup@x.com")]);

        let result = Provisioner::new(&fx.manager, &fx.settings)
            .provision_employee(&plan.employees[0])
            .await;

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].stage, Stage::Update);
        assert!(result.shared);
    }

    #[tokio::test]
    async fn test_share_failure_recorded() {
        let fx = fixture();
        fx.manager.api().fail_shares_with("a@x.com");
        let plan = plan(&[record("Alice (a@x.com)", "Sup", "sup@x.com")]);

        let report = Provisioner::new(&fx.manager, &fx.settings).run(&plan).await;

        assert_eq!(report.employees[0].failures[0].stage, Stage::Share);
        assert!(!report.employees[0].shared);
        assert!(report.supervisors[0].shared);
    }

    #[tokio::test]
    async fn test_new_copy_without_email_is_a_share_failure() {
        let fx = fixture();
        let plan = plan(&[record("Alice ()", "Sup", "sup@x.com")]);
        assert_eq!(plan.employees[0].employee_email, "");

        let report = Provisioner::new(&fx.manager, &fx.settings).run(&plan).await;
        let alice = &report.employees[0];

        assert_eq!(alice.provisioned, Some(Provisioned::Created));
        assert!(!alice.shared);
        assert_eq!(alice.failures.len(), 1);
        assert_eq!(alice.failures[0].stage, Stage::Share);
        assert_eq!(alice.failures[0].kind, "invalid-request");
        assert!(!alice.failures[0].transient);
        assert!(report.has_failures());
        assert_eq!(report.employee_counts().failed, 1);

        // only the supervisor copy was shared
        let shares = fx.manager.api().shares();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].email, "sup@x.com");
    }

    #[tokio::test]
    async fn test_load_mapping() {
        let fx = fixture();
        let api = fx.manager.api();
        let id = api.add_spreadsheet("GH Sample Data", &["Mapping"]);
        api.set_values(
            &id,
            "Mapping",
            vec![
                row(&["Direct Reports", "Supervisor Name", "Supervisor Email"]),
                row(&["Alice (a@x.com)", "Sup", "sup@x.com"]),
            ],
        );

        let config = Config::from_lookup(|key| match key {
            "MAPPING_SHEET" => Some("Mapping".to_string()),
            _ => None,
        })
        .unwrap();

        let records = load_mapping(&fx.manager, &config).await.unwrap();
        let plan = Plan::from_records(&records, &config.reports_column).unwrap();
        assert_eq!(plan.employees.len(), 1);
        assert_eq!(plan.groups.len(), 1);
    }

    #[tokio::test]
    async fn test_load_mapping_missing_tab_is_fatal() {
        let fx = fixture();
        fx.manager.api().add_spreadsheet("GH Sample Data", &["Other"]);
        let config = Config::from_lookup(|key| match key {
            "MAPPING_SHEET" => Some("Mapping".to_string()),
            _ => None,
        })
        .unwrap();

        let err = load_mapping(&fx.manager, &config).await.unwrap_err();
        assert!(err.to_string().contains("Mapping"));
    }

    #[test]
    fn test_plan_parse_error() {
        let err = Plan::from_records(&[record("Alice a@x.com", "Sup", "sup@x.com")], DIRECT_REPORTS_COLUMN)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Alice a@x.com"));
    }
}
