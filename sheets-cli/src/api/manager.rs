//! Title-oriented facade over a `SheetsApi`
//!
//! Spreadsheets are addressed by their human title here: lookups return
//! `Ok(None)` when nothing matches, and the create/duplicate operations reuse
//! an existing spreadsheet of the same title instead of making another one.
//! Every call logs its outcome.

use log::{debug, error, info, warn};

use super::a1;
use super::client::SheetsApi;
use super::error::ApiError;
use super::models::{Provisioned, Record, Role, Spreadsheet, SpreadsheetRef, Worksheet};

pub struct SheetManager<A: SheetsApi> {
    api: A,
}

impl<A: SheetsApi> SheetManager<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Find a spreadsheet by exact title. `Ok(None)` means no spreadsheet has that title.
    pub async fn get_sheet_by_name(&self, title: &str) -> Result<Option<SpreadsheetRef>, ApiError> {
        let matches = self.api.find_spreadsheets_by_title(title).await.map_err(|e| {
            error!("Error retrieving sheet by name '{}': {}", title, e);
            e
        })?;

        if matches.len() > 1 {
            warn!(
                "{} spreadsheets are titled '{}', using {}",
                matches.len(),
                title,
                matches[0].id
            );
        }

        let found = matches.into_iter().next();
        if found.is_none() {
            debug!("No spreadsheet titled '{}'", title);
        }
        Ok(found)
    }

    /// Create a blank spreadsheet, or return the existing one with this title
    pub async fn create_sheet(&self, title: &str) -> Result<(SpreadsheetRef, Provisioned), ApiError> {
        if let Some(existing) = self.get_sheet_by_name(title).await? {
            info!("Spreadsheet with title '{}' already exists", title);
            return Ok((existing, Provisioned::Existing));
        }

        match self.api.create_spreadsheet(title).await {
            Ok(sheet) => {
                info!("Created new sheet: {}", title);
                Ok((sheet, Provisioned::Created))
            }
            Err(e) => {
                error!("Error creating sheet '{}': {}", title, e);
                Err(e)
            }
        }
    }

    /// Copy `template_id` under `title`, or reuse the spreadsheet already titled `title`.
    ///
    /// Only `Provisioned::Created` results are new; callers use that to decide
    /// whether the copy still needs to be shared.
    pub async fn duplicate_sheet(
        &self,
        template_id: &str,
        title: &str,
    ) -> Result<(SpreadsheetRef, Provisioned), ApiError> {
        if let Some(existing) = self.get_sheet_by_name(title).await? {
            info!("Sheet with name '{}' already exists", title);
            return Ok((existing, Provisioned::Existing));
        }

        match self.api.copy_file(template_id, title).await {
            Ok(copy) => {
                info!("Duplicated sheet '{}' as '{}' ({})", template_id, title, copy.id);
                Ok((copy, Provisioned::Created))
            }
            Err(e) => {
                error!("Error duplicating sheet '{}' as '{}': {}", template_id, title, e);
                Err(e)
            }
        }
    }

    pub async fn get_sheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, ApiError> {
        self.api.get_spreadsheet(spreadsheet_id).await.map_err(|e| {
            error!("Error retrieving sheet by ID '{}': {}", spreadsheet_id, e);
            e
        })
    }

    /// Resolve a spreadsheet by title and one of its tabs by name
    pub async fn get_sheet_and_tab_by_name(
        &self,
        sheet_name: &str,
        tab_name: &str,
    ) -> Result<(Spreadsheet, Worksheet), ApiError> {
        let Some(sheet_ref) = self.get_sheet_by_name(sheet_name).await? else {
            error!("Spreadsheet '{}' not found", sheet_name);
            return Err(ApiError::NotFound(format!("spreadsheet '{}'", sheet_name)));
        };

        let sheet = self.get_sheet(&sheet_ref.id).await?;
        match sheet.worksheet(tab_name).cloned() {
            Some(tab) => {
                info!("Found tab '{}' in sheet '{}'", tab_name, sheet_name);
                Ok((sheet, tab))
            }
            None => {
                error!("Tab '{}' not found in sheet '{}'", tab_name, sheet_name);
                Err(ApiError::NotFound(format!(
                    "tab '{}' in spreadsheet '{}'",
                    tab_name, sheet_name
                )))
            }
        }
    }

    /// Read a whole tab as header-keyed records
    pub async fn get_all_records(
        &self,
        spreadsheet_id: &str,
        tab_name: &str,
    ) -> Result<Vec<Record>, ApiError> {
        let range = a1::tab_range(tab_name, "");
        let rows = self.api.get_values(spreadsheet_id, &range).await.map_err(|e| {
            error!("Error reading {} of sheet {}: {}", range, spreadsheet_id, e);
            e
        })?;

        let records = rows_to_records(rows);
        debug!("Read {} records from {}", records.len(), range);
        Ok(records)
    }

    /// Write rows of values starting at `cell` on the named tab
    pub async fn update_cell_in_tab(
        &self,
        spreadsheet_id: &str,
        tab_name: &str,
        cell: &str,
        values: &[Vec<String>],
    ) -> Result<(), ApiError> {
        let range = a1::tab_range(tab_name, cell);
        match self.api.update_values(spreadsheet_id, &range, values).await {
            Ok(()) => {
                info!(
                    "Updated cell {} in tab {} of sheet {}",
                    cell, tab_name, spreadsheet_id
                );
                Ok(())
            }
            Err(e) => {
                error!("Error updating cell {} in tab {}: {}", cell, tab_name, e);
                Err(e)
            }
        }
    }

    /// Write rows of values into `range` on the first tab
    pub async fn update_sheet(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), ApiError> {
        let sheet = self.get_sheet(spreadsheet_id).await?;
        let Some(first) = sheet.first_worksheet() else {
            error!("Sheet {} has no tabs", spreadsheet_id);
            return Err(ApiError::NotFound(format!(
                "first tab of spreadsheet {}",
                spreadsheet_id
            )));
        };

        let target = a1::tab_range(&first.title, range);
        match self.api.update_values(spreadsheet_id, &target, values).await {
            Ok(()) => {
                info!("Updated sheet {} in range {}", spreadsheet_id, range);
                Ok(())
            }
            Err(e) => {
                error!("Error updating sheet {}: {}", spreadsheet_id, e);
                Err(e)
            }
        }
    }

    /// Set a single cell on the first tab
    pub async fn update_cell(
        &self,
        spreadsheet_id: &str,
        cell: &str,
        value: &str,
    ) -> Result<(), ApiError> {
        self.update_sheet(spreadsheet_id, cell, &[vec![value.to_string()]])
            .await
    }

    pub async fn share_sheet(
        &self,
        spreadsheet_id: &str,
        email: &str,
        role: Role,
    ) -> Result<(), ApiError> {
        match self.api.create_permission(spreadsheet_id, email, role).await {
            Ok(permission_id) => {
                info!(
                    "Shared sheet {} with {} as {} ({})",
                    spreadsheet_id, email, role, permission_id
                );
                Ok(())
            }
            Err(e) => {
                error!("Error sharing sheet {} with {}: {}", spreadsheet_id, email, e);
                Err(e)
            }
        }
    }
}

/// Treat the first row as headers and map every later row onto them.
///
/// Short rows are padded with empty strings, cells beyond the header are
/// dropped, and rows with no content at all are skipped.
pub fn rows_to_records(rows: Vec<Vec<String>>) -> Vec<Record> {
    let mut rows = rows.into_iter();
    let Some(headers) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();

    rows.filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}
