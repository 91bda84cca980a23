//! In-memory `SheetsApi` used by the test suites

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::client::SheetsApi;
use super::error::ApiError;
use super::models::{Role, Spreadsheet, SpreadsheetRef, Worksheet};

#[derive(Debug, Clone)]
struct StoredSheet {
    id: String,
    title: String,
    tabs: Vec<String>,
    values: HashMap<String, Vec<Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyCall {
    pub source_id: String,
    pub title: String,
    pub new_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCall {
    pub spreadsheet_id: String,
    pub range: String,
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCall {
    pub file_id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Default)]
struct State {
    sheets: Vec<StoredSheet>,
    copies: Vec<CopyCall>,
    writes: Vec<WriteCall>,
    shares: Vec<ShareCall>,
    fail_copy_titles: HashSet<String>,
    fail_share_emails: HashSet<String>,
    next_id: u64,
}

impl State {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("sheet-{}", self.next_id)
    }

    fn sheet(&self, id: &str) -> Result<&StoredSheet, ApiError> {
        self.sheets
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("File not found: {}", id)))
    }

    fn sheet_mut(&mut self, id: &str) -> Result<&mut StoredSheet, ApiError> {
        self.sheets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("File not found: {}", id)))
    }
}

/// Records every mutating call so tests can assert on side effects
#[derive(Debug, Default)]
pub struct MemoryApi {
    state: Mutex<State>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a spreadsheet with the given tabs, returning its ID
    pub fn add_spreadsheet(&self, title: &str, tabs: &[&str]) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.allocate_id();
        state.sheets.push(StoredSheet {
            id: id.clone(),
            title: title.to_string(),
            tabs: tabs.iter().map(|t| t.to_string()).collect(),
            values: HashMap::new(),
        });
        id
    }

    pub fn set_values(&self, spreadsheet_id: &str, tab: &str, rows: Vec<Vec<String>>) {
        let mut state = self.state.lock().unwrap();
        let sheet = state.sheet_mut(spreadsheet_id).unwrap();
        sheet.values.insert(tab.to_string(), rows);
    }

    /// Make every copy targeting `title` fail with permission denied
    pub fn fail_copies_titled(&self, title: &str) {
        self.state.lock().unwrap().fail_copy_titles.insert(title.to_string());
    }

    /// Make every share with `email` fail with permission denied
    pub fn fail_shares_with(&self, email: &str) {
        self.state.lock().unwrap().fail_share_emails.insert(email.to_string());
    }

    pub fn titled(&self, title: &str) -> Vec<SpreadsheetRef> {
        self.state
            .lock()
            .unwrap()
            .sheets
            .iter()
            .filter(|s| s.title == title)
            .map(|s| SpreadsheetRef::new(s.id.clone(), s.title.clone()))
            .collect()
    }

    pub fn copies(&self) -> Vec<CopyCall> {
        self.state.lock().unwrap().copies.clone()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn shares(&self) -> Vec<ShareCall> {
        self.state.lock().unwrap().shares.clone()
    }

    /// Writes made to the spreadsheet with this title
    pub fn writes_to(&self, title: &str) -> Vec<WriteCall> {
        let ids: Vec<String> = self.titled(title).into_iter().map(|s| s.id).collect();
        self.writes()
            .into_iter()
            .filter(|w| ids.contains(&w.spreadsheet_id))
            .collect()
    }
}

/// Extract the tab name from `'Tab'!A1`, `'Tab'` or `Tab!A1`
fn tab_of(range: &str) -> String {
    let tab = match range.rfind('!') {
        Some(i) => &range[..i],
        None => range,
    };
    tab.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .map(|t| t.replace("''", "'"))
        .unwrap_or_else(|| tab.to_string())
}

fn unparsable(range: &str) -> ApiError {
    ApiError::InvalidRequest(format!("400 Bad Request: Unable to parse range: {}", range))
}

#[async_trait]
impl SheetsApi for MemoryApi {
    async fn find_spreadsheets_by_title(&self, title: &str) -> Result<Vec<SpreadsheetRef>, ApiError> {
        Ok(self.titled(title))
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetRef, ApiError> {
        let id = self.add_spreadsheet(title, &["Sheet1"]);
        Ok(SpreadsheetRef::new(id, title))
    }

    async fn copy_file(&self, source_id: &str, title: &str) -> Result<SpreadsheetRef, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_copy_titles.contains(title) {
            return Err(ApiError::PermissionDenied(format!(
                "403 Forbidden: copy of '{}' rejected",
                title
            )));
        }

        let source = state.sheet(source_id)?.clone();
        let new_id = state.allocate_id();
        state.sheets.push(StoredSheet {
            id: new_id.clone(),
            title: title.to_string(),
            tabs: source.tabs,
            values: source.values,
        });
        state.copies.push(CopyCall {
            source_id: source_id.to_string(),
            title: title.to_string(),
            new_id: new_id.clone(),
        });
        Ok(SpreadsheetRef::new(new_id, title))
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, ApiError> {
        let state = self.state.lock().unwrap();
        let sheet = state.sheet(spreadsheet_id)?;
        Ok(Spreadsheet {
            id: sheet.id.clone(),
            title: sheet.title.clone(),
            worksheets: sheet
                .tabs
                .iter()
                .enumerate()
                .map(|(i, t)| Worksheet {
                    id: i as i64,
                    title: t.clone(),
                    index: i as i64,
                })
                .collect(),
        })
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, ApiError> {
        let state = self.state.lock().unwrap();
        let sheet = state.sheet(spreadsheet_id)?;
        let tab = tab_of(range);
        if !sheet.tabs.contains(&tab) {
            return Err(unparsable(range));
        }
        Ok(sheet.values.get(&tab).cloned().unwrap_or_default())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let sheet = state.sheet(spreadsheet_id)?;
        if !sheet.tabs.contains(&tab_of(range)) {
            return Err(unparsable(range));
        }
        state.writes.push(WriteCall {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            values: values.to_vec(),
        });
        Ok(())
    }

    async fn create_permission(&self, file_id: &str, email: &str, role: Role) -> Result<String, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.sheet(file_id)?;
        if state.fail_share_emails.contains(email) {
            return Err(ApiError::PermissionDenied(format!(
                "403 Forbidden: cannot share with {}",
                email
            )));
        }
        state.shares.push(ShareCall {
            file_id: file_id.to_string(),
            email: email.to_string(),
            role,
        });
        Ok(format!("perm-{}", state.shares.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_of() {
        assert_eq!(tab_of("'Orders'!B1"), "Orders");
        assert_eq!(tab_of("'Bob''s Tab'"), "Bob's Tab");
        assert_eq!(tab_of("Orders!A1:B2"), "Orders");
    }
}
