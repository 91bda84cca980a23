//! HTTP client for the Google Sheets v4 and Drive v3 APIs

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use super::a1;
use super::auth::AuthManager;
use super::constants::{DRIVE_BASE_URL, DRIVE_PAGE_SIZE, SHEETS_BASE_URL};
use super::error::ApiError;
use super::models::{
    DriveFile, DriveFileList, Role, Spreadsheet, SpreadsheetRef, SpreadsheetResource, ValueRange,
};

/// Raw spreadsheet operations against a remote store.
///
/// `SheetManager` builds the title-based lookup, create-or-get and
/// duplicate-or-reuse behaviour on top of these primitives.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// All non-trashed spreadsheets whose title equals `title` exactly
    async fn find_spreadsheets_by_title(&self, title: &str) -> Result<Vec<SpreadsheetRef>, ApiError>;

    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetRef, ApiError>;

    /// Copy an existing file under a new title
    async fn copy_file(&self, source_id: &str, title: &str) -> Result<SpreadsheetRef, ApiError>;

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, ApiError>;

    /// Read a range as rows of display strings
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, ApiError>;

    /// Overwrite a range with rows of raw values
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), ApiError>;

    /// Grant `role` on a file to a user, returning the permission ID
    async fn create_permission(&self, file_id: &str, email: &str, role: Role) -> Result<String, ApiError>;
}

/// Authenticated client bound to one service account
pub struct GoogleClient {
    http: Client,
    auth: AuthManager,
    sheets_base_url: String,
    drive_base_url: String,
}

impl GoogleClient {
    pub fn new(auth: AuthManager, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            auth,
            sheets_base_url: SHEETS_BASE_URL.to_string(),
            drive_base_url: DRIVE_BASE_URL.to_string(),
        })
    }

    /// Point the client at different API roots (e.g. a local emulator)
    pub fn with_base_urls(mut self, sheets: impl Into<String>, drive: impl Into<String>) -> Self {
        self.sheets_base_url = sheets.into();
        self.drive_base_url = drive.into();
        self
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Build a request carrying a current bearer token
    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.auth.access_token(&self.http).await?;
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.sheets_base_url,
            urlencoding::encode(spreadsheet_id)
        )
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.drive_base_url, urlencoding::encode(file_id))
    }
}

#[async_trait]
impl SheetsApi for GoogleClient {
    async fn find_spreadsheets_by_title(&self, title: &str) -> Result<Vec<SpreadsheetRef>, ApiError> {
        let url = format!("{}/files", self.drive_base_url);
        let query = a1::spreadsheet_title_query(title);
        let page_size = DRIVE_PAGE_SIZE.to_string();

        let mut found = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = vec![
                ("q", query.as_str()),
                ("fields", "nextPageToken, files(id, name)"),
                ("pageSize", page_size.as_str()),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response = self
                .request(Method::GET, &url)
                .await?
                .query(&params)
                .send()
                .await?;
            let page: DriveFileList = Self::handle_response(response).await?;

            // Drive's name match ignores some normalisation; keep exact titles only
            found.extend(
                page.files
                    .into_iter()
                    .filter(|f| f.name == title)
                    .map(|f| SpreadsheetRef::new(f.id, f.name)),
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(found)
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetRef, ApiError> {
        let url = format!("{}/spreadsheets", self.sheets_base_url);
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(&json!({ "properties": { "title": title } }))
            .send()
            .await?;

        let resource: SpreadsheetResource = Self::handle_response(response).await?;
        Ok(Spreadsheet::from(resource).to_ref())
    }

    async fn copy_file(&self, source_id: &str, title: &str) -> Result<SpreadsheetRef, ApiError> {
        let url = format!("{}/copy", self.file_url(source_id));
        let response = self
            .request(Method::POST, &url)
            .await?
            .query(&[("fields", "id, name"), ("supportsAllDrives", "true")])
            .json(&json!({ "name": title }))
            .send()
            .await?;

        let file: DriveFile = Self::handle_response(response).await?;
        Ok(SpreadsheetRef::new(file.id, file.name))
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet, ApiError> {
        let url = self.spreadsheet_url(spreadsheet_id);
        let response = self
            .request(Method::GET, &url)
            .await?
            .query(&[("fields", "spreadsheetId,properties.title,sheets.properties")])
            .send()
            .await?;

        let resource: SpreadsheetResource = Self::handle_response(response).await?;
        Ok(resource.into())
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, ApiError> {
        let url = self.values_url(spreadsheet_id, range);
        let response = self
            .request(Method::GET, &url)
            .await?
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .await?;

        let range: ValueRange = Self::handle_response(response).await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<(), ApiError> {
        let url = self.values_url(spreadsheet_id, range);
        let response = self
            .request(Method::PUT, &url)
            .await?
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": values,
            }))
            .send()
            .await?;

        Self::handle_empty_response(response).await
    }

    async fn create_permission(&self, file_id: &str, email: &str, role: Role) -> Result<String, ApiError> {
        #[derive(serde::Deserialize)]
        struct Permission {
            id: String,
        }

        let url = format!("{}/permissions", self.file_url(file_id));
        let response = self
            .request(Method::POST, &url)
            .await?
            .query(&[("fields", "id"), ("supportsAllDrives", "true")])
            .json(&json!({
                "type": "user",
                "role": role.as_str(),
                "emailAddress": email,
            }))
            .send()
            .await?;

        let permission: Permission = Self::handle_response(response).await?;
        Ok(permission.id)
    }
}

/// Render a formatted cell value the way it reads in the sheet
fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string().to_uppercase(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
