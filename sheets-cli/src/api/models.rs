//! Spreadsheet, worksheet and sharing models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One data row keyed by header, as produced by `get_all_records`
pub type Record = HashMap<String, String>;

/// Lightweight handle to a remote spreadsheet.
///
/// The title is what the provisioning workflow de-duplicates on; the ID is
/// whatever the backing store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetRef {
    pub id: String,
    pub title: String,
}

impl SpreadsheetRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A spreadsheet together with its tabs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spreadsheet {
    pub id: String,
    pub title: String,
    pub worksheets: Vec<Worksheet>,
}

impl Spreadsheet {
    /// Find a tab by exact title
    pub fn worksheet(&self, title: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|w| w.title == title)
    }

    /// The tab at index 0 (what the Sheets UI calls "Sheet1")
    pub fn first_worksheet(&self) -> Option<&Worksheet> {
        self.worksheets.iter().min_by_key(|w| w.index)
    }

    pub fn to_ref(&self) -> SpreadsheetRef {
        SpreadsheetRef::new(self.id.clone(), self.title.clone())
    }
}

/// A single tab inside a spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    pub id: i64,
    pub title: String,
    pub index: i64,
}

/// Permission level granted when sharing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Reader,
    Writer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Writer => "writer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a create-or-get / duplicate-or-reuse call made a new spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provisioned {
    /// A new spreadsheet was created by this call
    Created,
    /// A spreadsheet with the requested title already existed and was reused
    Existing,
}

impl Provisioned {
    pub fn is_created(&self) -> bool {
        matches!(self, Provisioned::Created)
    }
}

// Wire formats for the Sheets v4 and Drive v3 endpoints we call.

#[derive(Debug, Deserialize)]
pub(crate) struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpreadsheetResource {
    pub spreadsheet_id: String,
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpreadsheetProperties {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetResource {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

impl From<SpreadsheetResource> for Spreadsheet {
    fn from(resource: SpreadsheetResource) -> Self {
        Spreadsheet {
            id: resource.spreadsheet_id,
            title: resource.properties.title,
            worksheets: resource
                .sheets
                .into_iter()
                .map(|s| Worksheet {
                    id: s.properties.sheet_id,
                    title: s.properties.title,
                    index: s.properties.index,
                })
                .collect(),
        }
    }
}

/// Body of `spreadsheets.values.get`; `values` is absent for empty ranges
#[derive(Debug, Deserialize)]
pub(crate) struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}
