//! Google Sheets and Drive access
//!
//! `GoogleClient` talks to the REST APIs with a service-account token from
//! `AuthManager`. `SheetManager` wraps any `SheetsApi` with the title-based
//! lookup, create-or-get and duplicate-or-reuse operations the provisioning
//! workflow relies on.

pub mod a1;
pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod manager;
pub mod models;

#[cfg(test)]
pub mod memory;

pub use auth::{AuthManager, ServiceAccountKey, TokenInfo};
pub use client::{GoogleClient, SheetsApi};
pub use error::ApiError;
pub use manager::SheetManager;
pub use models::{Provisioned, Record, Role, Spreadsheet, SpreadsheetRef, Worksheet};
