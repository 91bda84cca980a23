//! Provision per-employee and per-supervisor Google Sheets from an
//! organisational mapping sheet.

pub mod api;
pub mod cli;
pub mod config;
pub mod mapping;
pub mod provision;
