//! A1 range and Drive query string helpers

use super::constants::SPREADSHEET_MIME_TYPE;

/// Quote a tab name for use in an A1 reference (`My Tab` -> `'My Tab'`)
pub fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// Build `'<tab>'!<cell>`; an empty cell addresses the whole tab
pub fn tab_range(tab: &str, cell: &str) -> String {
    if cell.is_empty() {
        quote_tab(tab)
    } else {
        format!("{}!{}", quote_tab(tab), cell)
    }
}

/// Drive `q` expression matching non-trashed spreadsheets with exactly this title
pub fn spreadsheet_title_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME_TYPE
    )
}
