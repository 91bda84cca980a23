//! Google API endpoints, scopes and media types

/// OAuth scope for reading and writing spreadsheets
pub const SCOPE_SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";

/// OAuth scope for Drive file access (copy, search, permissions)
pub const SCOPE_DRIVE: &str = "https://www.googleapis.com/auth/drive";

/// Scopes bound to the service account when none are configured
pub const DEFAULT_SCOPES: &[&str] = &[SCOPE_SPREADSHEETS, SCOPE_DRIVE];

/// Token endpoint used when the key file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Grant type for the service-account JWT bearer flow
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Drive MIME type identifying native Google spreadsheets
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Lifetime requested for each signed assertion (Google caps this at one hour)
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are treated as expired
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Page size for Drive file listings
pub const DRIVE_PAGE_SIZE: u32 = 100;
