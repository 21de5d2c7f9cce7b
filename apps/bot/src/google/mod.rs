//! Shared Google API plumbing: service-account OAuth.

mod auth;

pub use auth::{load_service_account_key, AuthError, ServiceAccountKey, TokenProvider};

/// OAuth scopes the bot needs: the spreadsheet store and the drive file store.
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
