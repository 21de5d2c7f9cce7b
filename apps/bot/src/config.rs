use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub anthropic_api_key: String,
    pub spreadsheet_id: String,
    /// Service-account credentials: inline JSON takes priority over the file.
    pub google_credentials_json: Option<String>,
    pub google_credentials_file: PathBuf,
    /// Optional Drive folder that all candidate folders are created under.
    pub drive_root_folder_id: Option<String>,
    /// Telegram user id whose uploads are stamped into the admin date column.
    pub admin_user_id: i64,
    /// Staging directory for downloaded resume files.
    pub download_dir: PathBuf,
    /// Directory with a Cyrillic-capable TTF family; PDF output is skipped
    /// when unset.
    pub pdf_font_dir: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            telegram_bot_token: require_env("TELEGRAM_BOT_TOKEN")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            spreadsheet_id: require_env("SPREADSHEET_ID")?,
            google_credentials_json: std::env::var("GOOGLE_CREDENTIALS_JSON").ok(),
            google_credentials_file: std::env::var("GOOGLE_CREDENTIALS_FILE")
                .unwrap_or_else(|_| "credentials.json".to_string())
                .into(),
            drive_root_folder_id: std::env::var("DRIVE_ROOT_FOLDER_ID").ok(),
            admin_user_id: require_env("ADMIN_ID")?
                .parse::<i64>()
                .context("ADMIN_ID must be a numeric Telegram user id")?,
            download_dir: std::env::var("DOWNLOAD_DIR")
                .unwrap_or_else(|_| "downloads".to_string())
                .into(),
            pdf_font_dir: std::env::var("PDF_FONT_DIR").ok().map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
