mod bot;
mod config;
mod drive;
mod errors;
mod extract;
mod google;
mod intake;
mod llm;
mod profile;
mod rates;
mod reformat;
mod render;
mod sheets;
mod state;
mod vocab;

use std::sync::Arc;

use anyhow::Result;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::drive::DriveClient;
use crate::google::{load_service_account_key, TokenProvider, SCOPES};
use crate::llm::LlmClient;
use crate::render::pdf::PdfRenderer;
use crate::sheets::SheetsClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars).
    let config = Config::from_env()?;

    // Initialize structured logging.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume intake bot v{}", env!("CARGO_PKG_VERSION"));

    // Google API clients share one service-account token provider.
    let key = load_service_account_key(&config)?;
    let auth = Arc::new(TokenProvider::new(key, SCOPES));
    let sheets = SheetsClient::new(auth.clone(), config.spreadsheet_id.clone());
    let drive = DriveClient::new(auth, config.drive_root_folder_id.clone());
    info!("Sheets and Drive clients initialized");

    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm::MODEL);

    let pdf = config.pdf_font_dir.as_deref().map(PdfRenderer::new);
    if pdf.is_none() {
        info!("PDF_FONT_DIR not set; generated resumes will be uploaded as DOCX only");
    }

    tokio::fs::create_dir_all(&config.download_dir).await?;

    let app_state = Arc::new(AppState {
        sheets,
        drive,
        llm,
        config: config.clone(),
        pdf,
    });

    // Daily currency/rate refresh runs beside the dispatcher.
    tokio::spawn(rates::run_updater(app_state.clone()));

    let telegram = Bot::new(config.telegram_bot_token.clone());
    info!("Starting long polling");
    bot::run(telegram, app_state).await;

    Ok(())
}
