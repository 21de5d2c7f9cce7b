use crate::config::Config;
use crate::drive::DriveClient;
use crate::llm::LlmClient;
use crate::render::pdf::PdfRenderer;
use crate::sheets::SheetsClient;

/// Shared application state injected into all bot handlers via the
/// dispatcher's dependency map (as `Arc<AppState>`).
pub struct AppState {
    pub sheets: SheetsClient,
    pub drive: DriveClient,
    pub llm: LlmClient,
    pub config: Config,
    /// Present only when a Cyrillic-capable font directory is configured.
    pub pdf: Option<PdfRenderer>,
}
