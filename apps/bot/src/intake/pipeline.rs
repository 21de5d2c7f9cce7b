//! The per-resume intake pipeline.
//!
//! Flow: extract text → LLM field extraction → validation → duplicate check
//! → LLM reformat → drive uploads (original + generated documents) → rate
//! lookup → worksheet appends.
//!
//! Worksheet appends are per-tab best-effort: one failing tab is reported
//! and skipped so the candidate still lands in the remaining tabs, matching
//! how recruiters actually repair the sheet afterwards.

use chrono::Local;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::extract_text;
use crate::intake::batch::StagedFile;
use crate::intake::notify::Notify;
use crate::profile::{extract_profile, CandidateProfile, Currency};
use crate::reformat::{reformat_resume, ReformattedResume};
use crate::render::docx::render_docx;
use crate::render::markup::parse_blocks;
use crate::sheets::rows::{
    cis_rate_summary, client_rate_row, eu_rate_summary, facet_rows, summary_row, RateSet,
    SummaryContext,
};
use crate::sheets::store::{self, generate_resume_id, RateCells};
use crate::sheets::tabs;
use crate::state::AppState;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_MIME: &str = "application/pdf";

pub struct IntakeRequest<'a> {
    pub staged: &'a StagedFile,
    pub recruiter_username: &'a str,
    pub uploader_id: i64,
}

/// Links of one uploaded generated document pair.
#[derive(Default)]
struct GeneratedLinks {
    russian: Option<String>,
    english: Option<String>,
}

/// Processes one staged resume end to end. Returns the assigned resume id.
pub async fn process_resume(
    state: &AppState,
    notify: &dyn Notify,
    request: IntakeRequest<'_>,
) -> Result<String, AppError> {
    let file_name = &request.staged.file_name;
    let resume_id = generate_resume_id();

    // Step 1: extract text.
    let (kind, text) = extract_text(&request.staged.path).await?;
    notify
        .send(&format!(
            "✅ {} принят и обработан\n\nОбрабатываю текст...",
            kind.label()
        ))
        .await;

    // Step 2: LLM field extraction.
    info!("extracting fields from '{file_name}' as {resume_id}");
    let profile = extract_profile(&state.llm, &text, file_name).await?;

    // Step 3: validation — no name, no record.
    profile.ensure_named()?;
    for gap in profile.gaps() {
        notify.send(gap.user_message()).await;
    }

    // Step 4: duplicate check by (last, first).
    if let Some((last, first)) = profile.duplicate_key() {
        if store::is_duplicate(&state.sheets, &last, &first).await? {
            return Err(AppError::Duplicate { last, first });
        }
    }
    notify.send("✅ Данные извлечены!").await;

    // Step 5: anonymized bilingual reformat.
    let reformatted = reformat_resume(&state.llm, &text, &resume_id).await?;

    // Step 6: drive folder + original upload.
    let folder_name = profile.folder_name(&resume_id);
    let folder_id = state.drive.ensure_folder(&folder_name).await?;
    let original_bytes = tokio::fs::read(&request.staged.path).await?;
    let original = state
        .drive
        .upload_bytes(&folder_id, file_name, kind.mime_type(), original_bytes)
        .await?;
    if let Err(e) = state.drive.share_public(&original.id).await {
        warn!("could not make '{file_name}' public: {e}");
    }

    // Step 7: generated documents (DOCX always, PDF when fonts are present).
    let links = upload_generated(state, notify, &profile, &reformatted, &folder_id, file_name)
        .await;

    // Step 8: rate lookup + client-rate rows. Rate-table trouble is reported
    // but never blocks the candidate row.
    let mut rate_cis_summary = None;
    let mut rate_eu_summary = None;
    if let Some(salary) = salary_search_key(&profile) {
        match compute_rates(state, salary).await {
            Ok((cis, eu)) => {
                append_best_effort(
                    state,
                    notify,
                    tabs::CLIENT_RATE_CIS,
                    client_rate_row(&resume_id, &cis),
                )
                .await;
                append_best_effort(
                    state,
                    notify,
                    tabs::CLIENT_RATE_EU_US,
                    client_rate_row(&resume_id, &eu),
                )
                .await;
                rate_cis_summary = Some(cis_rate_summary(&cis));
                rate_eu_summary = Some(eu_rate_summary(&eu));
            }
            Err(e) => {
                warn!("rate lookup failed for {resume_id}: {e}");
                notify
                    .send("⚠️ Не удалось рассчитать ставки по зарплатным ожиданиям.")
                    .await;
            }
        }
    }

    // Step 9: summary + facet rows.
    let ctx = SummaryContext {
        resume_id: &resume_id,
        resume_url: original.web_link.as_deref(),
        resume_ru_url: links.russian.as_deref(),
        resume_en_url: links.english.as_deref(),
        recruiter_username: request.recruiter_username,
        uploaded_by_admin: request.uploader_id == state.config.admin_user_id,
        salary_display: profile
            .salary_expectations
            .as_ref()
            .and_then(|s| s.display()),
        rate_cis_summary,
        rate_eu_summary,
        added_at: Local::now(),
    };
    append_best_effort(state, notify, tabs::SUMMARY, summary_row(&profile, &ctx)).await;
    for (tab, row) in facet_rows(&profile, &resume_id) {
        append_best_effort(state, notify, tab, row).await;
    }

    notify
        .send(&format!("✅ Резюме '{file_name}' успешно добавлено!"))
        .await;
    info!("resume '{file_name}' stored as {resume_id}");
    Ok(resume_id)
}

/// `(column, amount)` search key when the profile has a usable salary.
fn salary_search_key(profile: &CandidateProfile) -> Option<(Currency, i64)> {
    let salary = profile.salary_expectations.as_ref()?;
    Some((salary.parsed_currency()?, salary.amount_value()?))
}

/// Range-searches all six rate-calculation tabs for the salary and groups
/// the matches by region. Also used by the add-info salary flow.
pub(crate) async fn compute_rates(
    state: &AppState,
    (currency, amount): (Currency, i64),
) -> Result<(RateSet, RateSet), AppError> {
    let col = currency.rate_search_column();
    let lookup = |tab: &'static str| store::rate_lookup(&state.sheets, tab, col, amount);

    let cis = RateSet {
        contract: lookup(tabs::RATE_CALC_CONTRACT_CIS).await?.unwrap_or_default(),
        sole_trader: lookup(tabs::RATE_CALC_SOLE_TRADER_CIS)
            .await?
            .unwrap_or_default(),
        self_employed: lookup(tabs::RATE_CALC_SELF_EMPLOYED_CIS)
            .await?
            .unwrap_or_default(),
    };
    let eu = RateSet {
        contract: lookup(tabs::RATE_CALC_CONTRACT_EU_US)
            .await?
            .unwrap_or_default(),
        sole_trader: lookup(tabs::RATE_CALC_SOLE_TRADER_EU_US)
            .await?
            .unwrap_or_default(),
        self_employed: lookup(tabs::RATE_CALC_SELF_EMPLOYED_EU_US)
            .await?
            .unwrap_or_default(),
    };

    if rate_set_is_empty(&cis) && rate_set_is_empty(&eu) {
        warn!("no rate rows matched amount {amount}");
    }
    Ok((cis, eu))
}

fn rate_set_is_empty(rates: &RateSet) -> bool {
    [&rates.contract, &rates.sole_trader, &rates.self_employed]
        .iter()
        .all(|c| **c == RateCells::default())
}

/// Renders and uploads the generated RU/EN documents, returning their links.
async fn upload_generated(
    state: &AppState,
    notify: &dyn Notify,
    profile: &CandidateProfile,
    reformatted: &ReformattedResume,
    folder_id: &str,
    file_name: &str,
) -> GeneratedLinks {
    let stem = file_stem(file_name);
    let mut links = GeneratedLinks::default();

    for (language, text, english) in [
        ("RU", &reformatted.russian, false),
        ("EN", &reformatted.english, true),
    ] {
        if text.trim().is_empty() {
            continue;
        }
        let blocks = parse_blocks(text);
        let title = profile.document_title(english);

        // DOCX version.
        match render_docx(&title, &blocks) {
            Ok(bytes) => {
                let name = format!("Обработанное_{language}_{stem}.docx");
                match state
                    .drive
                    .upload_bytes(folder_id, &name, DOCX_MIME, bytes)
                    .await
                {
                    Ok(uploaded) => {
                        if let Err(e) = state.drive.share_public(&uploaded.id).await {
                            warn!("could not make '{name}' public: {e}");
                        }
                        let slot = if english {
                            &mut links.english
                        } else {
                            &mut links.russian
                        };
                        *slot = uploaded.web_link;
                    }
                    Err(e) => {
                        warn!("upload of '{name}' failed: {e}");
                        notify
                            .send(&format!(
                                "⚠️ Не удалось загрузить обработанное резюме ({language})."
                            ))
                            .await;
                    }
                }
            }
            Err(e) => {
                warn!("DOCX render failed for {language}: {e}");
                notify
                    .send(&format!(
                        "⚠️ Не удалось сгенерировать Word-версию ({language})."
                    ))
                    .await;
            }
        }

        // PDF version, only with a configured font directory.
        if let Some(pdf) = &state.pdf {
            match pdf.render(&title, &blocks) {
                Ok(bytes) => {
                    let name = format!("Обработанное_{language}_{stem}.pdf");
                    match state
                        .drive
                        .upload_bytes(folder_id, &name, PDF_MIME, bytes)
                        .await
                    {
                        Ok(uploaded) => {
                            if let Err(e) = state.drive.share_public(&uploaded.id).await {
                                warn!("could not make '{name}' public: {e}");
                            }
                        }
                        Err(e) => warn!("upload of '{name}' failed: {e}"),
                    }
                }
                Err(e) => warn!("PDF render failed for {language}: {e}"),
            }
        }
    }

    links
}

/// Appends one row, reporting (but not propagating) failures.
async fn append_best_effort(
    state: &AppState,
    notify: &dyn Notify,
    tab: &str,
    row: Vec<String>,
) {
    if let Err(e) = state.sheets.append_row(tab, &row).await {
        warn!("append to '{tab}' failed: {e}");
        notify
            .send(&format!(
                "⚠️ Не удалось добавить данные в лист «{tab}». Проверьте настройки."
            ))
            .await;
    }
}

fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("resume.final.pdf"), "resume.final");
        assert_eq!(file_stem("resume"), "resume");
    }

    #[test]
    fn test_salary_search_key() {
        let profile: CandidateProfile = serde_json::from_str(
            r#"{"salaryExpectations": {"amount": "2 500", "currency": "usd"}}"#,
        )
        .unwrap();
        assert_eq!(salary_search_key(&profile), Some((Currency::Usd, 2500)));

        let no_currency: CandidateProfile =
            serde_json::from_str(r#"{"salaryExpectations": {"amount": "2500"}}"#).unwrap();
        assert_eq!(salary_search_key(&no_currency), None);
    }

    #[test]
    fn test_rate_set_is_empty() {
        assert!(rate_set_is_empty(&RateSet::default()));
        let set = RateSet {
            contract: RateCells {
                rub: Some("10".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!rate_set_is_empty(&set));
    }
}
