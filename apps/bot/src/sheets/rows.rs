//! Worksheet row assembly from a candidate profile.
//!
//! The builders produce rows in the exact column order of their worksheet;
//! boolean facets are rendered as ✅/❌ symbols, absent values become ❌ in
//! facet tabs and "не указано" in the summary tab.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::profile::{level_entries, truthy_keys, Bilingual, CandidateProfile, FacetMap};
use crate::sheets::store::RateCells;
use crate::sheets::tabs;
use crate::vocab;

const NOT_SPECIFIED: &str = "не указано";
const MISSING: &str = "❌";
const CHECKED: &str = "✅";

/// Column order of the summary worksheet. The add-info flow addresses these
/// columns by name, so renames here must match the live sheet.
pub const SUMMARY_HEADERS: &[&str] = &[
    "ID кандидата",
    "Фамилия",
    "Имя",
    "Отчество",
    "Специализация",
    "Дата рождения",
    "Локация",
    "Грейд",
    "Общий опыт",
    "Спец опыт",
    "Языки программирования",
    "Frameworks",
    "Технологии",
    "Отрасли проектов",
    "Иностранные языки",
    "Портфолио",
    "Контакты",
    "Зарплатные ожидания (на руки)",
    "Рейт СНГ (руб)",
    "Рейт ЕС/США (USD)",
    "Доступность",
    "Возможная дата выхода на новое место работы",
    "Резюме",
    "Обработанное резюме (RU)",
    "Обработанное резюме (EN)",
    "Рекрутер",
    "Дата добавления (рекрутер)",
    "Дата добавления (админ)",
];

/// Everything the summary row needs besides the profile itself.
pub struct SummaryContext<'a> {
    pub resume_id: &'a str,
    pub resume_url: Option<&'a str>,
    pub resume_ru_url: Option<&'a str>,
    pub resume_en_url: Option<&'a str>,
    pub recruiter_username: &'a str,
    pub uploaded_by_admin: bool,
    pub salary_display: Option<String>,
    pub rate_cis_summary: Option<String>,
    pub rate_eu_summary: Option<String>,
    pub added_at: DateTime<Local>,
}

/// The three employment-form rate rows matched for one region.
#[derive(Debug, Clone, Default)]
pub struct RateSet {
    pub contract: RateCells,
    pub sole_trader: RateCells,
    pub self_employed: RateCells,
}

fn bilingual_part(b: Option<&Bilingual>, english: bool) -> Option<String> {
    let b = b?;
    let s = if english { b.en_or_ru() } else { b.ru_or_en() };
    s.map(str::to_string)
}

fn join_truthy(map: &FacetMap) -> Option<String> {
    let keys = truthy_keys(map);
    (!keys.is_empty()).then(|| keys.join(", "))
}

fn join_levels(map: &FacetMap) -> Option<String> {
    let entries = level_entries(map);
    (!entries.is_empty()).then(|| {
        entries
            .iter()
            .map(|(lang, level)| format!("{lang}: {level}"))
            .collect::<Vec<_>>()
            .join(", ")
    })
}

fn location_display(profile: &CandidateProfile) -> Option<String> {
    let parts: Vec<String> = [
        bilingual_part(profile.location.as_ref(), false),
        bilingual_part(profile.city.as_ref(), false),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn or_not_specified(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// Builds the summary worksheet row in `SUMMARY_HEADERS` order.
pub fn summary_row(profile: &CandidateProfile, ctx: &SummaryContext<'_>) -> Vec<String> {
    let timestamp = ctx.added_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let (recruiter_date, admin_date) = if ctx.uploaded_by_admin {
        ("-".to_string(), timestamp)
    } else {
        (timestamp, "-".to_string())
    };

    let row = vec![
        ctx.resume_id.to_string(),
        or_not_specified(bilingual_part(profile.last_name.as_ref(), false)),
        or_not_specified(bilingual_part(profile.first_name.as_ref(), false)),
        or_not_specified(bilingual_part(profile.patronymic.as_ref(), false)),
        or_not_specified(profile.specialization.clone()),
        or_not_specified(profile.date_of_birth.clone()),
        or_not_specified(location_display(profile)),
        or_not_specified(join_truthy(&profile.grade)),
        or_not_specified(profile.total_experience.clone()),
        or_not_specified(profile.special_experience.clone()),
        or_not_specified(join_truthy(&profile.programming_languages)),
        or_not_specified(join_truthy(&profile.frameworks)),
        or_not_specified(join_truthy(&profile.technologies)),
        or_not_specified(join_truthy(&profile.project_industries)),
        or_not_specified(join_levels(&profile.languages)),
        or_not_specified(join_truthy(&profile.portfolio)),
        {
            let lines = profile.contact_lines();
            if lines.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                lines.join("\n")
            }
        },
        or_not_specified(ctx.salary_display.clone()),
        or_not_specified(ctx.rate_cis_summary.clone()),
        or_not_specified(ctx.rate_eu_summary.clone()),
        or_not_specified(join_truthy(&profile.availability)),
        or_not_specified(profile.date_of_exit.clone()),
        ctx.resume_url.unwrap_or("-").to_string(),
        ctx.resume_ru_url.unwrap_or("-").to_string(),
        ctx.resume_en_url.unwrap_or("-").to_string(),
        format!("@{}", ctx.recruiter_username),
        recruiter_date,
        admin_date,
    ];
    debug_assert_eq!(row.len(), SUMMARY_HEADERS.len());
    row
}

/// `[id, ru, en]` for the name/surname/patronymic worksheets.
pub fn bilingual_row(resume_id: &str, value: Option<&Bilingual>) -> Vec<String> {
    vec![
        resume_id.to_string(),
        value
            .and_then(|b| b.ru.clone())
            .unwrap_or_else(|| MISSING.to_string()),
        value
            .and_then(|b| b.en.clone())
            .unwrap_or_else(|| MISSING.to_string()),
    ]
}

/// `[id, location_ru, city_ru, location_en, city_en]`.
pub fn location_row(resume_id: &str, profile: &CandidateProfile) -> Vec<String> {
    let part = |b: Option<&Bilingual>, english: bool| {
        bilingual_part(b, english).unwrap_or_else(|| MISSING.to_string())
    };
    vec![
        resume_id.to_string(),
        part(profile.location.as_ref(), false),
        part(profile.city.as_ref(), false),
        part(profile.location.as_ref(), true),
        part(profile.city.as_ref(), true),
    ]
}

fn normalized(map: &FacetMap) -> HashMap<String, &serde_json::Value> {
    map.iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v))
        .collect()
}

/// One ✅/❌ cell per vocabulary entry, in vocabulary order.
pub fn symbols_row(resume_id: &str, map: &FacetMap, vocabulary: &[&str]) -> Vec<String> {
    let lookup = normalized(map);
    let mut row = vec![resume_id.to_string()];
    for entry in vocabulary {
        let truthy = matches!(
            lookup.get(&entry.to_lowercase()),
            Some(serde_json::Value::Bool(true))
        );
        row.push(if truthy { CHECKED } else { MISSING }.to_string());
    }
    row
}

/// One level/value cell per vocabulary entry (foreign languages).
pub fn levels_row(resume_id: &str, map: &FacetMap, vocabulary: &[&str]) -> Vec<String> {
    let lookup = normalized(map);
    let mut row = vec![resume_id.to_string()];
    for entry in vocabulary {
        let value = lookup
            .get(&entry.to_lowercase())
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        row.push(value.unwrap_or(MISSING).to_string());
    }
    row
}

/// One cell per contact field, in `CONTACT_FIELDS` order.
pub fn contacts_row(resume_id: &str, profile: &CandidateProfile) -> Vec<String> {
    let mut row = vec![resume_id.to_string()];
    for field in vocab::CONTACT_FIELDS {
        let value = profile
            .contacts
            .get(*field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty());
        row.push(value.unwrap_or(MISSING).to_string());
    }
    row
}

/// Column order of the two client-rate worksheets.
pub const CLIENT_RATE_HEADERS: &[&str] = &[
    "ID кандидата",
    "Ставка (штат/контракт) EUR / час",
    "Ставка (штат/контракт) USD / час",
    "Ставка (штат/контракт) RUB / час",
    "Ставка (штат/контракт) BYN / час",
    "Ставка (ИП) EUR / час",
    "Ставка (ИП) USD / час",
    "Ставка (ИП) RUB / час",
    "Ставка (ИП) BYN / час",
    "Ставка (Самозанятый) EUR / час",
    "Ставка (Самозанятый) USD / час",
    "Ставка (Самозанятый) RUB / час",
    "Ставка (Самозанятый) BYN / час",
];

/// Header→value pairs for updating an existing client-rate row in place
/// (the add-info salary flow).
pub fn client_rate_updates(rates: &RateSet) -> Vec<(String, String)> {
    CLIENT_RATE_HEADERS
        .iter()
        .skip(1)
        .zip(client_rate_row("", rates).into_iter().skip(1))
        .map(|(header, value)| (header.to_string(), value))
        .collect()
}

/// `"English: B2, German: A1"` — summary-column rendering of collected pairs.
pub fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Client-rate worksheet row: id followed by EUR/USD/RUB/BYN hourly rates
/// for each employment form.
pub fn client_rate_row(resume_id: &str, rates: &RateSet) -> Vec<String> {
    let mut row = vec![resume_id.to_string()];
    for cells in [&rates.contract, &rates.sole_trader, &rates.self_employed] {
        for value in [&cells.eur, &cells.usd, &cells.rub, &cells.byn] {
            row.push(value.clone().unwrap_or_default());
        }
    }
    row
}

/// Multi-line rate summary for the CIS column of the summary sheet (RUB).
pub fn cis_rate_summary(rates: &RateSet) -> String {
    format!(
        "Штат/контракт-{}\nИП-{}\nСамозанятый-{}",
        rates.contract.rub.as_deref().unwrap_or("-"),
        rates.sole_trader.rub.as_deref().unwrap_or("-"),
        rates.self_employed.rub.as_deref().unwrap_or("-"),
    )
}

/// Multi-line rate summary for the EU/US column of the summary sheet (USD).
pub fn eu_rate_summary(rates: &RateSet) -> String {
    format!(
        "Штат/контракт-{}\nИП-{}\nСамозанятый-{}",
        rates.contract.usd.as_deref().unwrap_or("-"),
        rates.sole_trader.usd.as_deref().unwrap_or("-"),
        rates.self_employed.usd.as_deref().unwrap_or("-"),
    )
}

/// All facet worksheet rows for one candidate, paired with their tab names.
pub fn facet_rows(
    profile: &CandidateProfile,
    resume_id: &str,
) -> Vec<(&'static str, Vec<String>)> {
    vec![
        (
            tabs::SURNAME,
            bilingual_row(resume_id, profile.last_name.as_ref()),
        ),
        (tabs::NAME, bilingual_row(resume_id, profile.first_name.as_ref())),
        (
            tabs::ROLES,
            symbols_row(resume_id, &profile.roles, vocab::ROLES),
        ),
        (tabs::LOCATION, location_row(resume_id, profile)),
        (
            tabs::GRADES,
            symbols_row(resume_id, &profile.grade, vocab::GRADES),
        ),
        (
            tabs::PROGRAMMING_LANGUAGES,
            symbols_row(
                resume_id,
                &profile.programming_languages,
                vocab::PROGRAMMING_LANGUAGES,
            ),
        ),
        (
            tabs::FRAMEWORKS,
            symbols_row(resume_id, &profile.frameworks, vocab::FRAMEWORKS),
        ),
        (
            tabs::TECHNOLOGIES,
            symbols_row(resume_id, &profile.technologies, vocab::TECHNOLOGIES),
        ),
        (
            tabs::PROJECT_INDUSTRIES,
            symbols_row(
                resume_id,
                &profile.project_industries,
                vocab::PROJECT_INDUSTRIES,
            ),
        ),
        (
            tabs::FOREIGN_LANGUAGES,
            levels_row(resume_id, &profile.languages, vocab::FOREIGN_LANGUAGES),
        ),
        (
            tabs::PORTFOLIO,
            symbols_row(resume_id, &profile.portfolio, vocab::PORTFOLIO),
        ),
        (
            tabs::WORK_SCHEDULE,
            symbols_row(resume_id, &profile.work_time, vocab::WORK_SCHEDULES),
        ),
        (
            tabs::EMPLOYMENT_FORM,
            symbols_row(resume_id, &profile.work_form, vocab::EMPLOYMENT_FORMS),
        ),
        (tabs::CONTACTS, contacts_row(resume_id, profile)),
        (
            tabs::AVAILABILITY,
            symbols_row(resume_id, &profile.availability, vocab::AVAILABILITY),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> CandidateProfile {
        serde_json::from_str(
            r#"{
                "specialization": "Python Developer",
                "firstName": {"ru": "Иван", "en": "Ivan"},
                "lastName": {"ru": "Иванов", "en": "Ivanov"},
                "dateOfBirth": "01.01.1990",
                "grade": {"Middle": true},
                "location": {"ru": "Беларусь", "en": "Belarus"},
                "city": {"ru": "Минск", "en": "Minsk"},
                "programmingLanguages": {"python": true, "Go": false},
                "languages": {"English": "B2"},
                "contacts": {"email": "ivan@example.com"},
                "availability": {"Open to offers": true}
            }"#,
        )
        .unwrap()
    }

    fn sample_ctx(resume_id: &str) -> SummaryContext<'_> {
        SummaryContext {
            resume_id,
            resume_url: Some("https://drive/file"),
            resume_ru_url: None,
            resume_en_url: None,
            recruiter_username: "recruiter",
            uploaded_by_admin: false,
            salary_display: Some("200000 RUB".to_string()),
            rate_cis_summary: None,
            rate_eu_summary: None,
            added_at: Local::now(),
        }
    }

    #[test]
    fn test_summary_row_matches_header_count() {
        let row = summary_row(&sample_profile(), &sample_ctx("k_12345"));
        assert_eq!(row.len(), SUMMARY_HEADERS.len());
        assert_eq!(row[0], "k_12345");
        assert_eq!(row[1], "Иванов");
        assert_eq!(row[6], "Беларусь, Минск");
        assert_eq!(row[14], "English: B2");
        assert_eq!(row[16], "ivan@example.com");
        assert_eq!(row[17], "200000 RUB");
        assert_eq!(row[25], "@recruiter");
    }

    #[test]
    fn test_summary_row_admin_date_split() {
        let profile = sample_profile();
        let mut ctx = sample_ctx("k_12345");
        ctx.uploaded_by_admin = true;
        let row = summary_row(&profile, &ctx);
        assert_eq!(row[26], "-");
        assert_ne!(row[27], "-");
    }

    #[test]
    fn test_summary_row_defaults() {
        let row = summary_row(&CandidateProfile::default(), &sample_ctx("k_1"));
        assert_eq!(row[4], "не указано");
        assert_eq!(row[18], "не указано");
        assert_eq!(row[23], "-");
    }

    #[test]
    fn test_symbols_row_is_case_insensitive() {
        let profile = sample_profile();
        let row = symbols_row("k_1", &profile.programming_languages, &["Python", "Go", "Rust"]);
        assert_eq!(row, vec!["k_1", "✅", "❌", "❌"]);
    }

    #[test]
    fn test_levels_row() {
        let profile = sample_profile();
        let row = levels_row("k_1", &profile.languages, &["English", "German"]);
        assert_eq!(row, vec!["k_1", "B2", "❌"]);
    }

    #[test]
    fn test_bilingual_row_missing_side() {
        let b = Bilingual {
            ru: Some("Иван".to_string()),
            en: None,
        };
        assert_eq!(bilingual_row("k_1", Some(&b)), vec!["k_1", "Иван", "❌"]);
        assert_eq!(bilingual_row("k_1", None), vec!["k_1", "❌", "❌"]);
    }

    #[test]
    fn test_client_rate_updates_align_with_headers() {
        let updates = client_rate_updates(&RateSet::default());
        assert_eq!(updates.len(), CLIENT_RATE_HEADERS.len() - 1);
        assert_eq!(updates[0].0, "Ставка (штат/контракт) EUR / час");
    }

    #[test]
    fn test_join_pairs() {
        let pairs = vec![
            ("English".to_string(), "B2".to_string()),
            ("German".to_string(), "A1".to_string()),
        ];
        assert_eq!(join_pairs(&pairs), "English: B2, German: A1");
    }

    #[test]
    fn test_client_rate_row_layout() {
        let rates = RateSet {
            contract: RateCells {
                rub: Some("3500".to_string()),
                usd: Some("45".to_string()),
                eur: Some("41".to_string()),
                byn: Some("120".to_string()),
            },
            ..Default::default()
        };
        let row = client_rate_row("k_1", &rates);
        assert_eq!(row.len(), 13);
        assert_eq!(&row[1..5], &["41", "45", "3500", "120"]);
        assert_eq!(row[5], "");
    }

    #[test]
    fn test_rate_summaries() {
        let rates = RateSet {
            contract: RateCells {
                rub: Some("3500".to_string()),
                usd: Some("45".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(cis_rate_summary(&rates), "Штат/контракт-3500\nИП--\nСамозанятый--");
        assert!(eu_rate_summary(&rates).starts_with("Штат/контракт-45"));
    }

    #[test]
    fn test_facet_rows_cover_all_facet_tabs() {
        let rows = facet_rows(&sample_profile(), "k_1");
        assert_eq!(rows.len(), 15);
        for (_, row) in &rows {
            assert_eq!(row[0], "k_1");
        }
        let tabs_used: Vec<_> = rows.iter().map(|(t, _)| *t).collect();
        assert!(tabs_used.contains(&tabs::CONTACTS));
        assert!(tabs_used.contains(&tabs::AVAILABILITY));
    }
}
