//! Candidate profile — the structured fields extracted from one resume.
//!
//! The shape mirrors the extraction prompt. LLM output is only loosely
//! typed: facet maps arrive as JSON objects whose values may be booleans,
//! level strings or nulls, so they are kept as `serde_json::Value` maps with
//! typed accessors on top.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::errors::AppError;
use crate::llm::prompts::{profile_extract_prompt, PROFILE_EXTRACT_SYSTEM};
use crate::llm::LlmClient;
use crate::vocab;

/// A facet map as returned by the LLM: vocabulary entry → bool / level / null.
pub type FacetMap = BTreeMap<String, serde_json::Value>;

/// A value carried in both Russian and English spellings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bilingual {
    #[serde(default, deserialize_with = "flexible_string")]
    pub ru: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub en: Option<String>,
}

impl Bilingual {
    pub fn ru_or_en(&self) -> Option<&str> {
        self.ru.as_deref().or(self.en.as_deref())
    }

    pub fn en_or_ru(&self) -> Option<&str> {
        self.en.as_deref().or(self.ru.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Rub,
    Usd,
    Eur,
    Byn,
}

impl Currency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUB" => Some(Currency::Rub),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "BYN" => Some(Currency::Byn),
            _ => None,
        }
    }

    /// 0-based index of the salary column for this currency in the
    /// rate-calculation worksheets (B/C/D/E).
    pub fn rate_search_column(self) -> usize {
        match self {
            Currency::Rub => 1,
            Currency::Usd => 2,
            Currency::Eur => 3,
            Currency::Byn => 4,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Byn => "BYN",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalaryExpectation {
    #[serde(default, deserialize_with = "flexible_string")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub currency: Option<String>,
}

impl SalaryExpectation {
    /// Numeric amount with separators stripped (`"200 000"` → 200000).
    pub fn amount_value(&self) -> Option<i64> {
        let digits: String = self
            .amount
            .as_deref()?
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    pub fn parsed_currency(&self) -> Option<Currency> {
        Currency::parse(self.currency.as_deref()?)
    }

    /// `"200000 RUB"` — the format the summary column stores.
    pub fn display(&self) -> Option<String> {
        match (&self.amount, &self.currency) {
            (Some(a), Some(c)) => Some(format!("{a} {c}")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateProfile {
    #[serde(deserialize_with = "flexible_string")]
    pub specialization: Option<String>,
    pub first_name: Option<Bilingual>,
    pub last_name: Option<Bilingual>,
    pub patronymic: Option<Bilingual>,
    #[serde(deserialize_with = "flexible_string")]
    pub date_of_birth: Option<String>,
    pub grade: FacetMap,
    #[serde(deserialize_with = "flexible_string")]
    pub total_experience: Option<String>,
    #[serde(deserialize_with = "flexible_string")]
    pub special_experience: Option<String>,
    #[serde(deserialize_with = "flexible_string")]
    pub date_of_exit: Option<String>,
    pub programming_languages: FacetMap,
    pub frameworks: FacetMap,
    pub technologies: FacetMap,
    pub roles: FacetMap,
    pub location: Option<Bilingual>,
    pub city: Option<Bilingual>,
    pub contacts: FacetMap,
    pub portfolio: FacetMap,
    pub languages: FacetMap,
    pub project_industries: FacetMap,
    pub availability: FacetMap,
    pub work_time: FacetMap,
    pub work_form: FacetMap,
    pub salary_expectations: Option<SalaryExpectation>,
    #[serde(deserialize_with = "flexible_string")]
    pub rate_rub: Option<String>,
}

/// Non-fatal gaps surfaced to the recruiter after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileGap {
    Patronymic,
    BirthDate,
    Languages,
}

impl ProfileGap {
    pub fn user_message(self) -> &'static str {
        match self {
            ProfileGap::Patronymic => "❌ В резюме нет отчества. Пожалуйста, уточните его.",
            ProfileGap::BirthDate => "❌ В резюме нет даты рождения. Пожалуйста, уточните её.",
            ProfileGap::Languages => {
                "❌ В резюме нет сведений об иностранных языках. Пожалуйста, уточните их."
            }
        }
    }
}

impl CandidateProfile {
    /// A profile without a first or last name in either language cannot be
    /// stored — the name is the duplicate-detection key.
    pub fn ensure_named(&self) -> Result<(), AppError> {
        let has = |b: &Option<Bilingual>| b.as_ref().and_then(|v| v.ru_or_en()).is_some();
        if has(&self.first_name) && has(&self.last_name) {
            Ok(())
        } else {
            Err(AppError::MissingName)
        }
    }

    /// Gaps that only warn (the original pipeline keeps going).
    pub fn gaps(&self) -> Vec<ProfileGap> {
        let mut gaps = Vec::new();
        if self
            .patronymic
            .as_ref()
            .and_then(|p| p.ru_or_en())
            .is_none()
        {
            gaps.push(ProfileGap::Patronymic);
        }
        if self.date_of_birth.is_none() {
            gaps.push(ProfileGap::BirthDate);
        }
        if level_entries(&self.languages).is_empty() {
            gaps.push(ProfileGap::Languages);
        }
        gaps
    }

    /// `(last, first)` pair used for duplicate detection, preferring Russian
    /// spellings and falling back to English.
    pub fn duplicate_key(&self) -> Option<(String, String)> {
        let first = self.first_name.as_ref()?;
        let last = self.last_name.as_ref()?;
        match (last.ru.as_deref(), first.ru.as_deref()) {
            (Some(l), Some(f)) => Some((l.to_string(), f.to_string())),
            _ => Some((last.en_or_ru()?.to_string(), first.en_or_ru()?.to_string())),
        }
    }

    /// Drive folder name: `"{id}\n{Name Surname}"`, degrading gracefully when
    /// parts are missing.
    pub fn folder_name(&self, resume_id: &str) -> String {
        let first = self.first_name.as_ref().and_then(|b| b.ru_or_en());
        let last = self.last_name.as_ref().and_then(|b| b.ru_or_en());
        match (first, last) {
            (Some(f), Some(l)) => format!("{resume_id}\n{f} {l}"),
            (Some(f), None) => format!("{resume_id}\n{f}"),
            (None, Some(l)) => format!("{resume_id}\n{l}"),
            (None, None) => format!("{resume_id}\nРезюме"),
        }
    }

    /// Document title for generated resumes, e.g. `"Иван Иванов"`.
    pub fn document_title(&self, english: bool) -> String {
        let pick = |b: &Option<Bilingual>| -> Option<String> {
            let b = b.as_ref()?;
            let s = if english { b.en_or_ru() } else { b.ru_or_en() };
            s.map(str::to_string)
        };
        match (pick(&self.first_name), pick(&self.last_name)) {
            (Some(f), Some(l)) => format!("{f} {l}"),
            _ if english => "Resume (EN)".to_string(),
            _ => "Резюме (RU)".to_string(),
        }
    }

    /// All contact values in worksheet column order, one per line.
    pub fn contact_lines(&self) -> Vec<String> {
        vocab::CONTACT_FIELDS
            .iter()
            .filter_map(|field| {
                self.contacts
                    .get(*field)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
            })
            .collect()
    }
}

/// Keys whose value is `true` (or a non-empty string), in map order.
pub fn truthy_keys(map: &FacetMap) -> Vec<&str> {
    map.iter()
        .filter(|(_, v)| match v {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        })
        .map(|(k, _)| k.as_str())
        .collect()
}

/// `(key, level)` pairs for maps with string values (foreign languages).
pub fn level_entries(map: &FacetMap) -> Vec<(&str, &str)> {
    map.iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some((k.as_str(), s.as_str())),
            _ => None,
        })
        .collect()
}

/// Accepts a JSON string, number or null for fields the LLM formats loosely.
fn flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Runs the extraction LLM call for one resume.
pub async fn extract_profile(
    llm: &LlmClient,
    resume_text: &str,
    file_name: &str,
) -> Result<CandidateProfile, AppError> {
    let prompt = profile_extract_prompt(resume_text, file_name);
    llm.call_json::<CandidateProfile>(&prompt, PROFILE_EXTRACT_SYSTEM)
        .await
        .map_err(AppError::from)
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
                "patronymic": null,
                "dateOfBirth": "01.01.1990",
                "grade": {"Junior": false, "Middle": true, "Senior": false},
                "totalExperience": 8,
                "programmingLanguages": {"Python": true, "Go": false},
                "languages": {"English": "B2", "German": null},
                "contacts": {"email": "ivan@example.com", "phone": null},
                "salaryExpectations": {"amount": 200000, "currency": "RUB"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserializes_loose_llm_json() {
        let p = sample_profile();
        assert_eq!(p.total_experience.as_deref(), Some("8"));
        assert_eq!(p.first_name.as_ref().unwrap().ru.as_deref(), Some("Иван"));
        assert_eq!(truthy_keys(&p.grade), vec!["Middle"]);
        assert_eq!(truthy_keys(&p.programming_languages), vec!["Python"]);
    }

    #[test]
    fn test_salary_accessors() {
        let p = sample_profile();
        let salary = p.salary_expectations.unwrap();
        assert_eq!(salary.amount_value(), Some(200_000));
        assert_eq!(salary.parsed_currency(), Some(Currency::Rub));
        assert_eq!(salary.display().as_deref(), Some("200000 RUB"));
    }

    #[test]
    fn test_salary_amount_with_separators() {
        let salary = SalaryExpectation {
            amount: Some("от 200_000".to_string()),
            currency: Some("rub".to_string()),
        };
        assert_eq!(salary.amount_value(), Some(200_000));
        assert_eq!(salary.parsed_currency(), Some(Currency::Rub));
    }

    #[test]
    fn test_ensure_named() {
        let p = sample_profile();
        assert!(p.ensure_named().is_ok());

        let mut unnamed = p.clone();
        unnamed.last_name = None;
        assert!(matches!(
            unnamed.ensure_named(),
            Err(AppError::MissingName)
        ));
    }

    #[test]
    fn test_gaps_report_missing_patronymic_only() {
        let p = sample_profile();
        assert_eq!(p.gaps(), vec![ProfileGap::Patronymic]);
    }

    #[test]
    fn test_duplicate_key_prefers_russian() {
        let p = sample_profile();
        assert_eq!(
            p.duplicate_key(),
            Some(("Иванов".to_string(), "Иван".to_string()))
        );
    }

    #[test]
    fn test_duplicate_key_falls_back_to_english() {
        let mut p = sample_profile();
        p.last_name = Some(Bilingual {
            ru: None,
            en: Some("Ivanov".to_string()),
        });
        assert_eq!(
            p.duplicate_key(),
            Some(("Ivanov".to_string(), "Иван".to_string()))
        );
    }

    #[test]
    fn test_folder_name_variants() {
        let p = sample_profile();
        assert_eq!(p.folder_name("k_12345"), "k_12345\nИван Иванов");

        let empty = CandidateProfile::default();
        assert_eq!(empty.folder_name("k_12345"), "k_12345\nРезюме");
    }

    #[test]
    fn test_contact_lines_ordered_and_nonempty() {
        let p = sample_profile();
        assert_eq!(p.contact_lines(), vec!["ivan@example.com".to_string()]);
    }

    #[test]
    fn test_level_entries() {
        let p = sample_profile();
        assert_eq!(level_entries(&p.languages), vec![("English", "B2")]);
    }

    #[test]
    fn test_currency_search_columns() {
        assert_eq!(Currency::Rub.rate_search_column(), 1);
        assert_eq!(Currency::Usd.rate_search_column(), 2);
        assert_eq!(Currency::Eur.rate_search_column(), 3);
        assert_eq!(Currency::Byn.rate_search_column(), 4);
    }
}
