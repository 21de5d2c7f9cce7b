//! Prompt constants and builders for the two pipeline LLM calls.

use crate::vocab;

/// System prompt for candidate-field extraction — enforces JSON-only output.
pub const PROFILE_EXTRACT_SYSTEM: &str =
    "You are an expert IT recruiter extracting structured candidate data from resumes. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT invent information that is not present in the resume text.";

/// Extraction prompt template. Placeholders: `{resume_text}`, `{file_info}`
/// plus one `{*_values}` slot per controlled vocabulary.
const PROFILE_EXTRACT_TEMPLATE: &str = r#"Extract the fields below from the resume text and return them as a single JSON object.

IMPORTANT: use only information explicitly present in the resume. Missing
string fields are null; missing map fields are empty objects {}.

RESUME TEXT:
{resume_text}
{file_info}
FIELDS:

Basic information:
- "specialization": the main role, strictly as "<Technology> Developer" / "<Area> Engineer" (e.g. "Python Developer", "DevOps Engineer"), without the word "Developer" translated.
- "firstName", "lastName", "patronymic": objects {"ru": "...", "en": "..."} — always fill BOTH spellings, transliterating when only one is present.
- "dateOfBirth": string "DD.MM.YYYY".
- "grade": map over {grade_values}, e.g. {"Junior": false, "Middle": true}.
- "totalExperience": total years in IT, as written.
- "specialExperience": strictly "<Role> - <N> years" for the primary role.
- "dateOfExit": earliest date the candidate can start, if stated.

Technical skills (maps over the allowed values only, true when found):
- "programmingLanguages": {prog_lang_values}
- "frameworks": {framework_values}
- "technologies": {tech_values}
- "roles": {roles_values}

Contact information:
- "location": {"ru": "...", "en": "..."} country.
- "city": {"ru": "...", "en": "..."} city.
- "contacts": object with keys {contact_fields}; unknown entries are null.
- "portfolio": map over {portfolio_values}.

Languages and projects:
- "languages": map over {language_values} with CEFR level strings as values
  (e.g. {"English": "B2"}); omit languages that are not mentioned.
- "projectIndustries": map over {industry_values}.

Work conditions:
- "availability": map over {availability_values}.
- "workTime": map over {work_time_values}.
- "workForm": map over {work_form_values}.
- "salaryExpectations": {"amount": "150000", "currency": "RUB"}. Currency is
  one of RUB, USD, EUR, BYN, uppercase; "у.е." always means USD. If the text
  has no salary, check the FILE NAME — figures like "от 200_000" or "2500"
  there are salary expectations (bare large numbers are RUB).
- "rateRub": hourly rate in rubles, if stated.
"#;

/// Builds the extraction prompt for one resume.
pub fn profile_extract_prompt(resume_text: &str, file_name: &str) -> String {
    let file_info = if file_name.is_empty() {
        String::new()
    } else {
        format!("\nFILE NAME: {file_name}\n")
    };
    PROFILE_EXTRACT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{file_info}", &file_info)
        .replace("{grade_values}", &vocab::quoted_list(vocab::GRADES))
        .replace(
            "{prog_lang_values}",
            &vocab::quoted_list(vocab::PROGRAMMING_LANGUAGES),
        )
        .replace("{framework_values}", &vocab::quoted_list(vocab::FRAMEWORKS))
        .replace("{tech_values}", &vocab::quoted_list(vocab::TECHNOLOGIES))
        .replace("{roles_values}", &vocab::quoted_list(vocab::ROLES))
        .replace(
            "{contact_fields}",
            &vocab::quoted_list(vocab::CONTACT_FIELDS),
        )
        .replace("{portfolio_values}", &vocab::quoted_list(vocab::PORTFOLIO))
        .replace(
            "{language_values}",
            &vocab::quoted_list(vocab::FOREIGN_LANGUAGES),
        )
        .replace(
            "{industry_values}",
            &vocab::quoted_list(vocab::PROJECT_INDUSTRIES),
        )
        .replace(
            "{availability_values}",
            &vocab::quoted_list(vocab::AVAILABILITY),
        )
        .replace(
            "{work_time_values}",
            &vocab::quoted_list(vocab::WORK_SCHEDULES),
        )
        .replace(
            "{work_form_values}",
            &vocab::quoted_list(vocab::EMPLOYMENT_FORMS),
        )
}

/// System prompt for the anonymized bilingual reformatting call.
pub const REFORMAT_SYSTEM: &str =
    "You are a professional resume formatter working with international IT \
    companies. You restructure candidate resumes into a strict corporate \
    format without inventing a single fact. \
    You MUST respond with valid JSON only, no markdown fences, no commentary.";

/// Reformatting prompt template. Placeholders: `{resume_text}`, `{resume_id}`.
const REFORMAT_TEMPLATE: &str = r##"Rewrite the resume below into the corporate bilingual format.

CRITICAL: do NOT invent or add information that is absent from the source
resume. Sections with no content are omitted entirely.

1. Anonymization — remove:
- last name, patronymic
- phone, email, Skype and all other direct contacts
- social-network links (LinkedIn, GitHub, ...)
- home address (country and city stay)
- any salary expectations

Keep only the first name, rendered as "Name (ID-{resume_id})".

2. Styling — use these inline tags in the text:
- <b color="#4A90E2">SECTION HEADER</b> — blue, UPPERCASE
- <font color="#555555">secondary text</font> — gray (dates, cities, companies)
- <b>subheader</b> — bold black
Technologies stay plain black text. Always include the "#" in color values.

3. Mandatory section order (include only non-empty sections).

Russian version:
<b color="#4A90E2">ИНФОРМАЦИЯ О КАНДИДАТЕ</b> — name with id, grade and
specialization, location;
<b color="#4A90E2">РЕЗЮМЕ</b> — one paragraph: experience, key technologies,
specialization, certifications, projects;
<b color="#4A90E2">НАВЫКИ</b> — grouped lists (languages & platforms, UI &
frameworks, integrations, tools, CI/CD & DevOps);
<b color="#4A90E2">ОПЫТ РАБОТЫ</b> — per position: role — company,
<font color="#555555">period | location</font>, project description,
industry, tasks and achievements, technologies;
<b color="#4A90E2">ОБРАЗОВАНИЕ</b>;
<b color="#4A90E2">СЕРТИФИКАТЫ</b>;
<b color="#4A90E2">ДОПОЛНИТЕЛЬНО</b> — languages with levels, open source,
mentoring.

English version: the same structure with headers CANDIDATE INFO, SUMMARY,
SKILLS, WORK EXPERIENCE, EDUCATION, CERTIFICATIONS, ADDITIONAL INFORMATION.
The English version must contain no Cyrillic characters at all — transliterate
the first name.

If the source resume is Russian, produce the English version by translation,
and vice versa.

Return STRICTLY this JSON shape:
{"russian": "<full Russian resume with style tags>",
 "english": "<full English resume with style tags>"}

RESUME TEXT:
{resume_text}
"##;

/// Builds the reformatting prompt for one resume.
pub fn reformat_prompt(resume_text: &str, resume_id: &str) -> String {
    REFORMAT_TEMPLATE
        .replace("{resume_id}", resume_id)
        .replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prompt_interpolates_everything() {
        let prompt = profile_extract_prompt("Иван Иванов, Python", "ivanov.pdf");
        assert!(prompt.contains("Иван Иванов"));
        assert!(prompt.contains("FILE NAME: ivanov.pdf"));
        assert!(prompt.contains("\"Junior\""));
        assert!(prompt.contains("\"FinTech\""));
        assert!(!prompt.contains("{grade_values}"));
        assert!(!prompt.contains("{work_form_values}"));
    }

    #[test]
    fn test_extract_prompt_without_file_name() {
        let prompt = profile_extract_prompt("text", "");
        assert!(!prompt.contains("FILE NAME"));
    }

    #[test]
    fn test_reformat_prompt_carries_id() {
        let prompt = reformat_prompt("text", "k_12345");
        assert!(prompt.contains("(ID-k_12345)"));
        assert!(prompt.ends_with("text\n"));
    }
}
