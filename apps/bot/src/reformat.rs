//! Anonymized bilingual reformatting of one resume.

use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::llm::prompts::{reformat_prompt, REFORMAT_SYSTEM};
use crate::llm::LlmClient;
use crate::render::markup::clean_styled_text;

/// The two generated resume texts, styled with markup tags.
#[derive(Debug, Clone, Deserialize)]
pub struct ReformattedResume {
    pub russian: String,
    pub english: String,
}

/// Runs the reformatting LLM call and cleans both versions.
///
/// A reply that is not the expected JSON object is not fatal: the raw text is
/// used for both languages, as the last generation is still better than
/// nothing for the recruiter.
pub async fn reformat_resume(
    llm: &LlmClient,
    resume_text: &str,
    resume_id: &str,
) -> Result<ReformattedResume, AppError> {
    let prompt = reformat_prompt(resume_text, resume_id);
    let raw = llm.call_text(&prompt, REFORMAT_SYSTEM).await?;

    let parsed = match serde_json::from_str::<ReformattedResume>(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("reformat reply was not valid JSON ({e}); using raw text for both languages");
            ReformattedResume {
                russian: raw.clone(),
                english: raw,
            }
        }
    };

    Ok(ReformattedResume {
        russian: clean_styled_text(&parsed.russian),
        english: clean_styled_text(&parsed.english),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reformatted_resume_deserializes() {
        let parsed: ReformattedResume = serde_json::from_str(
            r##"{"russian": "<b color=\"#4A90E2\">РЕЗЮМЕ</b>", "english": "<b color=\"#4A90E2\">SUMMARY</b>"}"##,
        )
        .unwrap();
        assert!(parsed.russian.contains("РЕЗЮМЕ"));
        assert!(parsed.english.contains("SUMMARY"));
    }
}
