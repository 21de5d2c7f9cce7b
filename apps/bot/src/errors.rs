use thiserror::Error;

use crate::drive::DriveError;
use crate::llm::LlmError;
use crate::sheets::SheetsError;

/// Application-level error type.
///
/// `user_message()` maps every variant to a short chat reply so handlers can
/// report failures without leaking API keys, URLs or payload fragments into
/// the conversation. Full details go to the log instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("drive error: {0}")]
    Drive(#[from] DriveError),

    #[error("render error: {0}")]
    Render(String),

    #[error("candidate {last} {first} already exists")]
    Duplicate { last: String, first: String },

    #[error("resume carries no first/last name")]
    MissingName,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short, user-facing reply for a failed operation.
    pub fn user_message(&self) -> String {
        match self {
            AppError::UnsupportedFormat(ext) => {
                format!("❌ Формат .{ext} не поддерживается. Отправьте PDF, DOCX, RTF или TXT.")
            }
            AppError::Extraction(_) => {
                "❌ Не удалось извлечь текст из файла.".to_string()
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                "❌ Не удалось обработать текст резюме.".to_string()
            }
            AppError::Sheets(e) => {
                tracing::error!("Sheets error: {e}");
                "⚠️ Не удалось записать данные в таблицу. Проверьте настройки.".to_string()
            }
            AppError::Drive(e) => {
                tracing::error!("Drive error: {e}");
                "❌ Не удалось отправить файл в Google Drive.".to_string()
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                "⚠️ Не удалось сгенерировать документ.".to_string()
            }
            AppError::Duplicate { last, first } => {
                format!("⚠️ Кандидат {last} {first} уже существует в базе данных!")
            }
            AppError::MissingName => {
                "❌ В резюме нет имени или фамилии. Пожалуйста, уточните их.".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {e}");
                "❌ Ошибка при работе с файлом.".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "❌ Внутренняя ошибка. Попробуйте ещё раз.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::Internal(anyhow::anyhow!("secret token abc123"));
        assert!(!err.user_message().contains("abc123"));
    }

    #[test]
    fn test_duplicate_message_names_candidate() {
        let err = AppError::Duplicate {
            last: "Иванов".to_string(),
            first: "Иван".to_string(),
        };
        assert!(err.user_message().contains("Иванов Иван"));
    }

    #[test]
    fn test_unsupported_format_names_extension() {
        let err = AppError::UnsupportedFormat("odt".to_string());
        assert!(err.user_message().contains(".odt"));
    }
}
