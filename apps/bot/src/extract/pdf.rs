use crate::errors::AppError;

/// Extracts text from a PDF byte stream.
pub fn extract(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("PDF: {e}")))
}
