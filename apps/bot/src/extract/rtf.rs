use rtf_parser::RtfDocument;

use crate::errors::AppError;

/// Extracts text from an RTF byte stream.
///
/// RTF is 7-bit with escaped Cyrillic, so the raw bytes are read lossily
/// before parsing.
pub fn extract(bytes: &[u8]) -> Result<String, AppError> {
    let content = String::from_utf8_lossy(bytes);
    let document = RtfDocument::try_from(content.as_ref())
        .map_err(|e| AppError::Extraction(format!("RTF: {e:?}")))?;
    Ok(document.get_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_rtf() {
        let rtf = br"{\rtf1\ansi\deff0 {\fonttbl {\f0 Arial;}}\f0 Hello Resume}";
        let text = extract(rtf).unwrap();
        assert!(text.contains("Hello Resume"));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(extract(b"not an rtf at all").is_err());
    }
}
