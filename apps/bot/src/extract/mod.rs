//! Text extraction from uploaded resume files.
//!
//! One extractor per supported format; every extractor returns plain text
//! with blank lines collapsed, ready for the LLM calls.

mod docx;
mod pdf;
mod rtf;

use std::path::Path;

use crate::errors::AppError;

/// Supported resume file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Rtf,
    Txt,
}

impl FileKind {
    /// Determines the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "docx" => Ok(FileKind::Docx),
            "rtf" => Ok(FileKind::Rtf),
            "txt" => Ok(FileKind::Txt),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Pdf => "PDF",
            FileKind::Docx => "DOCX",
            FileKind::Rtf => "RTF",
            FileKind::Txt => "TXT",
        }
    }

    /// MIME type used when uploading the original file to the drive.
    pub fn mime_type(self) -> &'static str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileKind::Rtf => "application/rtf",
            FileKind::Txt => "text/plain",
        }
    }
}

/// Reads a staged file and extracts its plain text.
pub async fn extract_text(path: &Path) -> Result<(FileKind, String), AppError> {
    let kind = FileKind::from_path(path)?;
    let bytes = tokio::fs::read(path).await?;

    let text = match kind {
        FileKind::Pdf => pdf::extract(&bytes)?,
        FileKind::Docx => docx::extract(&bytes)?,
        FileKind::Rtf => rtf::extract(&bytes)?,
        FileKind::Txt => decode_text(&bytes),
    };

    Ok((kind, collapse_blank_lines(&text)))
}

/// Decodes a TXT upload: strict UTF-8 first, then CP1251 (the usual Russian
/// legacy encoding), then lossy UTF-8 as a last resort.
fn decode_text(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    let (decoded, _, had_errors) = encoding_rs::WINDOWS_1251.decode(bytes);
    if !had_errors {
        return decoded.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Trims every line and drops empty ones.
fn collapse_blank_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_kind_from_path() {
        assert_eq!(
            FileKind::from_path(&PathBuf::from("a/b/Resume.PDF")).unwrap(),
            FileKind::Pdf
        );
        assert_eq!(
            FileKind::from_path(&PathBuf::from("r.docx")).unwrap(),
            FileKind::Docx
        );
        assert!(matches!(
            FileKind::from_path(&PathBuf::from("r.odt")),
            Err(AppError::UnsupportedFormat(ext)) if ext == "odt"
        ));
        assert!(FileKind::from_path(&PathBuf::from("no_extension")).is_err());
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(
            collapse_blank_lines("  a  \n\n\n b\n   \nc"),
            "a\nb\nc"
        );
    }

    #[test]
    fn test_decode_text_utf8() {
        assert_eq!(decode_text("Привет".as_bytes()), "Привет");
    }

    #[test]
    fn test_decode_text_cp1251() {
        // "Привет" in CP1251
        let bytes = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_eq!(decode_text(&bytes), "Привет");
    }

    #[tokio::test]
    async fn test_extract_text_txt_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        tokio::fs::write(&path, "Иван Иванов\n\nPython Developer\n")
            .await
            .unwrap();

        let (kind, text) = extract_text(&path).await.unwrap();
        assert_eq!(kind, FileKind::Txt);
        assert_eq!(text, "Иван Иванов\nPython Developer");
    }
}
