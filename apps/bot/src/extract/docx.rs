use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::AppError;

/// Extracts paragraph text from a DOCX byte stream.
///
/// A DOCX file is a zip package; the visible text lives in
/// `word/document.xml` as `<w:t>` runs grouped into `<w:p>` paragraphs.
pub fn extract(bytes: &[u8]) -> Result<String, AppError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Extraction(format!("DOCX: not a zip package: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Extraction(format!("DOCX: missing document body: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Extraction(format!("DOCX: {e}")))?;

    document_text(&xml)
}

fn document_text(xml: &str) -> Result<String, AppError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"br" => out.push('\n'),
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| AppError::Extraction(format!("DOCX: {e}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AppError::Extraction(format!("DOCX: {e}"))),
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Иван Иванов</w:t></w:r></w:p>
    <w:p><w:r><w:t>Python</w:t></w:r><w:r><w:t xml:space="preserve"> Developer</w:t></w:r></w:p>
    <w:p><w:r><w:br/><w:t>Минск</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn sample_docx() -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::FileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(SAMPLE_DOCUMENT.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_extract_paragraphs_and_runs() {
        let text = extract(&sample_docx()).unwrap();
        assert_eq!(text, "Иван Иванов\nPython Developer\n\nМинск\n");
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        assert!(extract(b"plain text").is_err());
    }

    #[test]
    fn test_extract_rejects_zip_without_body() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::FileOptions::default();
            writer.start_file("other.xml", options).unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        assert!(extract(&cursor.into_inner()).is_err());
    }
}
