//! DOCX rendering of a parsed styled resume.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Paragraph, Run, RunFonts};

use crate::errors::AppError;
use crate::render::markup::{Block, BlockKind, Span, SpanStyle, BLUE_DARK, GRAY, GRAY_DARK};

const FONT: &str = "Calibri";

// docx-rs sizes are half-points.
const TITLE_SIZE: usize = 32;
const SECTION_SIZE: usize = 28;
const SUBHEADER_SIZE: usize = 24;
const BODY_SIZE: usize = 22;
const SECONDARY_SIZE: usize = 20;

/// Renders blocks into a DOCX byte stream with the corporate styling.
pub fn render_docx(title: &str, blocks: &[Block]) -> Result<Vec<u8>, AppError> {
    let mut docx = Docx::new();

    let title_run = styled_run(title, TITLE_SIZE, true, Some(GRAY_DARK));
    docx = docx.add_paragraph(
        Paragraph::new()
            .add_run(title_run)
            .align(AlignmentType::Center),
    );

    for block in blocks {
        docx = docx.add_paragraph(block_paragraph(block));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| AppError::Render(format!("DOCX: {e}")))?;
    Ok(cursor.into_inner())
}

fn block_paragraph(block: &Block) -> Paragraph {
    match block.kind {
        BlockKind::Blank => Paragraph::new(),
        BlockKind::SectionHeader => Paragraph::new().add_run(styled_run(
            &block.text(),
            SECTION_SIZE,
            true,
            Some(BLUE_DARK),
        )),
        BlockKind::SubHeader => {
            Paragraph::new().add_run(styled_run(&block.text(), SUBHEADER_SIZE, true, None))
        }
        BlockKind::Secondary | BlockKind::Body => {
            let mut paragraph = Paragraph::new();
            for span in &block.spans {
                paragraph = paragraph.add_run(span_run(span, block.kind));
            }
            paragraph
        }
    }
}

fn span_run(span: &Span, kind: BlockKind) -> Run {
    let size = if kind == BlockKind::Secondary {
        SECONDARY_SIZE
    } else {
        BODY_SIZE
    };
    match span.style {
        SpanStyle::Plain => styled_run(&span.text, size, false, None),
        SpanStyle::Bold => styled_run(&span.text, size, true, None),
        SpanStyle::Secondary => styled_run(&span.text, SECONDARY_SIZE, false, Some(GRAY)),
        SpanStyle::Accent => styled_run(&span.text, size, false, Some(BLUE_DARK)),
    }
}

fn styled_run(text: &str, size: usize, bold: bool, color: Option<&str>) -> Run {
    let mut run = Run::new()
        .add_text(text)
        .fonts(RunFonts::new().ascii(FONT))
        .size(size);
    if bold {
        run = run.bold();
    }
    if let Some(color) = color {
        run = run.color(color);
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::markup::parse_blocks;
    use std::io::Read;

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_render_docx_carries_text_and_colors() {
        let blocks = parse_blocks(
            "<b color=\"#4A90E2\">Навыки</b>\nPython, Django\n<font color=\"#555555\">2020 | Минск</font>",
        );
        let bytes = render_docx("Иван Иванов", &blocks).unwrap();
        let xml = document_xml(&bytes);
        assert!(xml.contains("Иван Иванов"));
        assert!(xml.contains("НАВЫКИ"));
        assert!(xml.contains("Python, Django"));
        assert!(xml.contains(BLUE_DARK));
        assert!(xml.contains(GRAY));
    }

    #[test]
    fn test_render_docx_empty_blocks_is_still_a_package() {
        let bytes = render_docx("Resume", &[]).unwrap();
        assert!(document_xml(&bytes).contains("Resume"));
    }
}
