//! PDF rendering of a parsed styled resume.
//!
//! Uses a TTF family from the configured font directory — the built-in PDF
//! fonts cannot shape Cyrillic, so rendering is only available when the
//! directory is configured (DejaVu Sans works well).

use std::path::{Path, PathBuf};

use genpdf::elements::{Break, Paragraph};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document, SimplePageDecorator};

use crate::errors::AppError;
use crate::render::markup::{Block, BlockKind, Span, SpanStyle};

const FONT_NAME: &str = "DejaVuSans";
const MARGIN_MM: i32 = 15;

const TITLE_SIZE: u8 = 16;
const SECTION_SIZE: u8 = 14;
const SUBHEADER_SIZE: u8 = 12;
const BODY_SIZE: u8 = 11;
const SECONDARY_SIZE: u8 = 10;

const BLUE: Color = Color::Rgb(74, 144, 226);
const GRAY: Color = Color::Rgb(85, 85, 85);
const GRAY_DARK: Color = Color::Rgb(51, 51, 51);

pub struct PdfRenderer {
    font_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(font_dir: &Path) -> Self {
        Self {
            font_dir: font_dir.to_path_buf(),
        }
    }

    /// Renders blocks into a PDF byte stream.
    pub fn render(&self, title: &str, blocks: &[Block]) -> Result<Vec<u8>, AppError> {
        let family = genpdf::fonts::from_files(&self.font_dir, FONT_NAME, None)
            .map_err(|e| AppError::Render(format!("PDF fonts: {e}")))?;

        let mut doc = Document::new(family);
        doc.set_title(title);
        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(MARGIN_MM);
        doc.set_page_decorator(decorator);

        let mut title_paragraph = Paragraph::default();
        title_paragraph.push_styled(
            title,
            Style::new()
                .bold()
                .with_font_size(TITLE_SIZE)
                .with_color(GRAY_DARK),
        );
        doc.push(title_paragraph.aligned(Alignment::Center));
        doc.push(Break::new(1.0));

        for block in blocks {
            match block.kind {
                BlockKind::Blank => doc.push(Break::new(1.0)),
                BlockKind::SectionHeader => {
                    let mut p = Paragraph::default();
                    p.push_styled(
                        block.text(),
                        Style::new()
                            .bold()
                            .with_font_size(SECTION_SIZE)
                            .with_color(BLUE),
                    );
                    doc.push(p);
                }
                BlockKind::SubHeader => {
                    let mut p = Paragraph::default();
                    p.push_styled(
                        block.text(),
                        Style::new().bold().with_font_size(SUBHEADER_SIZE),
                    );
                    doc.push(p);
                }
                BlockKind::Secondary | BlockKind::Body => {
                    let mut p = Paragraph::default();
                    for span in &block.spans {
                        p.push_styled(span.text.clone(), span_style(span, block.kind));
                    }
                    doc.push(p);
                }
            }
        }

        let mut buf = Vec::new();
        doc.render(&mut buf)
            .map_err(|e| AppError::Render(format!("PDF: {e}")))?;
        Ok(buf)
    }
}

fn span_style(span: &Span, kind: BlockKind) -> Style {
    let size = if kind == BlockKind::Secondary {
        SECONDARY_SIZE
    } else {
        BODY_SIZE
    };
    let style = Style::new().with_font_size(size);
    match span.style {
        SpanStyle::Plain => style,
        SpanStyle::Bold => style.bold(),
        SpanStyle::Secondary => style.with_font_size(SECONDARY_SIZE).with_color(GRAY),
        SpanStyle::Accent => style.with_color(BLUE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fails_cleanly_without_fonts() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path());
        let err = renderer.render("Resume", &[]).unwrap_err();
        assert!(matches!(err, AppError::Render(msg) if msg.contains("fonts")));
    }
}
