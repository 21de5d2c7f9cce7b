//! Styled-text model for generated resumes.
//!
//! The reformatting LLM emits lightly-tagged text: `<b color="#4A90E2">`
//! section headers, `<font color="#555555">` secondary fragments and plain
//! `<b>` subheaders. This module repairs the common LLM formatting defects
//! (bare hex colors, markdown residue, replacement characters) and parses
//! the text into typed blocks that both renderers consume.

use once_cell::sync::Lazy;
use regex::Regex;

/// Corporate palette.
pub const BLUE_DARK: &str = "1F4E79";
pub const BLUE: &str = "4A90E2";
pub const GRAY: &str = "555555";
pub const GRAY_DARK: &str = "333333";

static BARE_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"color="([0-9A-Fa-f]{3,6})""#).unwrap());
static MD_BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{1,2}([^*]+)\*{1,2}").unwrap());
static MD_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#{1,6}\s*").unwrap());
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static SECTION_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"(?i)<b color="#(1F4E79|4A90E2)">(.*?)</b>"##).unwrap());
static PLAIN_BOLD_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<b>(.*?)</b>").unwrap());
static SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"(?i)<font color="#([0-9A-Fa-f]{3,6})">(.*?)</font>|<b>(.*?)</b>"##).unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Restores the `#` the LLM tends to drop from hex colors:
/// `color="4A90E2"` → `color="#4A90E2"`.
pub fn fix_color_attributes(text: &str) -> String {
    BARE_COLOR_RE
        .replace_all(text, r##"color="#${1}""##)
        .into_owned()
}

/// Strips markdown bold/heading residue the LLM mixes into tagged text.
pub fn strip_markdown(text: &str) -> String {
    let text = MD_BOLD_RE.replace_all(text, "$1");
    MD_HEADING_RE.replace_all(&text, "").into_owned()
}

/// Removes replacement/box characters that leak in from bad PDF extractions.
pub fn strip_garbage(text: &str) -> String {
    text.replace(['■', '\u{FFFD}'], "")
}

/// Full cleanup pass applied to each generated resume before parsing.
pub fn clean_styled_text(text: &str) -> String {
    let text = strip_markdown(text);
    let text = fix_color_attributes(&text);
    strip_garbage(&text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Blue uppercase section header (НАВЫКИ / SKILLS / ...).
    SectionHeader,
    /// Bold black subheader (position — company).
    SubHeader,
    /// Gray line (dates, locations).
    Secondary,
    Body,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Bold,
    /// Gray `#555555` fragments.
    Secondary,
    /// Blue `#4A90E2`/`#1F4E79` fragments.
    Accent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl Block {
    fn plain(kind: BlockKind, text: String) -> Self {
        Block {
            kind,
            spans: vec![Span {
                text,
                style: SpanStyle::Plain,
            }],
        }
    }

    /// Concatenated span text (used by tests and renderers for headers).
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Parses cleaned styled text into renderable blocks, one per input line.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for raw_line in text.lines() {
        let line = BR_RE.replace_all(raw_line.trim(), "").into_owned();
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");

        if line.is_empty() {
            blocks.push(Block {
                kind: BlockKind::Blank,
                spans: Vec::new(),
            });
            continue;
        }

        if let Some(caps) = SECTION_HEADER_RE.captures(&line) {
            let header = strip_tags(&caps[2]).to_uppercase();
            blocks.push(Block::plain(BlockKind::SectionHeader, header));
            continue;
        }

        // A line that is entirely one <b>…</b> tag is a subheader.
        if let Some(caps) = PLAIN_BOLD_LINE_RE.captures(&line) {
            if caps.get(0).map(|m| m.as_str().len()) == Some(line.len()) {
                blocks.push(Block::plain(BlockKind::SubHeader, strip_tags(&caps[1])));
                continue;
            }
        }

        let spans = parse_spans(&line);
        let kind = if spans
            .iter()
            .any(|s| s.style == SpanStyle::Secondary)
        {
            BlockKind::Secondary
        } else {
            BlockKind::Body
        };
        blocks.push(Block { kind, spans });
    }

    blocks
}

/// Splits one line into styled spans, honoring `<font color>` and `<b>` tags.
fn parse_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for m in SPAN_RE.captures_iter(line) {
        let whole = m.get(0).unwrap();
        if whole.start() > cursor {
            push_plain(&mut spans, &line[cursor..whole.start()]);
        }
        if let (Some(color), Some(content)) = (m.get(1), m.get(2)) {
            let style = match color.as_str().to_ascii_uppercase().as_str() {
                BLUE | BLUE_DARK => SpanStyle::Accent,
                _ => SpanStyle::Secondary,
            };
            spans.push(Span {
                text: strip_tags(content.as_str()),
                style,
            });
        } else if let Some(content) = m.get(3) {
            spans.push(Span {
                text: strip_tags(content.as_str()),
                style: SpanStyle::Bold,
            });
        }
        cursor = whole.end();
    }
    if cursor < line.len() {
        push_plain(&mut spans, &line[cursor..]);
    }

    spans
}

fn push_plain(spans: &mut Vec<Span>, text: &str) {
    let text = strip_tags(text);
    if !text.is_empty() {
        spans.push(Span {
            text,
            style: SpanStyle::Plain,
        });
    }
}

/// Drops any tags left over after span extraction.
fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_color_attributes_adds_missing_hash() {
        assert_eq!(
            fix_color_attributes(r#"<b color="4A90E2">X</b>"#),
            r##"<b color="#4A90E2">X</b>"##
        );
        // Already-correct values stay untouched.
        assert_eq!(
            fix_color_attributes(r##"<b color="#4A90E2">X</b>"##),
            r##"<b color="#4A90E2">X</b>"##
        );
    }

    #[test]
    fn test_strip_markdown() {
        assert_eq!(strip_markdown("**жирный** и ## заголовок"), "жирный и заголовок");
        assert_eq!(strip_markdown("*одна звезда*"), "одна звезда");
    }

    #[test]
    fn test_strip_garbage() {
        assert_eq!(strip_garbage("текст■ и \u{FFFD}мусор"), "текст и мусор");
    }

    #[test]
    fn test_parse_section_header_uppercases() {
        let blocks = parse_blocks(r##"<b color="#4A90E2">Навыки</b>"##);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::SectionHeader);
        assert_eq!(blocks[0].text(), "НАВЫКИ");
    }

    #[test]
    fn test_parse_section_header_accepts_legacy_color() {
        let blocks = parse_blocks(r##"<b color="#1F4E79">Skills</b>"##);
        assert_eq!(blocks[0].kind, BlockKind::SectionHeader);
    }

    #[test]
    fn test_parse_subheader() {
        let blocks = parse_blocks("<b>Python Developer — Acme</b>");
        assert_eq!(blocks[0].kind, BlockKind::SubHeader);
        assert_eq!(blocks[0].text(), "Python Developer — Acme");
    }

    #[test]
    fn test_parse_secondary_line_with_mixed_spans() {
        let blocks =
            parse_blocks(r##"<font color="#555555">2020 — 2023 | Минск</font> remote"##);
        assert_eq!(blocks[0].kind, BlockKind::Secondary);
        assert_eq!(
            blocks[0].spans,
            vec![
                Span {
                    text: "2020 — 2023 | Минск".to_string(),
                    style: SpanStyle::Secondary,
                },
                Span {
                    text: "remote".to_string(),
                    style: SpanStyle::Plain,
                },
            ]
        );
    }

    #[test]
    fn test_parse_inline_bold_stays_body() {
        let blocks = parse_blocks("Стек: <b>Python</b>, Django");
        assert_eq!(blocks[0].kind, BlockKind::Body);
        assert_eq!(blocks[0].spans[1].style, SpanStyle::Bold);
    }

    #[test]
    fn test_blank_lines_and_br_tags() {
        let blocks = parse_blocks("строка\n\n<br>\nещё");
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Body,
                BlockKind::Blank,
                BlockKind::Blank,
                BlockKind::Body
            ]
        );
    }

    #[test]
    fn test_clean_styled_text_pipeline() {
        let cleaned = clean_styled_text(r#"**X** <b color="555555">y</b>■"#);
        assert_eq!(cleaned, r##"X <b color="#555555">y</b>"##);
    }

    #[test]
    fn test_unknown_tags_are_dropped() {
        let blocks = parse_blocks("<i>курсив</i> текст");
        assert_eq!(blocks[0].text(), "курсив текст");
    }
}
