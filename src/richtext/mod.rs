//! Structured rich-text rendering
//!
//! Article bodies arrive as Prismic rich-text blocks: a block type, its plain
//! text and a list of character-offset spans. The content is untrusted, so
//! nothing from it is ever emitted as markup. Text and attribute values are
//! escaped and only a short list of link schemes is allowed through.

use serde::{Deserialize, Serialize};

/// Link schemes allowed in hyperlink spans
const SAFE_LINK_SCHEMES: &[&str] = &["http://", "https://", "mailto:"];

/// Image sources must be absolute web URLs
const SAFE_IMAGE_SCHEMES: &[&str] = &["http://", "https://"];

/// A single rich-text block (paragraph, heading, list item...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RichTextBlock {
    /// Block type as named by the content API (`paragraph`, `heading2`, ...)
    #[serde(rename = "type", default = "default_block_type")]
    pub kind: String,

    /// Plain text content
    #[serde(default)]
    pub text: String,

    /// Inline formatting ranges over `text`
    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image source (image blocks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Image alt text (image blocks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

fn default_block_type() -> String {
    "paragraph".to_string()
}

impl RichTextBlock {
    /// A plain paragraph without spans
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: default_block_type(),
            text: text.into(),
            ..Default::default()
        }
    }
}

/// An inline formatting range, offsets counted in characters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

/// Extra span payload (hyperlinks)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Render a sequence of blocks to safe HTML
///
/// Consecutive `list-item` / `o-list-item` blocks are grouped into a single
/// `<ul>` / `<ol>`.
pub fn render_blocks(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

/// Render one block to safe HTML
pub fn render_block(block: &RichTextBlock) -> String {
    match block.kind.as_str() {
        "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
            let level = &block.kind["heading".len()..];
            format!("<h{}>{}</h{}>", level, render_inline(block), level)
        }
        "preformatted" => format!("<pre>{}</pre>", escape(&block.text)),
        "list-item" | "o-list-item" => format!("<li>{}</li>", render_inline(block)),
        "image" => match block.url.as_deref() {
            Some(url) if has_scheme(url, SAFE_IMAGE_SCHEMES) => format!(
                r#"<img src="{}" alt="{}">"#,
                escape(url),
                escape(block.alt.as_deref().unwrap_or(""))
            ),
            _ => String::new(),
        },
        _ => format!("<p>{}</p>", render_inline(block)),
    }
}

/// Render a block's text with its spans applied
fn render_inline(block: &RichTextBlock) -> String {
    let chars: Vec<char> = block.text.chars().collect();
    let len = chars.len();

    let spans: Vec<&Span> = block
        .spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len)
        .collect();

    let mut boundaries: Vec<usize> = vec![0, len];
    for span in &spans {
        boundaries.push(span.start);
        boundaries.push(span.end.min(len));
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut html = String::new();
    for window in boundaries.windows(2) {
        let (from, to) = (window[0], window[1]);
        let segment: String = chars[from..to].iter().collect();
        let segment = escape(&segment).replace('\n', "<br />");

        let mut active: Vec<&Span> = spans
            .iter()
            .copied()
            .filter(|s| s.start <= from && s.end.min(len) >= to)
            .collect();
        // Outer spans first so tags nest properly
        active.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut closing = Vec::new();
        for span in &active {
            if let Some((open, close)) = span_tags(span) {
                html.push_str(&open);
                closing.push(close);
            }
        }
        html.push_str(&segment);
        for close in closing.into_iter().rev() {
            html.push_str(close);
        }
    }

    html
}

/// Opening and closing tags for a span, `None` when it renders as plain text
fn span_tags(span: &Span) -> Option<(String, &'static str)> {
    match span.kind.as_str() {
        "strong" => Some(("<strong>".to_string(), "</strong>")),
        "em" => Some(("<em>".to_string(), "</em>")),
        "hyperlink" => {
            let data = span.data.as_ref()?;
            let url = data.url.as_deref()?;
            if !has_scheme(url, SAFE_LINK_SCHEMES) {
                return None;
            }
            let open = if data.target.as_deref() == Some("_blank") {
                format!(
                    r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
                    escape(url)
                )
            } else {
                format!(r#"<a href="{}">"#, escape(url))
            };
            Some((open, "</a>"))
        }
        _ => None,
    }
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    schemes.iter().any(|scheme| lower.starts_with(scheme))
}

fn escape(s: &str) -> String {
    tera::escape_html(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, kind: &str) -> Span {
        Span {
            start,
            end,
            kind: kind.to_string(),
            data: None,
        }
    }

    fn link(start: usize, end: usize, url: &str) -> Span {
        Span {
            start,
            end,
            kind: "hyperlink".to_string(),
            data: Some(SpanData {
                url: Some(url.to_string()),
                target: None,
            }),
        }
    }

    #[test]
    fn test_plain_paragraph_is_escaped() {
        let block = RichTextBlock::paragraph("<script>alert(1)</script>");
        let html = render_block(&block);
        assert!(html.starts_with("<p>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_strong_and_em_spans() {
        let block = RichTextBlock {
            spans: vec![span(0, 5, "strong"), span(6, 11, "em")],
            ..RichTextBlock::paragraph("Hello world")
        };
        assert_eq!(
            render_block(&block),
            "<p><strong>Hello</strong> <em>world</em></p>"
        );
    }

    #[test]
    fn test_nested_spans_close_in_order() {
        let block = RichTextBlock {
            spans: vec![span(0, 9, "strong"), span(0, 4, "em")],
            ..RichTextBlock::paragraph("some text")
        };
        assert_eq!(
            render_block(&block),
            "<p><strong><em>some</em></strong><strong> text</strong></p>"
        );
    }

    #[test]
    fn test_unsafe_link_is_dropped() {
        let block = RichTextBlock {
            spans: vec![link(0, 5, "javascript:alert(1)")],
            ..RichTextBlock::paragraph("click")
        };
        assert_eq!(render_block(&block), "<p>click</p>");
    }

    #[test]
    fn test_safe_link_is_kept() {
        let block = RichTextBlock {
            spans: vec![link(0, 4, "https://example.com/?a=1&b=2")],
            ..RichTextBlock::paragraph("here")
        };
        let html = render_block(&block);
        assert!(html.contains("<a href=\"https:&#x2F;&#x2F;example.com&#x2F;?a=1&amp;b=2\">here</a>"));
    }

    #[test]
    fn test_list_items_are_grouped() {
        let blocks = vec![
            RichTextBlock {
                kind: "list-item".to_string(),
                ..RichTextBlock::paragraph("one")
            },
            RichTextBlock {
                kind: "list-item".to_string(),
                ..RichTextBlock::paragraph("two")
            },
            RichTextBlock::paragraph("after"),
        ];
        assert_eq!(
            render_blocks(&blocks),
            "<ul><li>one</li><li>two</li></ul><p>after</p>"
        );
    }

    #[test]
    fn test_heading_and_line_breaks() {
        let heading = RichTextBlock {
            kind: "heading2".to_string(),
            ..RichTextBlock::paragraph("Title")
        };
        assert_eq!(render_block(&heading), "<h2>Title</h2>");

        let para = RichTextBlock::paragraph("a\nb");
        assert_eq!(render_block(&para), "<p>a<br />b</p>");
    }

    #[test]
    fn test_spans_past_end_are_clamped() {
        let block = RichTextBlock {
            spans: vec![span(2, 50, "em"), span(40, 60, "strong")],
            ..RichTextBlock::paragraph("abcd")
        };
        assert_eq!(render_block(&block), "<p>ab<em>cd</em></p>");
    }
}
