//! Markdown abstracts to document paragraphs.
//!
//! Talk descriptions are written in markdown. The document model has one style per
//! paragraph, so inline emphasis is flattened; block structure (paragraphs, headings,
//! list items, code blocks) is kept.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use super::document::{Paragraph, TextStyle};

/// Convert markdown into paragraphs based on `base`.
///
/// Headings use the bold variant of `base`, list items are prefixed with a bullet.
pub fn markdown_to_paragraphs(markdown: &str, base: TextStyle) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut style = base;
    let mut list_depth = 0usize;

    let flush = |current: &mut String, style: TextStyle, out: &mut Vec<Paragraph>| {
        let text = current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            out.push(Paragraph::new(text, style));
        }
        current.clear();
    };

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                flush(&mut current, style, &mut paragraphs);
                style = base.bold();
            }
            Event::End(TagEnd::Heading(_)) => {
                flush(&mut current, style, &mut paragraphs);
                style = base;
            }
            Event::Start(Tag::List(_)) => {
                flush(&mut current, style, &mut paragraphs);
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                flush(&mut current, style, &mut paragraphs);
                list_depth = list_depth.saturating_sub(1);
            }
            Event::Start(Tag::Item) => {
                flush(&mut current, style, &mut paragraphs);
                current.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                current.push_str("• ");
            }
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::CodeBlock)
            | Event::End(TagEnd::BlockQuote) => {
                flush(&mut current, style, &mut paragraphs);
            }
            Event::Text(text) | Event::Code(text) => current.push_str(&text),
            Event::SoftBreak | Event::HardBreak => current.push(' '),
            // raw html (<br> mostly) only separates words
            Event::Html(_) => current.push(' '),
            _ => {}
        }
    }
    flush(&mut current, style, &mut paragraphs);

    // Items keep the bullet even when the text was only whitespace
    paragraphs.retain(|p| p.text != "•");
    paragraphs
}
