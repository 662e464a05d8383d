//! HTML → markdown serialization for extracted content regions.
//!
//! The output contract the front end relies on:
//!
//! - ATX headings (`## Heading`)
//! - fenced code blocks
//! - `_`-delimited emphasis
//! - `<sup>` and `<sub>` kept as raw inline HTML (units like m<sup>3</sup>
//!   must not flatten into "m3")
//! - inline links, so rewritten targets appear as `[text](/path)`

use htmd::options::{CodeBlockStyle, HeadingStyle, Options};
use htmd::{Element, HtmlToMarkdown};

/// A configured converter. Build once, reuse for every page.
pub struct MarkdownWriter {
    converter: HtmlToMarkdown,
}

impl MarkdownWriter {
    pub fn new() -> Self {
        let converter = HtmlToMarkdown::builder()
            .options(Options {
                heading_style: HeadingStyle::Atx,
                code_block_style: CodeBlockStyle::Fenced,
                ..Default::default()
            })
            .add_handler(vec!["em", "i"], |element: Element| {
                Some(emphasis(element.content))
            })
            .add_handler(vec!["sup"], |element: Element| {
                Some(format!("<sup>{}</sup>", element.content))
            })
            .add_handler(vec!["sub"], |element: Element| {
                Some(format!("<sub>{}</sub>", element.content))
            })
            .build();
        Self { converter }
    }

    /// Convert an HTML fragment. Leading blank lines and trailing whitespace
    /// are trimmed.
    pub fn convert(&self, html: &str) -> std::io::Result<String> {
        let markdown = self.converter.convert(html)?;
        Ok(markdown
            .trim_start_matches(['\t', '\r', '\n'])
            .trim_end()
            .to_string())
    }
}

impl Default for MarkdownWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn emphasis(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    format!("_{content}_")
}
