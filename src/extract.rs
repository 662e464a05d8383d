//! Content extraction from one mirrored document.
//!
//! Given a document's HTML and the URL it was served from, produces the
//! title, excerpt, hero image, and markdown body for one page record.
//!
//! ## Steps
//!
//! ```text
//! document ──► title          (title_selectors in order, first non-empty text, else the path)
//!          ──► content region (content_selectors in order, first match; none = empty page)
//!                  │
//!                  ▼
//!          sanitize + rewrite (strip_selectors removed; a[href] → rewrite_url;
//!                  │           img src/data-src → rewrite_asset_url; srcset/sizes/loading dropped)
//!                  ▼
//!          clean fragment ──► excerpt     (first <p> text, else all text; collapsed; ellipsized)
//!                         ──► hero image  (first <img> src)
//!                         ──► markdown
//! ```
//!
//! Sanitizing happens before anything is derived from the region, so text
//! inside removed widgets or scripts never reaches the excerpt or markdown.
//!
//! Each call owns its parsed trees; nothing is shared between pages.

use crate::config::{ConfigError, ProjectConfig, compile_dom_selector, compile_dom_selectors};
use crate::markdown::MarkdownWriter;
use crate::urls::{UrlRewriter, canonical_page_path};
use lol_html::{HtmlRewriter, Settings, element};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("HTML rewrite error: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
    #[error("Rewritten HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Markdown conversion error: {0}")]
    Markdown(#[from] std::io::Error),
}

/// Everything derived from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub title: String,
    pub excerpt: String,
    pub hero_image: Option<String>,
    pub markdown: String,
}

/// Compiled extraction rules, built once per run.
pub struct Extractor {
    title_selectors: Vec<Selector>,
    content_selectors: Vec<Selector>,
    strip_selectors: Vec<String>,
    excerpt_max_chars: usize,
    rewriter: UrlRewriter,
    markdown: MarkdownWriter,
    paragraph: Selector,
    image: Selector,
}

impl Extractor {
    pub fn new(config: &ProjectConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            title_selectors: compile_dom_selectors(
                "title_selectors",
                &config.extract.title_selectors,
            )?,
            content_selectors: compile_dom_selectors(
                "content_selectors",
                &config.extract.content_selectors,
            )?,
            strip_selectors: config.extract.strip_selectors.clone(),
            excerpt_max_chars: config.extract.excerpt_max_chars,
            rewriter: UrlRewriter::from_config(&config.site),
            markdown: MarkdownWriter::new(),
            paragraph: compile_dom_selector("paragraph", "p")?,
            image: compile_dom_selector("image", "img")?,
        })
    }

    /// Extract one page. `page_url` is both the rewrite base and the source
    /// of the fallback title.
    pub fn extract(&self, html: &str, page_url: &Url) -> Result<Extraction, ExtractError> {
        let document = Html::parse_document(html);
        let pathname = canonical_page_path(page_url);
        let title = self.select_title(&document, &pathname);

        let Some(region) = self.content_region(&document) else {
            debug!(url = %page_url, "no content region matched");
            return Ok(Extraction {
                title,
                excerpt: String::new(),
                hero_image: None,
                markdown: String::new(),
            });
        };

        let clean = self.sanitize_and_rewrite(&region.inner_html(), page_url)?;
        let fragment = Html::parse_fragment(&clean);

        Ok(Extraction {
            title,
            excerpt: excerpt(&self.summary_text(&fragment), self.excerpt_max_chars),
            hero_image: self.first_image(&fragment),
            markdown: self.markdown.convert(&clean)?,
        })
    }

    /// First non-empty text among the title candidates, else the pathname.
    fn select_title(&self, document: &Html, pathname: &str) -> String {
        self.title_selectors
            .iter()
            .find_map(|selector| {
                document
                    .select(selector)
                    .next()
                    .map(element_text)
                    .filter(|text| !text.is_empty())
            })
            .unwrap_or_else(|| pathname.to_string())
    }

    /// First content-region candidate with at least one match.
    fn content_region<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.content_selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
    }

    /// Remove non-content elements and rewrite link/image targets.
    fn sanitize_and_rewrite(&self, fragment: &str, page_url: &Url) -> Result<String, ExtractError> {
        let rewriter = &self.rewriter;
        let mut handlers = Vec::with_capacity(self.strip_selectors.len() + 2);

        for selector in &self.strip_selectors {
            handlers.push(element!(selector, |el| {
                el.remove();
                Ok(())
            }));
        }

        handlers.push(element!("a[href]", |el| {
            if let Some(href) = el.get_attribute("href") {
                let rewritten = rewriter.rewrite_url(&href, page_url);
                if !rewritten.is_empty() {
                    el.set_attribute("href", &rewritten)?;
                }
            }
            Ok(())
        }));

        handlers.push(element!("img", |el| {
            let src = el
                .get_attribute("src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| el.get_attribute("data-src"));
            if let Some(src) = src {
                let rewritten = rewriter.rewrite_asset_url(&src, page_url);
                if !rewritten.is_empty() {
                    el.set_attribute("src", &rewritten)?;
                }
            }
            el.remove_attribute("srcset");
            el.remove_attribute("sizes");
            el.remove_attribute("loading");
            Ok(())
        }));

        let mut output = Vec::with_capacity(fragment.len());
        let mut html_rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: handlers,
                ..Settings::default()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );
        html_rewriter.write(fragment.as_bytes())?;
        html_rewriter.end()?;

        Ok(String::from_utf8(output)?)
    }

    /// Text of the first non-empty paragraph, else of the whole region.
    fn summary_text(&self, fragment: &Html) -> String {
        fragment
            .select(&self.paragraph)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| element_text(fragment.root_element()))
    }

    fn first_image(&self, fragment: &Html) -> Option<String> {
        fragment
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(String::from)
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Collapse whitespace runs and cap the length at `max_chars` characters.
///
/// Longer text keeps its first `max_chars - 1` characters followed by `…`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.chars().count() <= max_chars {
        return clean;
    }
    let mut cut: String = clean.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
