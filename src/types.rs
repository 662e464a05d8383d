//! The content file's record types.
//!
//! These serialize to exactly the JSON shape the front end reads, so field
//! names follow the wire format (`type`, `heroImage`) rather than Rust naming.

use crate::classify::PageType;
use serde::{Deserialize, Serialize};

/// One extracted page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Canonical site path, the record's key.
    pub path: String,
    /// Derived from `path` alone.
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub title: String,
    /// Whitespace-collapsed summary, ellipsized when too long.
    pub excerpt: String,
    /// First image in the content region, already rewritten.
    #[serde(rename = "heroImage")]
    pub hero_image: Option<String>,
    pub markdown: String,
    pub source: PageSource,
}

/// Where a record came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSource {
    /// The URL exactly as listed.
    pub url: String,
    /// The mirrored document, relative to the project root, `/`-separated.
    pub file: String,
}

/// Top-level document of the content file: `{ "pages": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagesFile {
    pub pages: Vec<PageRecord>,
}

impl PagesFile {
    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
