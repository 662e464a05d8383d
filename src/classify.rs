//! Page type classification.
//!
//! A page's type is a pure function of its canonical path. Nothing about the
//! document body is consulted, so the front end can trust `type` to agree
//! with `path` for every record.
//!
//! Rules, first match wins:
//!
//! | Rule | Type |
//! |------|------|
//! | path contains the attachment marker (`/attachment/`) | `attachment` |
//! | path equals the products index (`/proizvodi`) | `products_index` |
//! | path is under the products index | `product` |
//! | path equals the applications index (`/aplikacija`) | `applications_index` |
//! | path is under the applications index | `application` |
//! | path is `/` | `home` |
//! | anything else | `page` |

use crate::config::SectionsConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Home,
    ProductsIndex,
    Product,
    ApplicationsIndex,
    Application,
    Attachment,
    Page,
}

impl PageType {
    pub const ALL: [PageType; 7] = [
        PageType::Home,
        PageType::ProductsIndex,
        PageType::Product,
        PageType::ApplicationsIndex,
        PageType::Application,
        PageType::Attachment,
        PageType::Page,
    ];

    /// Wire name used in the content file.
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::ProductsIndex => "products_index",
            PageType::Product => "product",
            PageType::ApplicationsIndex => "applications_index",
            PageType::Application => "application",
            PageType::Attachment => "attachment",
            PageType::Page => "page",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = PageType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown page type '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// The canonical section roots that drive classification.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPaths {
    pub products: String,
    pub applications: String,
    pub attachment_marker: String,
}

impl Default for SectionPaths {
    fn default() -> Self {
        Self::from_config(&SectionsConfig::default())
    }
}

impl SectionPaths {
    pub fn from_config(sections: &SectionsConfig) -> Self {
        Self {
            products: sections.products.clone(),
            applications: sections.applications.clone(),
            attachment_marker: sections.attachment_marker.clone(),
        }
    }

    /// Classify a canonical pathname.
    pub fn classify(&self, pathname: &str) -> PageType {
        if pathname.contains(self.attachment_marker.as_str()) {
            PageType::Attachment
        } else if pathname == self.products {
            PageType::ProductsIndex
        } else if is_under(pathname, &self.products) {
            PageType::Product
        } else if pathname == self.applications {
            PageType::ApplicationsIndex
        } else if is_under(pathname, &self.applications) {
            PageType::Application
        } else if pathname == "/" {
            PageType::Home
        } else {
            PageType::Page
        }
    }
}

fn is_under(pathname: &str, section: &str) -> bool {
    pathname
        .strip_prefix(section)
        .is_some_and(|rest| rest.starts_with('/'))
}
