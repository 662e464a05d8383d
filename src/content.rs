//! Read-only lookups over a written content file.
//!
//! A [`ContentIndex`] is built once from `pages.json` and then only queried.
//! Every accessor is answered from lookup tables built at construction time,
//! so nothing is re-parsed or re-scanned per query. The index is `Send + Sync`
//! and can be shared behind an `Arc` by whatever serves the pages.

use crate::classify::PageType;
use crate::types::{PageRecord, PagesFile};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Cannot read content file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid content file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    pages: Vec<PageRecord>,
    by_path: HashMap<String, usize>,
    by_type: HashMap<PageType, Vec<usize>>,
}

impl ContentIndex {
    /// Load and index a content file.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let json = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: PagesFile = serde_json::from_str(&json).map_err(|source| ContentError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_pages(file.pages))
    }

    /// Index records. They are sorted by path if they are not already.
    ///
    /// When a path occurs more than once, [`get`](Self::get) returns the last
    /// occurrence; [`all`](Self::all) and the type filters return every one.
    pub fn from_pages(mut pages: Vec<PageRecord>) -> Self {
        pages.sort_by(|a, b| a.path.cmp(&b.path));

        let mut by_path = HashMap::with_capacity(pages.len());
        let mut by_type: HashMap<PageType, Vec<usize>> = HashMap::new();
        for (i, page) in pages.iter().enumerate() {
            by_path.insert(page.path.clone(), i);
            by_type.entry(page.page_type).or_default().push(i);
        }

        Self {
            pages,
            by_path,
            by_type,
        }
    }

    pub fn all(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Exact canonical-path lookup.
    pub fn get(&self, path: &str) -> Option<&PageRecord> {
        self.by_path.get(path).map(|&i| &self.pages[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Records of one type, in path order.
    pub fn of_type(&self, page_type: PageType) -> Vec<&PageRecord> {
        self.by_type
            .get(&page_type)
            .map(|indices| indices.iter().map(|&i| &self.pages[i]).collect())
            .unwrap_or_default()
    }

    pub fn products(&self) -> Vec<&PageRecord> {
        self.of_type(PageType::Product)
    }

    pub fn applications(&self) -> Vec<&PageRecord> {
        self.of_type(PageType::Application)
    }

    pub fn attachments(&self) -> Vec<&PageRecord> {
        self.of_type(PageType::Attachment)
    }

    /// Every record's path, in order. One route per record.
    pub fn static_paths(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.path.as_str()).collect()
    }
}
