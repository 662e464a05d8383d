//! The extraction run.
//!
//! One run reads the URL list, extracts every listed page from the mirror,
//! and writes the complete content file:
//!
//! ```text
//! urls.txt ──► for each URL, in order:
//!                normalize path ─► skip robots/sitemap
//!                resolve mirror document ─► read (missing = warn + skip)
//!                extract ─► classify ─► PageRecord
//!          ──► duplicate policy ─► sort by path ─► pages.json
//! ```
//!
//! Pages are processed strictly sequentially. The output order comes from the
//! final sort, never from processing order.
//!
//! ## Failure Handling
//!
//! Per-page problems (unparseable URL, missing document, rewriter failure) are
//! logged at `warn`, recorded in the [`RunReport`], and never stop the run.
//! Setup problems (config, unreadable URL list, duplicate paths under the
//! `error` policy, unwritable output) abort before anything is written. The
//! output file is written once, at the very end.

use crate::classify::SectionPaths;
use crate::config::{ConfigError, DuplicatePolicy, ProjectConfig};
use crate::extract::Extractor;
use crate::types::{PageRecord, PageSource, PagesFile};
use crate::urls::{canonical_page_path, resolve_local_document_path};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Cannot read URL list {path}: {source}")]
    ReadUrls {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate path {path}: listed as {first} and {second}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },
}

/// A listed URL whose mirrored document could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingDocument {
    pub url: String,
    pub file: PathBuf,
}

/// A listed URL whose document was read but could not be extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPage {
    pub url: String,
    pub reason: String,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Records as written: policy applied, sorted by path.
    pub pages: Vec<PageRecord>,
    /// Where the content file was written.
    pub output: PathBuf,
    /// Listed URLs skipped on purpose (robots, sitemap).
    pub skipped: Vec<String>,
    pub missing: Vec<MissingDocument>,
    pub failed: Vec<FailedPage>,
    /// List entries that are not absolute URLs.
    pub invalid_urls: Vec<String>,
}

/// Split a URL list into trimmed, non-empty lines.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

pub fn read_url_list(path: &Path) -> Result<Vec<String>, PipelineError> {
    let content = fs::read_to_string(path).map_err(|source| PipelineError::ReadUrls {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_url_list(&content))
}

/// `file` relative to `root`, `/`-separated on every platform.
pub fn display_relative(root: &Path, file: &Path) -> String {
    let relative = pathdiff::diff_paths(file, root).unwrap_or_else(|| file.to_path_buf());
    relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/")
}

/// Apply the duplicate policy, then sort by path (stable, byte-wise).
pub fn order_pages(
    mut pages: Vec<PageRecord>,
    policy: DuplicatePolicy,
) -> Result<Vec<PageRecord>, PipelineError> {
    match policy {
        DuplicatePolicy::Error => {
            let mut seen: HashMap<&str, &str> = HashMap::new();
            for page in &pages {
                if let Some(first) = seen.insert(&page.path, &page.source.url) {
                    return Err(PipelineError::DuplicatePath {
                        path: page.path.clone(),
                        first: first.to_string(),
                        second: page.source.url.clone(),
                    });
                }
            }
        }
        DuplicatePolicy::KeepFirst => {
            let mut seen = HashSet::new();
            pages.retain(|page| seen.insert(page.path.clone()));
        }
        DuplicatePolicy::KeepLast => {
            let mut seen = HashSet::new();
            pages.reverse();
            pages.retain(|page| seen.insert(page.path.clone()));
            pages.reverse();
        }
        DuplicatePolicy::KeepAll => {}
    }
    pages.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(pages)
}

/// Write the content file, creating parent directories.
pub fn write_pages(path: &Path, pages: &[PageRecord]) -> Result<(), PipelineError> {
    let json = PagesFile {
        pages: pages.to_vec(),
    }
    .to_json()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Extracts pages for one project. Holds the compiled rules for the run.
pub struct Pipeline<'a> {
    root: &'a Path,
    config: &'a ProjectConfig,
    extractor: Extractor,
    sections: SectionPaths,
    mirror: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(root: &'a Path, config: &'a ProjectConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            root,
            config,
            extractor: Extractor::new(config)?,
            sections: SectionPaths::from_config(&config.sections),
            mirror: config.paths.mirror_dir(root),
        })
    }

    /// Extract every listed URL, in order. Records are not yet sorted.
    pub fn collect(&self, urls: &[String], report: &mut RunReport) -> Vec<PageRecord> {
        let mut pages = Vec::with_capacity(urls.len());
        for raw in urls {
            if let Some(page) = self.process_url(raw, report) {
                pages.push(page);
            }
        }
        pages
    }

    fn process_url(&self, raw: &str, report: &mut RunReport) -> Option<PageRecord> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = raw, error = %e, "skipping invalid URL");
                report.invalid_urls.push(raw.to_string());
                return None;
            }
        };

        let path = canonical_page_path(&url);
        if self.config.site.skip_paths.contains(&path) {
            debug!(url = raw, "skipping non-content endpoint");
            report.skipped.push(raw.to_string());
            return None;
        }

        let file = resolve_local_document_path(&self.mirror, &url);
        let html = match fs::read(&file) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(url = raw, file = %file.display(), error = %e, "missing file for URL");
                report.missing.push(MissingDocument {
                    url: raw.to_string(),
                    file,
                });
                return None;
            }
        };

        let extraction = match self.extractor.extract(&html, &url) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(url = raw, file = %file.display(), error = %e, "extraction failed");
                report.failed.push(FailedPage {
                    url: raw.to_string(),
                    reason: e.to_string(),
                });
                return None;
            }
        };

        debug!(url = raw, path = %path, "extracted");
        Some(PageRecord {
            page_type: self.sections.classify(&path),
            path,
            title: extraction.title,
            excerpt: extraction.excerpt,
            hero_image: extraction.hero_image,
            markdown: extraction.markdown,
            source: PageSource {
                url: raw.to_string(),
                file: display_relative(self.root, &file),
            },
        })
    }
}

/// Run the full extraction for the project at `root` and write the content file.
pub fn run(root: &Path, config: &ProjectConfig) -> Result<RunReport, PipelineError> {
    let pipeline = Pipeline::new(root, config)?;
    let urls = read_url_list(&config.paths.urls_file(root))?;
    info!(count = urls.len(), "read URL list");

    let mut report = RunReport {
        output: config.paths.output_file(root),
        ..RunReport::default()
    };
    let pages = pipeline.collect(&urls, &mut report);
    let pages = order_pages(pages, config.output.duplicates)?;

    write_pages(&report.output, &pages)?;
    info!(count = pages.len(), output = %report.output.display(), "wrote content file");

    report.pages = pages;
    Ok(report)
}
