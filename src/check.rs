//! Audits on either side of an extraction run.
//!
//! [`check_inputs`] looks at the URL list and mirror before anything is
//! extracted. It reports the same problems a run would skip over:
//!
//! - listed URLs whose mirrored document is missing
//! - list entries that are not absolute URLs
//! - URLs that normalize to the same path
//! - mirrored `index.html` documents no listed URL points at
//!
//! [`verify_artifact`] looks at a written content file. It parses every
//! record's markdown and reports link and image targets that still point at
//! a legacy host, plus internal page links whose path has no record.
//!
//! Neither audit writes anything.

use crate::config::{ProjectConfig, SiteConfig};
use crate::content::{ContentError, ContentIndex};
use crate::pipeline::{MissingDocument, PipelineError, read_url_list};
use crate::urls::{
    UrlRewriter, canonical_page_path, decode_path, normalize_pathname, resolve_local_document_path,
};
use pulldown_cmark::{Event, Parser, Tag};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use url::Url;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Mirror directory not found: {0}")]
    MirrorNotFound(PathBuf),
    #[error("Cannot walk mirror: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Several listed URLs sharing one canonical path.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub path: String,
    pub urls: Vec<String>,
}

/// Result of [`check_inputs`].
#[derive(Debug, Default)]
pub struct InputAudit {
    /// Non-empty lines in the URL list.
    pub listed: usize,
    /// Listed URLs whose document is present.
    pub found: usize,
    pub skipped: Vec<String>,
    pub invalid_urls: Vec<String>,
    pub missing: Vec<MissingDocument>,
    pub duplicates: Vec<DuplicateGroup>,
    /// Canonical paths of mirrored pages that are not listed, sorted.
    pub unlisted: Vec<String>,
}

impl InputAudit {
    /// True when a run would extract every listed page without skipping any.
    pub fn is_clean(&self) -> bool {
        self.invalid_urls.is_empty() && self.missing.is_empty() && self.duplicates.is_empty()
    }
}

/// Audit the URL list against the mirror.
pub fn check_inputs(root: &Path, config: &ProjectConfig) -> Result<InputAudit, CheckError> {
    let mirror = config.paths.mirror_dir(root);
    if !mirror.is_dir() {
        return Err(CheckError::MirrorNotFound(mirror));
    }
    let urls = read_url_list(&config.paths.urls_file(root))?;

    let mut audit = InputAudit {
        listed: urls.len(),
        ..InputAudit::default()
    };
    let mut expected: HashSet<PathBuf> = HashSet::new();
    let mut by_path: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for raw in &urls {
        let Ok(url) = Url::parse(raw) else {
            audit.invalid_urls.push(raw.clone());
            continue;
        };
        let path = canonical_page_path(&url);
        if config.site.skip_paths.contains(&path) {
            audit.skipped.push(raw.clone());
            continue;
        }

        let file = resolve_local_document_path(&mirror, &url);
        if file.is_file() {
            audit.found += 1;
        } else {
            audit.missing.push(MissingDocument {
                url: raw.clone(),
                file: file.clone(),
            });
        }
        expected.insert(file);
        by_path.entry(path).or_default().push(raw.clone());
    }

    audit.duplicates = by_path
        .into_iter()
        .filter(|(_, urls)| urls.len() > 1)
        .map(|(path, urls)| DuplicateGroup { path, urls })
        .collect();
    audit.unlisted = unlisted_documents(&mirror, &expected)?;
    Ok(audit)
}

/// Canonical paths of `index.html` documents under `mirror` not in `expected`.
fn unlisted_documents(mirror: &Path, expected: &HashSet<PathBuf>) -> Result<Vec<String>, CheckError> {
    let mut unlisted = Vec::new();
    for entry in WalkDir::new(mirror).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != "index.html" {
            continue;
        }
        if expected.contains(entry.path()) {
            continue;
        }
        let dir = entry
            .path()
            .parent()
            .and_then(|parent| parent.strip_prefix(mirror).ok())
            .unwrap_or(Path::new(""));
        let path = normalize_pathname(&dir.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/"));
        debug!(path = %path, "unlisted mirrored document");
        unlisted.push(path);
    }
    unlisted.sort();
    Ok(unlisted)
}

/// A markdown target found on one record.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkIssue {
    /// Path of the record whose markdown holds the target.
    pub page: String,
    pub target: String,
}

/// Result of [`verify_artifact`].
#[derive(Debug, Default)]
pub struct ArtifactAudit {
    pub pages: usize,
    /// Links and images still addressed to a legacy host.
    pub legacy_links: Vec<LinkIssue>,
    /// Site-relative page links with no matching record.
    pub broken_links: Vec<LinkIssue>,
}

impl ArtifactAudit {
    pub fn is_clean(&self) -> bool {
        self.legacy_links.is_empty() && self.broken_links.is_empty()
    }
}

/// Audit every record's markdown for targets that escaped rewriting.
pub fn verify_artifact(index: &ContentIndex, site: &SiteConfig) -> ArtifactAudit {
    let rewriter = UrlRewriter::from_config(site);
    let mut audit = ArtifactAudit {
        pages: index.len(),
        ..ArtifactAudit::default()
    };

    for page in index.all() {
        for (target, is_image) in markdown_targets(&page.markdown) {
            let issue = || LinkIssue {
                page: page.path.clone(),
                target: target.clone(),
            };
            if points_at_legacy_host(&rewriter, &target) {
                audit.legacy_links.push(issue());
                continue;
            }
            if is_image {
                continue;
            }
            if site_path(&target, &site.asset_segments).is_some_and(|path| !index.contains(&path)) {
                audit.broken_links.push(issue());
            }
        }
    }
    audit
}

/// Link and image destinations in document order, flagged `true` for images.
fn markdown_targets(markdown: &str) -> Vec<(String, bool)> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            Event::Start(Tag::Link { dest_url, .. }) => Some((dest_url.to_string(), false)),
            Event::Start(Tag::Image { dest_url, .. }) => Some((dest_url.to_string(), true)),
            _ => None,
        })
        .collect()
}

fn points_at_legacy_host(rewriter: &UrlRewriter, target: &str) -> bool {
    let absolute = if target.starts_with("//") {
        format!("https:{target}")
    } else {
        target.to_string()
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|url| url.host_str().map(|host| rewriter.is_internal_host(host)))
        .unwrap_or(false)
}

/// Canonical path of a site-relative page link, `None` for anything else
/// (external links, anchors, uploaded assets).
fn site_path(target: &str, asset_segments: &[String]) -> Option<String> {
    if !target.starts_with('/') || target.starts_with("//") {
        return None;
    }
    let end = target.find(['#', '?']).unwrap_or(target.len());
    let path = decode_path(&target[..end]);
    if asset_segments.iter().any(|segment| path.starts_with(segment.as_str())) {
        return None;
    }
    Some(normalize_pathname(&path))
}
