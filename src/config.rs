//! Project configuration module.
//!
//! Handles loading, validating, and merging `extract.toml`. Stock defaults
//! describe the idfilters.rs migration; a project file overrides only the keys
//! it names.
//!
//! ## Config File Location
//!
//! `extract.toml` lives in the project root (`--root`, default `.`). All
//! relative paths inside it resolve against that root:
//!
//! ```text
//! site/                              # project root
//! ├── extract.toml                   # optional
//! └── src/content/pages.json         # written by `extract`
//! mirror/www.idfilters.rs/           # paths.mirror = "../mirror/www.idfilters.rs"
//! metadata/urls.txt                  # paths.urls = "../metadata/urls.txt"
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! mirror = "../mirror/www.idfilters.rs"
//! urls = "../metadata/urls.txt"
//! output = "src/content/pages.json"
//!
//! [site]
//! internal_hosts = ["idfilters.rs", "seo-evolve.com", "evolve-designstudio.com"]
//! asset_segments = ["/wp-content/", "/wp-includes/"]
//! skip_paths = ["/robots.txt", "/sitemap.xml"]
//!
//! [sections]
//! products = "/proizvodi"
//! applications = "/aplikacija"
//! attachment_marker = "/attachment/"
//!
//! [extract]
//! title_selectors = ["#Subheader h1", "title"]
//! content_selectors = ["#Content .the_content.the_content_wrapper", "#Content .content", "#Content .container"]
//! strip_selectors = ["script", "style", ...]
//! excerpt_max_chars = 180
//!
//! [output]
//! duplicates = "error"      # error | keep-first | keep-last | keep-all
//! ```
//!
//! Unknown keys are rejected to catch typos early. Selectors are compiled
//! during validation, so a bad selector fails the run before any page is read.

use crate::urls::normalize_pathname;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "extract.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid selector {selector:?} in extract.{field}: {message}")]
    Selector {
        field: &'static str,
        selector: String,
        message: String,
    },
}

/// Project configuration loaded from `extract.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Host allow-list and upload-directory conventions of the legacy site.
    pub site: SiteConfig,
    /// Section roots used for page classification.
    pub sections: SectionsConfig,
    /// Title/content selectors and sanitization rules.
    pub extract: ExtractConfig,
    /// Artifact assembly settings.
    pub output: OutputConfig,
}

impl ProjectConfig {
    /// Validate values and compile every selector once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.internal_hosts.is_empty() {
            return Err(ConfigError::Validation(
                "site.internal_hosts must not be empty".into(),
            ));
        }
        if self.site.internal_hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "site.internal_hosts must not contain empty entries".into(),
            ));
        }
        for segment in &self.site.asset_segments {
            if segment.len() < 3 || !segment.starts_with('/') || !segment.ends_with('/') {
                return Err(ConfigError::Validation(format!(
                    "site.asset_segments entry {segment:?} must look like \"/dir/\""
                )));
            }
        }
        for (name, value) in [
            ("sections.products", &self.sections.products),
            ("sections.applications", &self.sections.applications),
        ] {
            if value == "/" || normalize_pathname(value) != *value {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a canonical non-root path like \"/proizvodi\", got {value:?}"
                )));
            }
        }
        if self.sections.attachment_marker.is_empty() {
            return Err(ConfigError::Validation(
                "sections.attachment_marker must not be empty".into(),
            ));
        }
        if self.extract.excerpt_max_chars == 0 {
            return Err(ConfigError::Validation(
                "extract.excerpt_max_chars must be at least 1".into(),
            ));
        }
        if self.extract.content_selectors.is_empty() {
            return Err(ConfigError::Validation(
                "extract.content_selectors must not be empty".into(),
            ));
        }
        compile_dom_selectors("title_selectors", &self.extract.title_selectors)?;
        compile_dom_selectors("content_selectors", &self.extract.content_selectors)?;
        for selector in &self.extract.strip_selectors {
            selector
                .parse::<lol_html::Selector>()
                .map_err(|e| ConfigError::Selector {
                    field: "strip_selectors",
                    selector: selector.clone(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}

/// Compile one DOM query selector.
pub fn compile_dom_selector(
    field: &'static str,
    selector: &str,
) -> Result<scraper::Selector, ConfigError> {
    scraper::Selector::parse(selector).map_err(|e| ConfigError::Selector {
        field,
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Compile DOM query selectors, reporting the first one that fails.
pub fn compile_dom_selectors(
    field: &'static str,
    selectors: &[String],
) -> Result<Vec<scraper::Selector>, ConfigError> {
    selectors
        .iter()
        .map(|s| compile_dom_selector(field, s))
        .collect()
}

/// Input and output locations, relative to the project root unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of the mirrored legacy site (one directory per page, `index.html` inside).
    pub mirror: PathBuf,
    /// Newline-delimited list of absolute source URLs.
    pub urls: PathBuf,
    /// Where the content file is written.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mirror: PathBuf::from("../mirror/www.idfilters.rs"),
            urls: PathBuf::from("../metadata/urls.txt"),
            output: PathBuf::from("src/content/pages.json"),
        }
    }
}

impl PathsConfig {
    pub fn mirror_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.mirror)
    }

    pub fn urls_file(&self, root: &Path) -> PathBuf {
        root.join(&self.urls)
    }

    pub fn output_file(&self, root: &Path) -> PathBuf {
        root.join(&self.output)
    }
}

/// Hosts and upload conventions of the legacy site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Hosts whose links are rewritten to site paths. Subdomains match too.
    pub internal_hosts: Vec<String>,
    /// Upload directory markers; asset URLs are truncated to start at these.
    pub asset_segments: Vec<String>,
    /// Canonical paths that are listed but never extracted.
    pub skip_paths: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            internal_hosts: vec![
                "idfilters.rs".to_string(),
                "seo-evolve.com".to_string(),
                "evolve-designstudio.com".to_string(),
            ],
            asset_segments: vec!["/wp-content/".to_string(), "/wp-includes/".to_string()],
            skip_paths: vec!["/robots.txt".to_string(), "/sitemap.xml".to_string()],
        }
    }
}

/// Section roots for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionsConfig {
    /// Canonical path of the products index.
    pub products: String,
    /// Canonical path of the applications index.
    pub applications: String,
    /// Substring marking media attachment pages.
    pub attachment_marker: String,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            products: "/proizvodi".to_string(),
            applications: "/aplikacija".to_string(),
            attachment_marker: "/attachment/".to_string(),
        }
    }
}

/// Content extraction rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Title candidates in priority order; the first non-empty text wins.
    pub title_selectors: Vec<String>,
    /// Content-region candidates in priority order; the first match wins.
    pub content_selectors: Vec<String>,
    /// Elements removed from the content region before anything is derived.
    pub strip_selectors: Vec<String>,
    /// Maximum excerpt length in characters, ellipsis included.
    pub excerpt_max_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            title_selectors: vec!["#Subheader h1".to_string(), "title".to_string()],
            content_selectors: vec![
                "#Content .the_content.the_content_wrapper".to_string(),
                "#Content .content".to_string(),
                "#Content .container".to_string(),
            ],
            strip_selectors: [
                "script",
                "style",
                "noscript",
                "iframe",
                "form",
                "input",
                "textarea",
                "button",
                "select",
                ".four.columns",
                ".widget-area",
                ".widget",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            excerpt_max_chars: 180,
        }
    }
}

/// What to do when two source URLs normalize to the same path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort the run, naming both URLs. Nothing is written.
    #[default]
    Error,
    /// Keep the record from the earliest URL in the list.
    KeepFirst,
    /// Keep the record from the latest URL in the list.
    KeepLast,
    /// Keep every record (paths are then no longer unique).
    KeepAll,
}

/// Artifact assembly settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub duplicates: DuplicatePolicy,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ProjectConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays included.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `extract.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ProjectConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ProjectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `extract.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `extract.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# content-extract configuration
# ==============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Relative paths resolve against the project root (--root, default ".").
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Inputs and output
# ---------------------------------------------------------------------------
[paths]
# Mirrored legacy site: every page is <path>/index.html under this directory.
mirror = "../mirror/www.idfilters.rs"

# One absolute source URL per line. Blank lines are ignored.
urls = "../metadata/urls.txt"

# The content file consumed by the front end. Fully overwritten on each run.
output = "src/content/pages.json"

# ---------------------------------------------------------------------------
# Legacy site conventions
# ---------------------------------------------------------------------------
[site]
# Links to these hosts (and their subdomains) become site-relative paths.
# Links to any other host are left exactly as written.
internal_hosts = ["idfilters.rs", "seo-evolve.com", "evolve-designstudio.com"]

# Image URLs containing one of these are cut to start at the segment,
# whatever host served them.
asset_segments = ["/wp-content/", "/wp-includes/"]

# Listed URLs with these paths are not content pages and are skipped.
skip_paths = ["/robots.txt", "/sitemap.xml"]

# ---------------------------------------------------------------------------
# Page classification
# ---------------------------------------------------------------------------
[sections]
products = "/proizvodi"
applications = "/aplikacija"
# Any path containing this marker is an attachment page.
attachment_marker = "/attachment/"

# ---------------------------------------------------------------------------
# Extraction
# ---------------------------------------------------------------------------
[extract]
# Title candidates, first non-empty text wins; falls back to the page path.
title_selectors = ["#Subheader h1", "title"]

# Content region candidates, first match wins. No match = empty page body.
content_selectors = [
    "#Content .the_content.the_content_wrapper",
    "#Content .content",
    "#Content .container",
]

# Removed from the content region before title/excerpt/markdown are derived.
strip_selectors = [
    "script", "style", "noscript", "iframe",
    "form", "input", "textarea", "button", "select",
    ".four.columns", ".widget-area", ".widget",
]

# Excerpts longer than this are cut and end with "…".
excerpt_max_chars = 180

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Two URLs normalizing to the same path:
#   "error"      abort the run (nothing is written)
#   "keep-first" keep the earliest listed URL
#   "keep-last"  keep the latest listed URL
#   "keep-all"   keep both records
duplicates = "error"
"##
}
