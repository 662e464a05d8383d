//! Shared test utilities for the content-extract test suite.
//!
//! Builds throwaway project trees (config, URL list, mirrored documents) and
//! provides lookups over produced records that panic with a useful message.
//!
//! # Usage
//!
//! ```rust
//! use crate::pipeline::run;
//! use crate::test_helpers::*;
//!
//! let project = Project::new(example_config());
//! project.write_page("proizvodi/filter-x", &wp_page(Some("Filter X"), "<p>Tekst.</p>"));
//! project.write_urls(&["https://example.com/proizvodi/filter-x"]);
//!
//! let report = run(project.root(), &project.config).unwrap();
//! let page = find_page(&report.pages, "/proizvodi/filter-x");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::ProjectConfig;
use crate::types::PageRecord;

// =========================================================================
// Config and documents
// =========================================================================

/// Stock config with `example.com` as the only internal host and a
/// self-contained project layout (`mirror/`, `urls.txt`, `out/pages.json`).
pub fn example_config() -> ProjectConfig {
    let mut config = ProjectConfig::default();
    config.site.internal_hosts = vec!["example.com".to_string()];
    config.paths.mirror = PathBuf::from("mirror");
    config.paths.urls = PathBuf::from("urls.txt");
    config.paths.output = PathBuf::from("out/pages.json");
    config
}

/// A document shaped like the legacy theme's page template.
///
/// `heading` fills `#Subheader h1`; `None` leaves the subheader out so the
/// `<title>` fallback applies. `body` goes inside the article container.
pub fn wp_page(heading: Option<&str>, body: &str) -> String {
    let subheader = heading
        .map(|h| format!(r#"<div id="Subheader"><div class="container"><h1>{h}</h1></div></div>"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Filter X – ID Filters</title></head>
<body>
<header><nav><a href="https://example.com/">Početna</a></nav></header>
{subheader}
<div id="Content">
  <div class="content_wrapper">
    <div class="the_content the_content_wrapper">
{body}
    </div>
  </div>
</div>
<footer><p>Footer text</p></footer>
</body>
</html>"#
    )
}

// =========================================================================
// Project trees
// =========================================================================

/// A temporary project root holding a config, URL list, and mirror.
pub struct Project {
    dir: TempDir,
    pub config: ProjectConfig,
}

impl Project {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn mirror(&self) -> PathBuf {
        self.config.paths.mirror_dir(self.root())
    }

    pub fn output(&self) -> PathBuf {
        self.config.paths.output_file(self.root())
    }

    /// Write `html` as `<mirror>/<rel>/index.html` (`""` = mirror root).
    pub fn write_page(&self, rel: &str, html: &str) {
        let dir = self.mirror().join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.html"), html).unwrap();
    }

    /// Write a raw file under the mirror.
    pub fn write_mirror_file(&self, rel: &str, content: &str) {
        let path = self.mirror().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn write_urls(&self, urls: &[&str]) {
        let path = self.config.paths.urls_file(self.root());
        fs::write(path, urls.join("\n")).unwrap();
    }
}

// =========================================================================
// Record lookups (panic with the available paths on a miss)
// =========================================================================

/// Find a record by path. Panics if not found.
pub fn find_page<'a>(pages: &'a [PageRecord], path: &str) -> &'a PageRecord {
    pages.iter().find(|p| p.path == path).unwrap_or_else(|| {
        let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
        panic!("page '{path}' not found. Available: {paths:?}")
    })
}

/// All record paths, in order.
pub fn paths(pages: &[PageRecord]) -> Vec<&str> {
    pages.iter().map(|p| p.path.as_str()).collect()
}
