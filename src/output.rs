//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **page-centric, not file-centric**. Each record leads with its
//! positional index, title, and canonical path; the mirrored document it came
//! from is secondary context on an indented `Source:` line. Problems are
//! grouped under a heading naming the kind of problem, one entry per line.
//!
//! # Output Format
//!
//! ## Extract
//!
//! ```text
//! Home
//! 001 Naslovna → /
//!     Source: mirror/index.html
//! Products
//! 001 Filter X → /proizvodi/filter-x
//!     Source: mirror/proizvodi/filter-x/index.html
//!
//! Missing documents
//!     https://www.idfilters.rs/kontakt/
//!         Expected: mirror/kontakt/index.html
//!
//! Wrote 2 pages → src/content/pages.json (1 missing, 1 skipped)
//! ```
//!
//! ## Check
//!
//! ```text
//! Listed 4 URLs: 2 found, 1 missing, 1 skipped
//! Missing documents
//!     https://www.idfilters.rs/kontakt/
//!         Expected: mirror/kontakt/index.html
//! Unlisted documents
//!     /stara-strana
//! ```
//!
//! ## Verify
//!
//! ```text
//! Verified 5 pages
//! Legacy host links
//!     /proizvodi → https://www.idfilters.rs/stari-link/
//! Broken internal links
//!     /proizvodi → /nema-stranice
//! ```
//!
//! ## List
//!
//! ```text
//! 001 Filter X → /proizvodi/filter-x (product)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::check::{ArtifactAudit, InputAudit, LinkIssue};
use crate::classify::PageType;
use crate::pipeline::{MissingDocument, RunReport, display_relative};
use crate::types::PageRecord;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a page header: positional index + title + canonical path.
///
/// ```text
/// 001 Filter X → /proizvodi/filter-x
/// ```
fn page_header(index: usize, page: &PageRecord) -> String {
    format!("{} {} → {}", format_index(index), page.title, page.path)
}

/// Group heading for a page type in extract output.
fn type_heading(page_type: PageType) -> &'static str {
    match page_type {
        PageType::Home => "Home",
        PageType::ProductsIndex => "Products index",
        PageType::Product => "Products",
        PageType::ApplicationsIndex => "Applications index",
        PageType::Application => "Applications",
        PageType::Attachment => "Attachments",
        PageType::Page => "Pages",
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn missing_lines(missing: &[MissingDocument], root: &Path, lines: &mut Vec<String>) {
    if missing.is_empty() {
        return;
    }
    lines.push("Missing documents".to_string());
    for doc in missing {
        lines.push(format!("{}{}", indent(1), doc.url));
        lines.push(format!(
            "{}Expected: {}",
            indent(2),
            display_relative(root, &doc.file)
        ));
    }
}

fn string_group(heading: &str, entries: &[String], lines: &mut Vec<String>) {
    if entries.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    for entry in entries {
        lines.push(format!("{}{}", indent(1), entry));
    }
}

fn issue_group(heading: &str, issues: &[LinkIssue], lines: &mut Vec<String>) {
    if issues.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    for issue in issues {
        lines.push(format!("{}{} → {}", indent(1), issue.page, issue.target));
    }
}

// ============================================================================
// extract
// ============================================================================

/// Format the result of an extraction run.
///
/// Records are grouped by type in classification order; within a group they
/// keep the artifact's path order. Skipped URLs are listed after the pages,
/// then a one-line summary.
pub fn format_extract_output(report: &RunReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for page_type in PageType::ALL {
        let group: Vec<&PageRecord> = report
            .pages
            .iter()
            .filter(|p| p.page_type == page_type)
            .collect();
        if group.is_empty() {
            continue;
        }
        lines.push(type_heading(page_type).to_string());
        for (i, page) in group.iter().enumerate() {
            lines.push(page_header(i + 1, page));
            lines.push(format!("{}Source: {}", indent(1), page.source.file));
        }
    }

    let has_problems =
        !report.missing.is_empty() || !report.failed.is_empty() || !report.invalid_urls.is_empty();
    if has_problems {
        lines.push(String::new());
    }
    missing_lines(&report.missing, root, &mut lines);
    if !report.failed.is_empty() {
        lines.push("Failed pages".to_string());
        for failed in &report.failed {
            lines.push(format!("{}{}", indent(1), failed.url));
            lines.push(format!("{}Reason: {}", indent(2), failed.reason));
        }
    }
    string_group("Invalid URLs", &report.invalid_urls, &mut lines);

    lines.push(String::new());
    let mut summary = format!(
        "Wrote {} → {}",
        plural(report.pages.len(), "page", "pages"),
        display_relative(root, &report.output)
    );
    let mut notes = Vec::new();
    for (count, label) in [
        (report.missing.len(), "missing"),
        (report.failed.len(), "failed"),
        (report.invalid_urls.len(), "invalid"),
        (report.skipped.len(), "skipped"),
    ] {
        if count > 0 {
            notes.push(format!("{count} {label}"));
        }
    }
    if !notes.is_empty() {
        summary.push_str(&format!(" ({})", notes.join(", ")));
    }
    lines.push(summary);
    lines
}

pub fn print_extract_output(report: &RunReport, root: &Path) {
    for line in format_extract_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format an input audit.
pub fn format_check_output(audit: &InputAudit, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Listed {}: {} found, {} missing, {} skipped",
        plural(audit.listed, "URL", "URLs"),
        audit.found,
        audit.missing.len(),
        audit.skipped.len()
    )];

    missing_lines(&audit.missing, root, &mut lines);
    string_group("Invalid URLs", &audit.invalid_urls, &mut lines);
    if !audit.duplicates.is_empty() {
        lines.push("Duplicate paths".to_string());
        for group in &audit.duplicates {
            lines.push(format!("{}{}", indent(1), group.path));
            for url in &group.urls {
                lines.push(format!("{}{}", indent(2), url));
            }
        }
    }
    string_group("Unlisted documents", &audit.unlisted, &mut lines);
    lines
}

pub fn print_check_output(audit: &InputAudit, root: &Path) {
    for line in format_check_output(audit, root) {
        println!("{}", line);
    }
}

// ============================================================================
// verify
// ============================================================================

/// Format an artifact audit.
pub fn format_verify_output(audit: &ArtifactAudit) -> Vec<String> {
    let mut lines = vec![format!("Verified {}", plural(audit.pages, "page", "pages"))];
    issue_group("Legacy host links", &audit.legacy_links, &mut lines);
    issue_group("Broken internal links", &audit.broken_links, &mut lines);
    lines
}

pub fn print_verify_output(audit: &ArtifactAudit) {
    for line in format_verify_output(audit) {
        println!("{}", line);
    }
}

// ============================================================================
// list
// ============================================================================

/// One line per record: index, title, path, and type.
pub fn format_list_output(pages: &[&PageRecord]) -> Vec<String> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("{} ({})", page_header(i + 1, page), page.page_type))
        .collect()
}

pub fn print_list_output(pages: &[&PageRecord]) {
    for line in format_list_output(pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
