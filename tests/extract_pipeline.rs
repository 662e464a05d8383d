//! End-to-end tests over the fixture site in `fixtures/site`.
//!
//! Each test copies the fixture into a fresh temp directory, so runs never
//! write into the source tree. Library tests call `pipeline::run` directly;
//! CLI tests spawn the built binary.

use content_extract::check::{check_inputs, verify_artifact};
use content_extract::classify::PageType;
use content_extract::config::{DuplicatePolicy, load_config};
use content_extract::content::ContentIndex;
use content_extract::pipeline::{PipelineError, run};
use content_extract::types::{PageRecord, PagesFile};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/site")
}

fn copy_dir_recursive(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).unwrap();
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir_recursive(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// A private copy of the fixture project.
fn setup_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir_recursive(&fixture_dir(), tmp.path());
    tmp
}

fn find<'a>(pages: &'a [PageRecord], path: &str) -> &'a PageRecord {
    pages.iter().find(|p| p.path == path).unwrap_or_else(|| {
        let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
        panic!("page '{path}' not found. Available: {paths:?}")
    })
}

fn cli(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_content-extract"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run content-extract")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// Library: full run
// ---------------------------------------------------------------------------

#[test]
fn fixture_run_produces_sorted_records() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();

    let report = run(tmp.path(), &config).unwrap();

    let paths: Vec<&str> = report.pages.iter().map(|p| p.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/",
            "/aplikacija/industrija",
            "/o-nama",
            "/proizvodi",
            "/proizvodi/filter-x",
            "/proizvodi/filter-x/attachment/spec-sheet",
        ]
    );
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].url, "https://www.idfilters.rs/kontakt/");
    assert_eq!(report.skipped, vec!["https://www.idfilters.rs/robots.txt"]);
    assert!(report.failed.is_empty());
    assert!(report.invalid_urls.is_empty());
}

#[test]
fn fixture_pages_are_classified_from_path() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();
    let report = run(tmp.path(), &config).unwrap();

    let types: Vec<(&str, PageType)> = report
        .pages
        .iter()
        .map(|p| (p.path.as_str(), p.page_type))
        .collect();
    assert_eq!(
        types,
        vec![
            ("/", PageType::Home),
            ("/aplikacija/industrija", PageType::Application),
            ("/o-nama", PageType::Page),
            ("/proizvodi", PageType::ProductsIndex),
            ("/proizvodi/filter-x", PageType::Product),
            ("/proizvodi/filter-x/attachment/spec-sheet", PageType::Attachment),
        ]
    );
}

#[test]
fn product_page_is_sanitized_and_rewritten() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();
    let report = run(tmp.path(), &config).unwrap();

    let product = find(&report.pages, "/proizvodi/filter-x");
    assert_eq!(product.title, "Filter X");
    assert!(product.excerpt.starts_with("Filter X je kasetni filter"));
    assert_eq!(
        product.hero_image.as_deref(),
        Some("/wp-content/uploads/2021/03/filter-x-300x200.jpg")
    );
    assert_eq!(product.source.url, "https://www.idfilters.rs/proizvodi/filter-x/");
    assert_eq!(product.source.file, "mirror/proizvodi/filter-x/index.html");

    let md = &product.markdown;
    assert!(md.contains("## Specifikacija"), "{md}");
    assert!(md.contains("m<sup>3</sup>/h"), "{md}");
    assert!(md.contains("CO<sub>2</sub>"), "{md}");
    assert!(md.contains("_ePM1 55%_"), "{md}");
    assert!(md.contains("(/proizvodi/filter-x#specs)"), "{md}");
    assert!(md.contains("(/proizvodi/filter-x/attachment/spec-sheet)"), "{md}");
    assert!(md.contains("(/proizvodi)"), "{md}");
    assert!(md.contains("https://www.partner.example/katalog?id=7"), "{md}");
    assert!(md.contains("mailto:prodaja@idfilters.rs"), "{md}");
    assert!(md.contains("(/wp-content/uploads/2021/03/filter-x-presek.png)"), "{md}");

    assert!(!md.contains("trackingId"), "{md}");
    assert!(!md.contains("Widget text"), "{md}");
    assert!(!md.contains("Pošalji"), "{md}");
    assert!(!md.contains("900w"), "{md}");
    assert!(!md.contains("idfilters.rs/proizvodi"), "{md}");
}

#[test]
fn fallbacks_apply_per_page() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();
    let report = run(tmp.path(), &config).unwrap();

    // No subheader: <title> wins; image-only first paragraph: region text
    let home = find(&report.pages, "/");
    assert_eq!(home.title, "ID Filters – Industrijski filteri");
    assert!(home.excerpt.starts_with("ID Filters projektuje"), "{}", home.excerpt);
    assert_eq!(
        home.hero_image.as_deref(),
        Some("/wp-content/uploads/2020/01/naslovna.jpg")
    );

    // Second content-region candidate
    let app = find(&report.pages, "/aplikacija/industrija");
    assert_eq!(app.title, "Industrija");
    assert!(app.markdown.contains("[Filter X](/proizvodi/filter-x)"), "{}", app.markdown);

    // No content region at all: record kept with empty fields
    let about = find(&report.pages, "/o-nama");
    assert_eq!(about.title, "O nama – ID Filters");
    assert_eq!(about.excerpt, "");
    assert_eq!(about.markdown, "");
    assert_eq!(about.hero_image, None);
}

#[test]
fn written_file_matches_report_and_loads_into_index() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();
    let report = run(tmp.path(), &config).unwrap();

    let written = fs::read_to_string(tmp.path().join("out/pages.json")).unwrap();
    assert!(written.ends_with("}\n"));
    assert!(written.contains("\"heroImage\": null"));
    assert!(written.contains("\"type\": \"products_index\""));
    let parsed: PagesFile = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed.pages, report.pages);

    let index = ContentIndex::load(&report.output).unwrap();
    assert_eq!(index.len(), 6);
    assert_eq!(index.products().len(), 1);
    assert_eq!(index.applications().len(), 1);
    assert_eq!(index.attachments().len(), 1);
    assert_eq!(index.get("/proizvodi").unwrap().title, "Proizvodi");
}

#[test]
fn rerun_is_deterministic() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();
    let output = tmp.path().join("out/pages.json");

    run(tmp.path(), &config).unwrap();
    let first = fs::read(&output).unwrap();
    run(tmp.path(), &config).unwrap();
    let second = fs::read(&output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn duplicate_listing_aborts_unless_policy_allows() {
    let tmp = setup_fixture();
    let urls = tmp.path().join("urls.txt");
    let mut list = fs::read_to_string(&urls).unwrap();
    list.push_str("https://www.idfilters.rs/proizvodi\n");
    fs::write(&urls, list).unwrap();

    let mut config = load_config(tmp.path()).unwrap();
    let err = run(tmp.path(), &config).unwrap_err();
    assert!(matches!(err, PipelineError::DuplicatePath { ref path, .. } if path == "/proizvodi"));
    assert!(!tmp.path().join("out/pages.json").exists());

    config.output.duplicates = DuplicatePolicy::KeepFirst;
    let report = run(tmp.path(), &config).unwrap();
    assert_eq!(report.pages.len(), 6);
    assert_eq!(
        find(&report.pages, "/proizvodi").source.url,
        "https://www.idfilters.rs/proizvodi/"
    );
}

// ---------------------------------------------------------------------------
// Library: audits
// ---------------------------------------------------------------------------

#[test]
fn check_reports_missing_and_unlisted() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();

    let audit = check_inputs(tmp.path(), &config).unwrap();

    assert_eq!(audit.listed, 8);
    assert_eq!(audit.found, 6);
    assert_eq!(audit.missing.len(), 1);
    assert_eq!(audit.skipped.len(), 1);
    assert_eq!(audit.unlisted, vec!["/stara-strana"]);
    assert!(audit.duplicates.is_empty());
}

#[test]
fn fixture_output_verifies_clean() {
    let tmp = setup_fixture();
    let config = load_config(tmp.path()).unwrap();
    let report = run(tmp.path(), &config).unwrap();

    let index = ContentIndex::load(&report.output).unwrap();
    let audit = verify_artifact(&index, &config.site);

    assert!(audit.is_clean(), "{audit:?}");
    assert_eq!(audit.pages, 6);
}

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[test]
fn cli_extract_writes_file_and_summary() {
    let tmp = setup_fixture();

    let output = cli(tmp.path(), &["extract"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(out.contains("001 Filter X → /proizvodi/filter-x"), "{out}");
    assert!(out.contains("Missing documents"), "{out}");
    assert!(out.contains("Wrote 6 pages → out/pages.json (1 missing, 1 skipped)"), "{out}");
    assert!(tmp.path().join("out/pages.json").exists());
}

#[test]
fn cli_check_fails_on_missing_documents() {
    let tmp = setup_fixture();

    let output = cli(tmp.path(), &["check"]);

    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Listed 8 URLs: 6 found, 1 missing, 1 skipped"), "{out}");
    assert!(out.contains("    /stara-strana"), "{out}");
    assert!(!tmp.path().join("out/pages.json").exists());
}

#[test]
fn cli_verify_and_list_after_extract() {
    let tmp = setup_fixture();
    assert!(cli(tmp.path(), &["extract"]).status.success());

    let verify = cli(tmp.path(), &["verify"]);
    assert!(verify.status.success(), "{}", stdout(&verify));
    assert!(stdout(&verify).contains("Verified 6 pages"));

    let list = cli(tmp.path(), &["list", "--type", "product"]);
    assert!(list.status.success());
    assert_eq!(stdout(&list).trim(), "001 Filter X → /proizvodi/filter-x (product)");
}

#[test]
fn cli_verify_flags_leftover_legacy_links() {
    let tmp = setup_fixture();
    assert!(cli(tmp.path(), &["extract"]).status.success());

    let path = tmp.path().join("out/pages.json");
    let mut file: PagesFile = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    file.pages[0].markdown = "[stari link](https://www.idfilters.rs/stari/)".to_string();
    fs::write(&path, file.to_json().unwrap()).unwrap();

    let output = cli(tmp.path(), &["verify"]);
    assert!(!output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Legacy host links"), "{out}");
    assert!(out.contains("    / → https://www.idfilters.rs/stari/"), "{out}");
}

#[test]
fn cli_gen_config_prints_stock_file() {
    let tmp = TempDir::new().unwrap();

    let output = cli(tmp.path(), &["gen-config"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("[paths]"));
    assert!(text.contains("duplicates = \"error\""));
}

#[test]
fn cli_rejects_bad_config() {
    let tmp = setup_fixture();
    fs::write(tmp.path().join("extract.toml"), "[site]\nunknown_key = 1\n").unwrap();

    let output = cli(tmp.path(), &["extract"]);

    assert!(!output.status.success());
    assert!(!tmp.path().join("out/pages.json").exists());
}
