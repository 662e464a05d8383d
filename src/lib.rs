//! # Content Extract
//!
//! Migrates a mirrored legacy WordPress site into one structured content file.
//! The mirror and a list of source URLs go in; `pages.json` comes out, holding
//! one record per page with its canonical path, type, title, excerpt, hero
//! image, and body as markdown. A static front end reads that file and never
//! touches the legacy HTML again.
//!
//! # Architecture: One Pass, One Write
//!
//! ```text
//! urls.txt ─┐
//!           ├─► per URL: resolve ─► extract ─► classify ─► PageRecord
//! mirror/ ──┘
//!                              records ─► duplicate policy ─► sort ─► pages.json
//! ```
//!
//! Pages are processed one at a time, in list order. Nothing is shared
//! between pages except the compiled rules, and the output file is written
//! once, after every page has been processed. A run either replaces the whole
//! file or leaves the previous one untouched.
//!
//! Per-page problems (a missing mirrored document, a URL that does not parse,
//! markup the rewriter rejects) are logged and skipped. Only setup problems
//! abort: bad config, an unreadable URL list, duplicate paths under the
//! default policy, an unwritable output location.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | The run: URL list, per-page processing, duplicate policy, sort, write |
//! | [`extract`] | Title, content region, sanitization, link rewriting, excerpt, hero image |
//! | [`urls`] | Canonical paths, URL → mirror path mapping, link and asset rewriting |
//! | [`classify`] | Page type from the canonical path alone |
//! | [`markdown`] | HTML → markdown with the front end's formatting contract |
//! | [`types`] | `PageRecord` and the serialized shape of `pages.json` |
//! | [`content`] | Read-only lookups over a written `pages.json` |
//! | [`check`] | Input audit before a run, link audit of the written file |
//! | [`config`] | `extract.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Ordered Strategy Lists
//!
//! Title and content-region detection are ordered lists of selectors in
//! config, tried in sequence, first match wins. Precedence is visible in one
//! place and each candidate can be tested alone. The stock lists match the
//! legacy theme's markup.
//!
//! ## Scraper for Queries, lol_html for Rewriting
//!
//! Selecting the title and content region uses `scraper`'s read-only DOM.
//! Removing chrome and rewriting `href`/`src` happens in a `lol_html` pass over
//! the region's HTML, which owns its buffer for exactly one page. The
//! rewritten fragment is parsed again for the excerpt and hero image, so
//! every derived field sees the same sanitized content.
//!
//! ## Exact Host Matching
//!
//! A host is internal when it equals a configured host or is a subdomain of
//! one (`www.idfilters.rs`). A lookalike such as `notidfilters.rs` is external
//! and its links are left alone.
//!
//! ## Duplicates Are Loud by Default
//!
//! Two URLs normalizing to the same path abort the run unless
//! `[output] duplicates` says otherwise. See [`config::DuplicatePolicy`].

pub mod check;
pub mod classify;
pub mod config;
pub mod content;
pub mod extract;
pub mod markdown;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod urls;

#[cfg(test)]
pub(crate) mod test_helpers;
