//! URL normalization and rewriting.
//!
//! Every link and image found inside scraped content passes through this
//! module on its way into the content file. Internal links (any host in the
//! configured allow-list, subdomains included) collapse to canonical
//! site-root paths; everything else is left byte-for-byte alone.
//!
//! ## Canonical Paths
//!
//! A canonical path has exactly one leading slash, no trailing slash, and is
//! percent-decoded. The root is `/`.
//!
//! ```text
//! https://www.idfilters.rs/proizvodi/filter-x/index.html#specs  →  /proizvodi/filter-x#specs
//! //idfilters.rs/o-nama/                                        →  /o-nama
//! https://cdn.example.net/site/wp-content/uploads/a.jpg (asset) →  /wp-content/uploads/a.jpg
//! https://unrelated.example/x                                   →  https://unrelated.example/x
//! ```
//!
//! ## Mirror Layout
//!
//! The legacy site was exported as a static mirror in which every content
//! page is a directory holding an `index.html`. [`resolve_local_document_path`]
//! maps a URL back onto that layout.
//!
//! ## Base URLs
//!
//! Rewriting always happens relative to the page currently being extracted.
//! The base is a parsed [`Url`], so a call site that forgets it does not
//! compile.

use crate::config::SiteConfig;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use url::Url;

/// Canonicalize a pathname: one leading slash, no trailing slash, `/` for root.
///
/// Surrounding whitespace and any run of leading/trailing slashes are removed
/// together, so the result is a fixed point:
/// `normalize_pathname(&normalize_pathname(x)) == normalize_pathname(x)`.
pub fn normalize_pathname(input: &str) -> String {
    let inner = input.trim_matches(|c: char| c == '/' || c.is_whitespace());
    if inner.is_empty() {
        return "/".to_string();
    }
    format!("/{inner}")
}

/// Percent-decode a URL path. Invalid UTF-8 becomes U+FFFD.
pub fn decode_path(path: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(path.as_bytes())).into_owned()
}

/// Canonical path of a page URL, percent-decoded so it matches rewritten
/// link targets.
pub fn canonical_page_path(url: &Url) -> String {
    normalize_pathname(&decode_path(url.path()))
}

/// Map a page URL to the mirrored document expected to hold its HTML.
///
/// - `/` → `<root>/index.html`
/// - `*.xml` / `*.txt` → the file itself under `<root>` (not HTML)
/// - anything else → `<root>/<path>/index.html`
pub fn resolve_local_document_path(root: &Path, url: &Url) -> PathBuf {
    let clean = normalize_pathname(url.path());
    if clean == "/" {
        return root.join("index.html");
    }
    let relative = &clean[1..];
    if relative.ends_with(".xml") || relative.ends_with(".txt") {
        root.join(relative)
    } else {
        root.join(relative).join("index.html")
    }
}

/// Strip a trailing `/index.html`, then a trailing `.html` (ASCII case-insensitive).
pub fn strip_html_suffix(path: &str) -> &str {
    let path = strip_suffix_ignore_case(path, "/index.html");
    strip_suffix_ignore_case(path, ".html")
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> &'a str {
    let Some(cut) = s.len().checked_sub(suffix.len()) else {
        return s;
    };
    if s.is_char_boundary(cut) && s[cut..].eq_ignore_ascii_case(suffix) {
        &s[..cut]
    } else {
        s
    }
}

/// Rewrites `href`/`src` values found in legacy content into the site's own
/// canonical path space.
#[derive(Debug, Clone)]
pub struct UrlRewriter {
    /// Lowercased host names treated as "this site" (subdomains included).
    internal_hosts: Vec<String>,
    /// Upload directory markers such as `/wp-content/`, in priority order.
    asset_segments: Vec<String>,
}

impl UrlRewriter {
    pub fn new<H, A>(internal_hosts: H, asset_segments: A) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        Self {
            internal_hosts: internal_hosts
                .into_iter()
                .map(|h| h.as_ref().trim().trim_matches('.').to_ascii_lowercase())
                .collect(),
            asset_segments: asset_segments
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
        }
    }

    pub fn from_config(site: &SiteConfig) -> Self {
        Self::new(&site.internal_hosts, &site.asset_segments)
    }

    /// True when `host` is one of the internal hosts or a subdomain of one.
    pub fn is_internal_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.internal_hosts.iter().any(|known| {
            host.strip_suffix(known.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
        })
    }

    /// Rewrite a link target found on the page at `base`.
    ///
    /// 1. `#anchor`, `mailto:` and `tel:` pass through.
    /// 2. `//host/...` is read as `https://host/...`.
    /// 3. The value is resolved against `base`. Internal hosts yield the
    ///    canonical path plus the original fragment; any other host yields the
    ///    input unchanged (not the resolved form).
    /// 4. If resolution fails, a string-only cleanup is attempted instead.
    pub fn rewrite_url(&self, value: &str, base: &Url) -> String {
        let value = value.trim();
        if value.is_empty()
            || value.starts_with('#')
            || value.starts_with("mailto:")
            || value.starts_with("tel:")
        {
            return value.to_string();
        }

        let candidate: Cow<'_, str> = if value.starts_with("//") {
            Cow::Owned(format!("https:{value}"))
        } else {
            Cow::Borrowed(value)
        };

        let resolved = match base.join(&candidate) {
            Ok(resolved) => resolved,
            Err(_) => return self.rewrite_unresolvable(value),
        };

        let internal = resolved
            .host_str()
            .is_some_and(|host| self.is_internal_host(host));
        if !internal {
            return value.to_string();
        }

        let decoded = decode_path(resolved.path());
        let mut canonical = normalize_pathname(strip_html_suffix(&decoded));
        if let Some(fragment) = resolved.fragment().filter(|f| !f.is_empty()) {
            canonical.push('#');
            canonical.push_str(fragment);
        }
        canonical
    }

    /// Rewrite an image source, then collapse any upload-directory URL to
    /// start exactly at its asset segment, whatever host served it.
    pub fn rewrite_asset_url(&self, value: &str, base: &Url) -> String {
        let rewritten = self.rewrite_url(value, base);

        for segment in &self.asset_segments {
            if let Some(idx) = rewritten.find(segment.as_str()) {
                return rewritten[idx..].to_string();
            }
        }
        if self.starts_with_bare_asset_segment(&rewritten) {
            return format!("/{rewritten}");
        }
        rewritten
    }

    /// Best-effort cleanup for values the URL parser rejects.
    fn rewrite_unresolvable(&self, value: &str) -> String {
        let bare = strip_html_suffix(value);
        if bare.starts_with('/') {
            return normalize_pathname(bare);
        }
        if self.starts_with_bare_asset_segment(bare) {
            return format!("/{bare}");
        }
        value.to_string()
    }

    fn starts_with_bare_asset_segment(&self, value: &str) -> bool {
        self.asset_segments
            .iter()
            .map(|s| s.trim_start_matches('/'))
            .any(|bare| !bare.is_empty() && value.starts_with(bare))
    }
}
