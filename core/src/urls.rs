//! URL canonicalization, registrable-domain scoping, and the mapping from
//! URLs to on-disk content paths.

use sha1::{Digest, Sha1};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::form_urlencoded;
use url::Url;

/// Filters applied during canonicalization.
#[derive(Debug, Clone)]
pub struct CanonicalPolicy {
    pub allowed_schemes: HashSet<String>,
    pub tracking_params: HashSet<String>,
    pub tracking_prefixes: Vec<String>,
    pub blocked_extensions: HashSet<String>,
    pub strip_trailing_slash: bool,
}

impl Default for CanonicalPolicy {
    /// Scheme filtering and trailing-slash stripping only; no tracking or
    /// extension tables. Crawl runs build their policy from `CrawlConfig`.
    fn default() -> Self {
        Self {
            allowed_schemes: ["http", "https"].iter().map(|s| s.to_string()).collect(),
            tracking_params: HashSet::new(),
            tracking_prefixes: Vec::new(),
            blocked_extensions: HashSet::new(),
            strip_trailing_slash: true,
        }
    }
}

impl CanonicalPolicy {
    fn is_tracking(&self, key: &str) -> bool {
        let k = key.to_ascii_lowercase();
        self.tracking_params.contains(&k)
            || self.tracking_prefixes.iter().any(|p| k.starts_with(p.as_str()))
    }
}

/// Produce the canonical form of `raw`, resolved against `base` when given.
///
/// Returns `None` when the URL cannot be parsed, its scheme is not allowed,
/// or its path ends in a blocked extension. The canonical form has no
/// fragment, a lowercased scheme and host, no default port, no tracking
/// parameters, the remaining query pairs sorted by (key, value), and at most
/// one trailing slash stripped.
pub fn canonicalize(raw: &str, base: Option<&str>, policy: &CanonicalPolicy) -> Option<String> {
    let raw = raw.trim();
    let mut url = match base {
        Some(b) => Url::parse(b).ok()?.join(raw).ok()?,
        None => Url::parse(raw).ok()?,
    };
    url.set_fragment(None);

    // The url crate lowercases scheme and host and drops default ports.
    if !policy.allowed_schemes.contains(url.scheme()) {
        return None;
    }
    if has_blocked_extension(url.path(), &policy.blocked_extensions) {
        return None;
    }

    // Blank-valued pairs are dropped along with tracking keys; survivors are
    // re-encoded in (key, value) order so equal URLs compare equal.
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, v)| !v.is_empty() && !policy.is_tracking(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &pairs {
            ser.append_pair(k, v);
        }
        let query = ser.finish();
        url.set_query(Some(&query));
    }

    if policy.strip_trailing_slash {
        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let stripped = path[..path.len() - 1].to_string();
            url.set_path(&stripped);
        }
    }

    Some(url.into())
}

fn has_blocked_extension(path: &str, blocked: &HashSet<String>) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => blocked.contains(&ext.to_ascii_lowercase()),
        None => false,
    }
}

/// Host component of a URL, or an empty string.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_default()
}

/// eTLD+1 per the public-suffix list, falling back to the full host for
/// addresses the list does not cover (IPs, bare hostnames).
pub fn registrable_domain(url: &str) -> Option<String> {
    let host = host_of(url);
    if host.is_empty() {
        return None;
    }
    match psl::domain_str(&host) {
        Some(d) => Some(d.to_string()),
        None => Some(host),
    }
}

pub fn same_registrable_domain(a: &str, b: &str) -> bool {
    match (registrable_domain(a), registrable_domain(b)) {
        (Some(da), Some(db)) => da == db,
        _ => false,
    }
}

/// Collapse anything outside `[A-Za-z0-9_-]` into single dashes, trim the
/// ends, lowercase; an empty result becomes `_`.
fn safe_part(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_dash = false;
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Deterministic on-disk location for a URL's minimal HTML.
///
/// Layout: `base_dir/<safe-host>/<safe-segments...>/<name>__<8hex>.html`,
/// where the hex suffix is the first 8 chars of SHA-1 over the full URL so
/// distinct URLs with equal sanitized names cannot collide.
pub fn url_to_content_path(url: &str, base_dir: &Path) -> PathBuf {
    let (host, segments) = match Url::parse(url) {
        Ok(u) => (
            u.host_str().unwrap_or("unknown-host").to_string(),
            u.path()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(safe_part)
                .collect::<Vec<_>>(),
        ),
        Err(_) => ("unknown-host".to_string(), Vec::new()),
    };

    let (dirs, mut filename) = match segments.split_last() {
        Some((last, dirs)) => (dirs.to_vec(), last.clone()),
        None => (Vec::new(), "index".to_string()),
    };
    if !filename.contains('.') {
        filename.push_str(".html");
    }

    let mut hasher = Sha1::new();
    hasher.update(url.as_bytes());
    let short = format!("{:x}", hasher.finalize())[..8].to_string();
    filename = match filename.strip_suffix(".html") {
        Some(stem) => format!("{stem}__{short}.html"),
        None => format!("{filename}__{short}"),
    };

    let mut full = base_dir.join(safe_part(&host));
    for d in dirs {
        full = full.join(d);
    }
    full.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CanonicalPolicy {
        crate::config::CrawlConfig::default().canonical_policy()
    }

    #[test]
    fn canonical_form_scenario() {
        let got = canonicalize(
            "HTTP://Example.COM:80/a/b/?utm_source=x&b=2&a=1#frag",
            None,
            &policy(),
        );
        assert_eq!(got.as_deref(), Some("http://example.com/a/b?a=1&b=2"));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let p = policy();
        for raw in [
            "HTTP://Example.COM:80/a/b/?utm_source=x&b=2&a=1#frag",
            "https://example.com/path?z=9&a=1&utm_medium=mail",
            "https://example.com/",
            "http://sub.example.com:8080/x/y/",
        ] {
            let once = canonicalize(raw, None, &p).unwrap();
            let twice = canonicalize(&once, None, &p).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw}");
        }
    }

    #[test]
    fn disallowed_schemes_rejected() {
        let p = policy();
        for raw in [
            "mailto:someone@example.com",
            "javascript:void(0)",
            "ftp://example.com/file",
            "file:///etc/passwd",
        ] {
            assert_eq!(canonicalize(raw, None, &p), None, "accepted {raw}");
        }
    }

    #[test]
    fn tracking_params_and_prefixes_stripped() {
        let got = canonicalize(
            "https://example.com/p?roistat_visit=1&gclid=abc&utm_xyz=1&keep=1",
            None,
            &policy(),
        )
        .unwrap();
        assert_eq!(got, "https://example.com/p?keep=1");
    }

    #[test]
    fn query_sorted_by_key_then_value() {
        let got = canonicalize("https://example.com/p?b=2&a=2&a=1", None, &policy()).unwrap();
        assert_eq!(got, "https://example.com/p?a=1&a=2&b=2");
    }

    #[test]
    fn blank_values_dropped() {
        let got = canonicalize("https://example.com/p?a=&b=1", None, &policy()).unwrap();
        assert_eq!(got, "https://example.com/p?b=1");
    }

    #[test]
    fn default_port_stripped_https() {
        let got = canonicalize("https://example.com:443/x", None, &policy()).unwrap();
        assert_eq!(got, "https://example.com/x");
    }

    #[test]
    fn non_default_port_kept() {
        let got = canonicalize("http://example.com:8080/x", None, &policy()).unwrap();
        assert_eq!(got, "http://example.com:8080/x");
    }

    #[test]
    fn blocked_extensions_rejected() {
        let p = policy();
        assert_eq!(canonicalize("https://example.com/pic.PNG", None, &p), None);
        assert_eq!(canonicalize("https://example.com/doc.pdf", None, &p), None);
        assert!(canonicalize("https://example.com/page.html", None, &p).is_some());
    }

    #[test]
    fn root_slash_kept() {
        let got = canonicalize("https://example.com/", None, &policy()).unwrap();
        assert_eq!(got, "https://example.com/");
    }

    #[test]
    fn relative_resolution_against_base() {
        let got = canonicalize("../c", Some("https://example.com/a/b/"), &policy()).unwrap();
        assert_eq!(got, "https://example.com/a/c");
        assert_eq!(canonicalize("no-base-relative", None, &policy()), None);
    }

    #[test]
    fn registrable_domain_comparison() {
        assert!(same_registrable_domain(
            "https://www.example.com/a",
            "https://blog.example.com/b"
        ));
        assert!(!same_registrable_domain(
            "https://foo.test/x",
            "https://bar.test/y"
        ));
        // Hosts outside the suffix list fall back to exact host equality.
        assert!(same_registrable_domain(
            "http://127.0.0.1:8080/a",
            "http://127.0.0.1:9090/b"
        ));
    }

    #[test]
    fn content_path_shape() {
        let p = url_to_content_path("https://example.com/Docs/Getting Started/", Path::new("out"));
        let s = p.to_string_lossy();
        assert!(s.starts_with("out/example-com/docs/"), "got {s}");
        assert!(s.ends_with(".html"), "got {s}");
        assert!(s.contains("__"), "got {s}");
    }

    #[test]
    fn content_path_root_is_index() {
        let p = url_to_content_path("https://example.com/", Path::new("out"));
        let name = p.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("index__"), "got {name}");
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn content_paths_differ_for_distinct_urls() {
        let a = url_to_content_path("https://example.com/a?x=1", Path::new("out"));
        let b = url_to_content_path("https://example.com/a?x=2", Path::new("out"));
        assert_ne!(a, b);
    }
}
