//! URL building and slug helpers.
//!
//! Links rendered by applications depend on the exact shapes produced
//! here, so every rule below is deliberately literal.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::router::normalize_prefix;

/// Characters removed from slugs.
static SLUG_STRIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_[:space:]-]").expect("slug strip regex is valid"));

/// Whitespace and hyphen runs.
static SLUG_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[:space:]-]+").expect("slug run regex is valid"));

/// Single whitespace or underscore.
static SLUG_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[[:space:]_]").expect("slug separator regex is valid"));

/// Accented characters folded to ASCII in slugs.
const TRANSLITERATIONS: [(char, char); 18] = [
    ('á', 'a'),
    ('à', 'a'),
    ('â', 'a'),
    ('ã', 'a'),
    ('é', 'e'),
    ('è', 'e'),
    ('ê', 'e'),
    ('í', 'i'),
    ('ì', 'i'),
    ('î', 'i'),
    ('ó', 'o'),
    ('ò', 'o'),
    ('ô', 'o'),
    ('õ', 'o'),
    ('ú', 'u'),
    ('ù', 'u'),
    ('û', 'u'),
    ('ç', 'c'),
];

/// Turns arbitrary text into a URL slug.
///
/// # Example
///
/// ```
/// use orbital_router::create_uri;
///
/// assert_eq!(create_uri("Café São-Paulo"), "cafe-sao-paulo");
/// ```
pub fn create_uri(text: &str) -> String {
    let folded: String = text
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            TRANSLITERATIONS
                .iter()
                .find(|(accent, _)| *accent == c)
                .map_or(c, |(_, plain)| *plain)
        })
        .collect();

    let slug = SLUG_STRIP.replace_all(&folded, "");
    let slug = SLUG_RUNS.replace_all(&slug, " ");
    let slug = SLUG_SEPARATOR.replace_all(&slug, "-");

    slug.trim_matches('-').to_string()
}

/// Joins a base URL, a location and a query string.
///
/// Duplicate slashes are collapsed everywhere except right after a `:`,
/// which keeps `scheme://` intact.
///
/// # Example
///
/// ```
/// use orbital_router::create_url;
///
/// assert_eq!(
///     create_url("http://example.com/", "path", Some("q=1")),
///     "http://example.com/path/?q=1"
/// );
/// ```
pub fn create_url(url: &str, location: &str, query: Option<&str>) -> String {
    let mut url = url.trim_matches('/').to_string();

    if !is_blank(location) {
        url.push('/');
        url.push_str(location);
    }

    if let Some(query) = query.filter(|q| !is_blank(q)) {
        url.push_str("/?");
        url.push_str(&query.replace('?', ""));
    }

    collapse_slashes(&url)
}

/// `""` and `"0"` count as no value.
fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Replaces runs of two to five slashes with one, unless the run starts
/// right after a `:`. Longer runs are consumed five at a time.
fn collapse_slashes(url: &str) -> String {
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'/' || (i > 0 && bytes[i - 1] == b':') {
            i += 1;
            continue;
        }

        let run = bytes[i..].iter().take_while(|b| **b == b'/').count();
        if run < 2 {
            i += 1;
            continue;
        }

        let take = run.min(5);
        out.push_str(&url[start..i]);
        out.push('/');
        i += take;
        start = i;
    }

    out.push_str(&url[start..]);
    out
}

/// Builds absolute URLs for an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base_url: String,
    prefix: String,
}

impl UrlBuilder {
    /// Creates a builder for `base_url` with the root prefix.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            prefix: "/".to_string(),
        }
    }

    /// Sets the route prefix used by [`UrlBuilder::path_url`].
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = normalize_prefix(prefix);
        self
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a URL for `location`. Unless `ignore_path` is set, the route
    /// prefix is inserted after the base URL.
    pub fn url(&self, location: &str, query: Option<&str>, ignore_path: bool) -> String {
        let mut base = self.base_url.clone();

        if !ignore_path && !self.prefix.is_empty() {
            base.push('/');
            base.push_str(self.prefix.trim_matches('/'));
        }

        create_url(&base, location, query)
    }

    /// Builds a URL for `location` under the route prefix.
    pub fn path_url(&self, location: &str, query: Option<&str>) -> String {
        self.url(location, query, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basic() {
        assert_eq!(create_uri("Hello World"), "hello-world");
        assert_eq!(create_uri("Café São-Paulo"), "cafe-sao-paulo");
    }

    #[test]
    fn test_slug_strips_symbols() {
        assert_eq!(create_uri("Rust & C++: a comparison!"), "rust-c-a-comparison");
        assert_eq!(create_uri("  --trim me--  "), "trim-me");
    }

    #[test]
    fn test_slug_underscores_become_hyphens_one_by_one() {
        assert_eq!(create_uri("snake__case name"), "snake--case-name");
        assert_eq!(create_uri("a _ b"), "a---b");
    }

    #[test]
    fn test_slug_folds_only_listed_accents() {
        assert_eq!(create_uri("ação útil"), "acao-util");
        assert_eq!(create_uri("über"), "ber");
    }

    #[test]
    fn test_slug_is_ascii_lowercase_only() {
        assert_eq!(create_uri("ÉCOLE"), "cole");
    }

    #[test]
    fn test_create_url() {
        assert_eq!(
            create_url("http://example.com/", "path", Some("q=1")),
            "http://example.com/path/?q=1"
        );
        assert_eq!(create_url("http://example.com", "", None), "http://example.com");
        assert_eq!(
            create_url("http://example.com", "/about/", None),
            "http://example.com/about/"
        );
    }

    #[test]
    fn test_create_url_strips_question_marks() {
        assert_eq!(
            create_url("http://example.com", "search", Some("?q=a?b")),
            "http://example.com/search/?q=ab"
        );
        assert_eq!(create_url("http://example.com", "x", Some("")), "http://example.com/x");
    }

    #[test]
    fn test_create_url_treats_zero_as_empty() {
        assert_eq!(create_url("http://a.com", "0", None), "http://a.com");
        assert_eq!(create_url("http://a.com", "x", Some("0")), "http://a.com/x");
        assert_eq!(create_url("http://a.com", "0", Some("0")), "http://a.com");
        assert_eq!(create_url("http://a.com", "00", Some("p=0")), "http://a.com/00/?p=0");
    }

    #[test]
    fn test_collapse_slashes() {
        assert_eq!(collapse_slashes("http://a.com//b///c"), "http://a.com/b/c");
        assert_eq!(collapse_slashes("a//////b"), "a//b");
        assert_eq!(collapse_slashes(":///x"), "://x");
        assert_eq!(collapse_slashes("/"), "/");
    }

    #[test]
    fn test_url_builder() {
        let urls = UrlBuilder::new("https://shop.test").with_prefix("store");
        assert_eq!(urls.url("cart", None, true), "https://shop.test/cart");
        assert_eq!(urls.path_url("cart", None), "https://shop.test/store/cart");
        assert_eq!(
            urls.path_url("", Some("page=2")),
            "https://shop.test/store/?page=2"
        );
    }

    #[test]
    fn test_url_builder_root_prefix() {
        let urls = UrlBuilder::new("https://shop.test/");
        assert_eq!(urls.path_url("cart", None), "https://shop.test/cart");
    }
}
