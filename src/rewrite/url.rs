//! Candidate URL classification.
//!
//! Attribute values are classified before any rewriting decision:
//! - Root-relative values (`/img/a.png`) are anchored to the base site URL
//! - Absolute values are decomposed as-is
//! - Everything else (fragments, `mailto:`, bare relative paths, garbage)
//!   is malformed from the rewriter's point of view and left untouched
//!
//! Decomposition goes through the `url` crate; the whitelist gate and the
//! rule matcher only ever see the decomposed host and path, never the raw
//! string.

use thiserror::Error;
use url::Url;

/// A candidate attribute value could not be decomposed into scheme/host/path.
///
/// Recovered locally: the attribute is skipped, the pass continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed url `{0}`")]
pub struct MalformedUrl(pub String);

/// A decomposed candidate URL.
#[derive(Debug, Clone)]
pub struct ParsedUrl {
    /// Structured form used for host/path access and rewriting.
    pub url: Url,
    /// The attribute value as it appeared in the document.
    pub raw: String,
    /// True when `raw` was root-relative and has been anchored to the base.
    pub anchored: bool,
}

impl ParsedUrl {
    /// Decomposed host, if the URL has an authority.
    #[inline]
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Decomposed path.
    #[inline]
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Classify an attribute value against the base site URL.
///
/// Root-relative values are anchored by trailing-slash-trimmed concatenation
/// with the base, so a base carrying a path prefix
/// (`https://example.github.io/blog`) keeps that prefix. Anything that the
/// `url` crate cannot parse as an absolute URL afterwards is [`MalformedUrl`].
pub fn classify(value: &str, base: &Url) -> Result<ParsedUrl, MalformedUrl> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MalformedUrl(value.to_string()));
    }

    if trimmed.starts_with('/') {
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), trimmed);
        return Url::parse(&joined)
            .map(|url| ParsedUrl {
                url,
                raw: value.to_string(),
                anchored: true,
            })
            .map_err(|_| MalformedUrl(value.to_string()));
    }

    Url::parse(trimmed)
        .map(|url| ParsedUrl {
            url,
            raw: value.to_string(),
            anchored: false,
        })
        .map_err(|_| MalformedUrl(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://blog.example.com").unwrap()
    }

    #[test]
    fn test_classify_absolute() {
        let parsed = classify("http://old.example.com/a/b.png", &base()).unwrap();
        assert_eq!(parsed.host(), Some("old.example.com"));
        assert_eq!(parsed.path(), "/a/b.png");
        assert!(!parsed.anchored);
        assert_eq!(parsed.raw, "http://old.example.com/a/b.png");
    }

    #[test]
    fn test_classify_root_relative() {
        let parsed = classify("/img/logo.png", &base()).unwrap();
        assert_eq!(parsed.host(), Some("blog.example.com"));
        assert_eq!(parsed.path(), "/img/logo.png");
        assert!(parsed.anchored);
        assert_eq!(parsed.raw, "/img/logo.png");
    }

    #[test]
    fn test_classify_root_relative_base_with_prefix() {
        // Anchoring keeps the base path prefix (concatenation, not RFC join)
        let base = Url::parse("https://example.github.io/blog/").unwrap();
        let parsed = classify("/img/logo.png", &base).unwrap();
        assert_eq!(parsed.url.as_str(), "https://example.github.io/blog/img/logo.png");
    }

    #[test]
    fn test_classify_root_relative_no_doubled_slash() {
        let base = Url::parse("https://blog.example.com/").unwrap();
        let parsed = classify("/x.png", &base).unwrap();
        assert_eq!(parsed.url.as_str(), "https://blog.example.com/x.png");
    }

    #[test]
    fn test_classify_preserves_query_and_fragment() {
        let parsed = classify("https://blog.example.com/a.png?v=2#top", &base()).unwrap();
        assert_eq!(parsed.url.query(), Some("v=2"));
        assert_eq!(parsed.url.fragment(), Some("top"));
        assert_eq!(parsed.path(), "/a.png");
    }

    #[test]
    fn test_classify_scheme_without_host() {
        // Parses, but has no host; the whitelist gate will skip it
        let parsed = classify("mailto:user@example.com", &base()).unwrap();
        assert_eq!(parsed.host(), None);
    }

    #[test]
    fn test_classify_malformed() {
        assert!(classify("image.png", &base()).is_err());
        assert!(classify("./image.png", &base()).is_err());
        assert!(classify("#section", &base()).is_err());
        assert!(classify("", &base()).is_err());
        assert!(classify("   ", &base()).is_err());
        assert!(classify("http://", &base()).is_err());
    }

    #[test]
    fn test_classify_host_lowercased() {
        // The url crate normalizes hosts; whitelist entries are lowercased
        // at sanitization time to match
        let parsed = classify("http://Old.Example.COM/x.png", &base()).unwrap();
        assert_eq!(parsed.host(), Some("old.example.com"));
    }
}
