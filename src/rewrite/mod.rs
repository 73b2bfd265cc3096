//! The URL rewrite engine.
//!
//! Takes a generated HTML document plus an immutable configuration snapshot
//! (rules, whitelist, base site URL) and produces a new document in which
//! qualifying `href`/`src` values point at the configured CDN hosts. All
//! other markup passes through byte-for-byte.
//!
//! # Per-attribute pipeline
//!
//! ```text
//! classify (url.rs) -> whitelist gate -> rule match (rules.rs)
//!     -> strategy (strategy.rs) or identity -> splice (walk.rs)
//! ```
//!
//! No failure inside a single attribute aborts the pass; the worst case is a
//! document with fewer rewrites than expected.

pub mod rules;
pub mod strategy;
pub mod url;
mod walk;

use ::url::Url;
use rustc_hash::{FxHashMap, FxHashSet};

pub use rules::{RewriteKind, RewriteRule, RuleSet};

/// Configuration format version this engine understands.
///
/// Any other version passes documents through unmodified, so an older binary
/// never misinterprets a newer configuration.
pub const FORMAT_VERSION: &str = "1.0";

/// A `(tag, attribute)` pair the document walk inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub tag: String,
    pub attr: String,
}

impl Target {
    pub fn new(tag: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attr: attr.into(),
        }
    }
}

/// Default targets: anchor hrefs and image sources.
pub fn default_targets() -> Vec<Target> {
    vec![Target::new("a", "href"), Target::new("img", "src")]
}

/// Immutable snapshot the engine operates on.
///
/// Supplied fresh (or cached) per invocation by the configuration store;
/// never mutated by the engine. Passes sharing one snapshot may run in
/// parallel, one document each.
#[derive(Debug, Clone)]
pub struct RewriteSettings {
    /// Config format version tag, compared against [`FORMAT_VERSION`].
    pub version: String,
    /// Base site URL for root-relative anchoring.
    pub base: Url,
    /// Ordered rewrite rules.
    pub rules: RuleSet,
    /// Hosts eligible for rewriting (lowercase, as sanitized).
    pub whitelist: FxHashSet<String>,
    /// Element/attribute pairs to inspect.
    pub targets: Vec<Target>,
}

/// Result of one rewrite pass.
#[derive(Debug)]
pub struct RewriteOutcome {
    /// The rewritten document.
    pub html: String,
    /// Number of attribute values that changed.
    pub rewritten: usize,
}

/// The document rewriter.
///
/// Holds only immutable state, so a single instance can serve concurrent
/// passes.
#[derive(Debug)]
pub struct Rewriter {
    settings: RewriteSettings,
    /// Lowercased tag name -> attributes to inspect on it.
    targets: FxHashMap<String, Vec<String>>,
}

impl Rewriter {
    pub fn new(settings: RewriteSettings) -> Self {
        let mut targets: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for target in &settings.targets {
            targets
                .entry(target.tag.to_ascii_lowercase())
                .or_default()
                .push(target.attr.to_ascii_lowercase());
        }
        Self { settings, targets }
    }

    /// Rewrite a document, returning the new document text.
    pub fn rewrite(&self, input: &str) -> String {
        self.rewrite_with_stats(input).html
    }

    /// Rewrite a document, reporting how many attributes changed.
    ///
    /// On a config format version mismatch the input passes through
    /// byte-identical with zero rewrites.
    pub fn rewrite_with_stats(&self, input: &str) -> RewriteOutcome {
        if self.settings.version != FORMAT_VERSION {
            return RewriteOutcome {
                html: input.to_string(),
                rewritten: 0,
            };
        }
        walk::rewrite_html(input, self)
    }

    /// Attributes to inspect on a raw (possibly mixed-case) tag name.
    pub(crate) fn attrs_for(&self, tag: &[u8]) -> Option<&[String]> {
        let name = std::str::from_utf8(tag).ok()?.to_ascii_lowercase();
        self.targets.get(&name).map(Vec::as_slice)
    }

    /// Run the per-URL pipeline on one decoded attribute value.
    ///
    /// `None` leaves the attribute untouched: malformed value, host-less
    /// URL, non-whitelisted host, or an unmatched already-absolute URL.
    pub(crate) fn rewrite_url(&self, value: &str) -> Option<String> {
        let parsed = url::classify(value, &self.settings.base).ok()?;

        let host = parsed.host()?;
        if !self.settings.whitelist.contains(host) {
            return None;
        }

        match self.settings.rules.find_match(parsed.path()) {
            Some(rule) => strategy::apply(rule, &parsed, &self.settings.base),
            // No rule matched: the URL itself is left unmodified, but a
            // root-relative value is still written back in resolved form
            None => parsed.anchored.then(|| parsed.url.to_string()),
        }
    }
}
