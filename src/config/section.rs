//! Configuration sections and their sanitizers.
//!
//! Raw sections are plain serde structs; nothing reaches the engine until it
//! has gone through the sanitizers below, which drop invalid entries into
//! [`ConfigDiagnostics`] instead of failing the whole load.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://blog.example.com"   # base for root-relative links
//!
//! whitelist = ["blog.example.com"]   # hosts eligible for rewriting
//!
//! [[rules]]
//! type = "host-only"                 # host-only | full-url
//! match = "png"                      # path suffix, word characters only
//! replacement = "cdn.example.net"
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::rewrite::{RewriteKind, RewriteRule, Target, default_targets};

use super::types::{ConfigDiagnostics, FieldPath};

// ============================================================================
// Sections
// ============================================================================

/// `[site]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Canonical site URL; root-relative links are anchored here.
    pub url: Option<String>,
}

/// One `[[rules]]` entry as written in the config file.
///
/// `type` stays a raw string so an unknown strategy is dropped with a
/// diagnostic during sanitization instead of failing the TOML parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleEntry {
    /// Rewrite strategy: "host-only" or "full-url".
    #[serde(rename = "type")]
    pub kind: String,

    /// Path suffix that triggers this rule.
    #[serde(rename = "match")]
    pub suffix: String,

    /// Replacement host (host-only) or replacement base URL (full-url).
    pub replacement: String,
}

/// `[rewrite]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteSection {
    /// Element/attribute pairs to inspect, e.g. `[["a", "href"]]`.
    /// Empty means the default anchor/image targets.
    pub targets: Vec<(String, String)>,
}

// ============================================================================
// Sanitization
// ============================================================================

/// Non-word characters, stripped from rule suffixes.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

/// A single domain label: alphanumeric start, up to 63 chars of
/// alphanumerics and hyphens.
static DOMAIN_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,62}$").expect("valid regex"));

/// Parse and validate the base site URL.
pub(crate) fn sanitize_base(site: &SiteSection, diag: &mut ConfigDiagnostics) -> Option<Url> {
    let Some(raw) = site.url.as_deref() else {
        diag.error_with_hint(
            FieldPath::new("site.url"),
            "required for rewriting",
            "set [site] url = \"https://your-site.example\"",
        );
        return None;
    };

    match Url::parse(raw.trim()) {
        Ok(url) if url.host_str().is_some() => Some(url),
        _ => {
            diag.error(
                FieldPath::new("site.url"),
                format!("`{raw}` is not an absolute URL with a host"),
            );
            None
        }
    }
}

/// Sanitize the ordered rule list, dropping invalid entries.
///
/// Order of surviving rules is preserved; it decides match priority.
pub(crate) fn sanitize_rules(
    entries: &[RuleEntry],
    diag: &mut ConfigDiagnostics,
) -> Vec<RewriteRule> {
    let mut rules = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let kind = match entry.kind.as_str() {
            "host-only" => RewriteKind::HostOnly,
            "full-url" => RewriteKind::FullUrl,
            other => {
                diag.warn(
                    FieldPath::indexed("rules", i, "type"),
                    format!("invalid rule type `{other}`, entry dropped"),
                );
                continue;
            }
        };

        let suffix = NON_WORD.replace_all(&entry.suffix, "").into_owned();
        if suffix.is_empty() {
            diag.warn(
                FieldPath::indexed("rules", i, "match"),
                "empty after removing non-word characters, entry dropped",
            );
            continue;
        }

        let replacement = match kind {
            RewriteKind::HostOnly => {
                let host = strip_scheme(entry.replacement.trim());
                if !is_valid_domain(host) {
                    diag.warn(
                        FieldPath::indexed("rules", i, "replacement"),
                        format!("`{}` is not a valid domain name, entry dropped", entry.replacement),
                    );
                    continue;
                }
                host.to_ascii_lowercase()
            }
            RewriteKind::FullUrl => {
                let target = entry.replacement.trim();
                let absolute_with_host =
                    Url::parse(target).is_ok_and(|u| u.host_str().is_some());
                if !target.starts_with('/') && !absolute_with_host {
                    diag.warn(
                        FieldPath::indexed("rules", i, "replacement"),
                        format!(
                            "`{}` is neither an absolute URL nor a root-relative path, entry dropped",
                            entry.replacement
                        ),
                    );
                    continue;
                }
                target.to_string()
            }
        };

        rules.push(RewriteRule {
            kind,
            suffix,
            replacement,
        });
    }

    rules
}

/// Sanitize whitelist domains.
///
/// Empty entries vanish silently; schemes and trailing slashes are stripped;
/// entries failing domain validation are dropped with a diagnostic. Surviving
/// domains are lowercased so engine comparison is byte-exact against parsed
/// (lowercase) hosts.
pub(crate) fn sanitize_whitelist(
    entries: &[String],
    diag: &mut ConfigDiagnostics,
) -> Vec<String> {
    let mut domains = Vec::with_capacity(entries.len());

    for (i, raw) in entries.iter().enumerate() {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }

        let host = strip_scheme(value).trim_end_matches('/');
        if !is_valid_domain(host) {
            diag.warn(
                FieldPath::indexed("whitelist", i, ""),
                format!("invalid domain name `{value}`, entry dropped"),
            );
            continue;
        }

        domains.push(host.to_ascii_lowercase());
    }

    domains
}

/// Sanitize `[rewrite] targets`, falling back to the defaults when nothing
/// usable remains.
pub(crate) fn sanitize_targets(
    targets: &[(String, String)],
    diag: &mut ConfigDiagnostics,
) -> Vec<Target> {
    if targets.is_empty() {
        return default_targets();
    }

    let mut sanitized = Vec::with_capacity(targets.len());
    for (i, (tag, attr)) in targets.iter().enumerate() {
        let tag = tag.trim().to_ascii_lowercase();
        let attr = attr.trim().to_ascii_lowercase();
        if tag.is_empty() || attr.is_empty() {
            diag.warn(
                FieldPath::indexed("rewrite.targets", i, ""),
                "tag and attribute must both be non-empty, entry dropped",
            );
            continue;
        }
        sanitized.push(Target::new(tag, attr));
    }

    if sanitized.is_empty() {
        default_targets()
    } else {
        sanitized
    }
}

/// Strip a leading `http://`, `https://`, or bare `//`.
fn strip_scheme(value: &str) -> &str {
    value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .or_else(|| value.strip_prefix("//"))
        .unwrap_or(value)
}

/// Validate a domain name: dot-separated labels, each alphanumeric-led,
/// no trailing hyphen.
fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain
            .split('.')
            .all(|label| DOMAIN_LABEL.is_match(label) && !label.ends_with('-'))
}

// ============================================================================
// Tests
// ============================================================================
