//! The two rewrite strategies.
//!
//! Both are pure functions of `(parsed url, rule, base site url)`. A return
//! of `None` means the substitution could not be applied and the URL must be
//! left unmodified.

use url::Url;

use crate::debug;

use super::rules::{RewriteKind, RewriteRule};
use super::url::ParsedUrl;

/// Apply `rule` to a whitelisted URL.
///
/// `None` leaves the attribute untouched. This only happens for host
/// substitutions on host-less or cannot-be-a-base URLs, which the whitelist
/// gate already filters out in practice; it is kept as the defined fallback
/// instead of a panic path.
pub fn apply(rule: &RewriteRule, parsed: &ParsedUrl, base: &Url) -> Option<String> {
    match rule.kind {
        RewriteKind::HostOnly => rewrite_host(parsed, &rule.replacement),
        RewriteKind::FullUrl => Some(rewrite_full(parsed, &rule.replacement, base)),
    }
}

/// Replace only the authority host, preserving scheme, port, path, query,
/// and fragment.
fn rewrite_host(parsed: &ParsedUrl, replacement: &str) -> Option<String> {
    let mut url = parsed.url.clone();
    if url.set_host(Some(replacement)).is_err() {
        debug!("rewrite"; "cannot substitute host in `{}`", parsed.raw);
        return None;
    }
    Some(url.to_string())
}

/// Replace scheme, host, and path, keeping only the final path segment.
///
/// A root-relative replacement is made absolute against the base site URL,
/// so full-url rewrites always produce a directly fetchable address.
fn rewrite_full(parsed: &ParsedUrl, replacement: &str, base: &Url) -> String {
    // Everything after the final `/` of the path; empty when the path ends
    // in `/` or has no segments
    let filename = parsed
        .url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("");

    let mut target = replacement.to_string();
    if !target.ends_with('/') {
        target.push('/');
    }
    target.push_str(filename);

    if target.starts_with('/') {
        format!("{}{}", base.as_str().trim_end_matches('/'), target)
    } else {
        target
    }
}
