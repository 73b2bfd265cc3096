//! Rewrite rules and first-match-wins suffix matching.

/// Which part of a matched URL a rule replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteKind {
    /// Replace only the authority host, keep path/query/fragment.
    HostOnly,
    /// Replace scheme, host, and path, keep only the filename.
    FullUrl,
}

/// A sanitized rewrite rule.
///
/// Invariants (enforced by config sanitization, not re-checked here):
/// - `suffix` is non-empty and contains word characters only
/// - for [`RewriteKind::HostOnly`], `replacement` is a valid lowercase domain
/// - for [`RewriteKind::FullUrl`], `replacement` is an absolute URL or a
///   root-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub kind: RewriteKind,
    /// Path suffix that triggers this rule.
    pub suffix: String,
    /// Replacement host or replacement base URL.
    pub replacement: String,
}

/// An ordered sequence of rewrite rules.
///
/// Order is significant end-to-end: the first rule whose suffix matches
/// wins, regardless of specificity.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the first rule whose suffix ends `path`.
    ///
    /// Byte-exact, case-sensitive comparison. `None` means the URL is left
    /// unmodified.
    pub fn find_match(&self, path: &str) -> Option<&RewriteRule> {
        self.rules.iter().find(|r| path.ends_with(&r.suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: RewriteKind, suffix: &str, replacement: &str) -> RewriteRule {
        RewriteRule {
            kind,
            suffix: suffix.to_string(),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_find_match_suffix() {
        let rules = RuleSet::new(vec![rule(RewriteKind::HostOnly, "png", "cdn.example.net")]);
        assert!(rules.find_match("/a/b.png").is_some());
        assert!(rules.find_match("/a/b.jpg").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // Both suffixes match; the earlier rule wins even though the later
        // one is more specific
        let rules = RuleSet::new(vec![
            rule(RewriteKind::HostOnly, "png", "first.example.net"),
            rule(RewriteKind::HostOnly, "logopng", "second.example.net"),
        ]);
        let matched = rules.find_match("/img/logopng").unwrap();
        assert_eq!(matched.replacement, "first.example.net");
    }

    #[test]
    fn test_order_is_preserved() {
        let rules = RuleSet::new(vec![
            rule(RewriteKind::FullUrl, "css", "https://a.example.net/x"),
            rule(RewriteKind::HostOnly, "css", "b.example.net"),
        ]);
        assert_eq!(rules.find_match("/style.css").unwrap().kind, RewriteKind::FullUrl);
    }

    #[test]
    fn test_case_sensitive() {
        let rules = RuleSet::new(vec![rule(RewriteKind::HostOnly, "png", "cdn.example.net")]);
        assert!(rules.find_match("/a/b.PNG").is_none());
    }

    #[test]
    fn test_empty_rule_set() {
        let rules = RuleSet::default();
        assert!(rules.is_empty());
        assert!(rules.find_match("/a/b.png").is_none());
    }
}
