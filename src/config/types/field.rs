//! Type-safe config field path.

use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt;

/// A config field path as surfaced in diagnostics.
///
/// Owned rather than `&'static` because rule and whitelist entries are
/// indexed (`rules[2].match`), so most paths are built at sanitization time.
///
/// # Example
///
/// ```ignore
/// diag.error(FieldPath::new("site.url"), "required");
/// diag.warn(FieldPath::indexed("rules", 2, "match"), "empty, entry dropped");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    #[inline]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Path for one field of an indexed list entry, e.g. `rules[2].match`.
    #[inline]
    pub fn indexed(list: &str, index: usize, field: &str) -> Self {
        if field.is_empty() {
            Self(format!("{list}[{index}]"))
        } else {
            Self(format!("{list}[{index}].{field}"))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_paths() {
        assert_eq!(FieldPath::indexed("rules", 0, "type").as_str(), "rules[0].type");
        assert_eq!(FieldPath::indexed("whitelist", 3, "").as_str(), "whitelist[3]");
    }
}
