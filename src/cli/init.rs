//! Configuration file generation.
//!
//! Writes a commented starter `cdnshift.toml`; `--dry` prints the template
//! to stdout instead.

use anyhow::{Context, Result};
use std::fs;

use crate::config::Config;
use crate::log;

/// Generate cdnshift.toml content with comments
pub fn config_template() -> String {
    format!(
        r#"# cdnshift configuration file (v{})
# https://github.com/cdnshift/cdnshift

# Config format version understood by this binary. Leave as-is.
version = "1.0"

# Hosts eligible for rewriting. Defaults to the site host when empty.
whitelist = ["example.com"]

[site]
# Canonical site URL. Root-relative links are anchored here.
url = "https://example.com"

# Rules are tried in order; the first whose suffix ends the URL path wins.

[[rules]]
# Swap just the host, keep path, query, and fragment.
type = "host-only"
match = "png"
replacement = "cdn.example.net"

[[rules]]
# Replace everything up to the filename.
type = "full-url"
match = "css"
replacement = "https://assets.example.net/styles"

# Elements scanned for URLs. Anchors and images by default.
# [rewrite]
# targets = [["a", "href"], ["img", "src"]]
"#,
        env!("CARGO_PKG_VERSION")
    )
}

/// Create a new configuration file at the resolved config path.
pub fn run(config: &Config, dry_run: bool) -> Result<()> {
    if dry_run {
        print!("{}", config_template());
        return Ok(());
    }

    let path = &config.config_path;
    if path.exists() {
        log!("error"; "{} already exists", path.display());
        std::process::exit(1);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, config_template())
        .with_context(|| format!("failed to write {}", path.display()))?;

    log!("init"; "wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_without_unknown_fields() {
        let (config, ignored) = Config::parse_with_ignored(&config_template()).unwrap();
        assert!(ignored.is_empty(), "template has unknown fields: {ignored:?}");
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.whitelist, vec!["example.com"]);
    }

    #[test]
    fn test_template_sanitizes_cleanly() {
        let config = Config::from_str(&config_template()).unwrap();
        let sanitized = config.sanitize();
        assert!(!sanitized.diagnostics.has_errors());
        assert!(sanitized.diagnostics.warnings().is_empty());
        assert_eq!(sanitized.settings.unwrap().rules.len(), 2);
    }
}
