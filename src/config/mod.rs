//! Configuration management for `cdnshift.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section    # Configuration sections + sanitizers
//! ├── types/     # Utility types
//! │   ├── error  # ConfigError, ConfigDiagnostics
//! │   └── field  # FieldPath
//! ├── util       # Config file search
//! └── mod.rs     # Config (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `version`   | Config format version guard                    |
//! | `[site]`    | Base site URL for root-relative resolution     |
//! | `whitelist` | Hosts eligible for rewriting                   |
//! | `[[rules]]` | Ordered path-suffix rewrite rules              |
//! | `[rewrite]` | Element/attribute targets to inspect           |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

// Re-export from section/
pub use section::{RewriteSection, RuleEntry, SiteSection};

// Re-export from types/
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{Cli, Commands};
use crate::rewrite::{FORMAT_VERSION, RewriteSettings, RuleSet};
use crate::{debug, log};
use anyhow::{Result, bail};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing cdnshift.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Config format version tag (engine guard)
    pub version: String,

    /// Site settings (base URL)
    pub site: SiteSection,

    /// Hosts eligible for rewriting
    pub whitelist: Vec<String>,

    /// Ordered rewrite rules
    pub rules: Vec<RuleEntry>,

    /// Document walk settings
    pub rewrite: RewriteSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cli: None,
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            version: FORMAT_VERSION.to_string(),
            site: SiteSection::default(),
            whitelist: Vec::new(),
            rules: Vec::new(),
            rewrite: RewriteSection::default(),
        }
    }
}

/// Result of sanitizing a loaded configuration.
///
/// `settings` is `None` exactly when fatal errors were collected (missing or
/// unparseable base URL); dropped rule/whitelist entries only produce
/// warnings and still yield usable settings.
#[derive(Debug)]
pub struct SanitizedConfig {
    pub settings: Option<RewriteSettings>,
    pub diagnostics: ConfigDiagnostics,
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// For non-Init commands, searches upward from cwd to find config file.
    /// The project root is determined by the config file's parent directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let (config_path, exists) = Self::resolve_config_path(cli)?;

        // Validate config existence (skip for init)
        if !cli.is_init() && !exists {
            log!(
                "error";
                "Config file '{}' not found. Run 'cdnshift init' to create one.",
                cli.config.display()
            );
            std::process::exit(1);
        }

        // Load or create default config
        let mut config = if exists && !cli.is_init() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli);

        Ok(config)
    }

    /// Resolve config file path based on command.
    fn resolve_config_path(cli: &Cli) -> Result<(PathBuf, bool)> {
        let cwd = std::env::current_dir()?;

        match &cli.command {
            Commands::Init {
                name: Some(name), ..
            } => {
                let path = cwd.join(name).join(&cli.config);
                let exists = path.exists();
                Ok((path, exists))
            }
            Commands::Init { name: None, .. } => {
                let path = cwd.join(&cli.config);
                let exists = path.exists();
                Ok((path, exists))
            }
            _ => {
                // Search upward from cwd
                match find_config_file(&cli.config) {
                    Some(path) => Ok((path, true)),
                    None => Ok((cwd.join(&cli.config), false)),
                }
            }
        }
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        let root = match &cli.command {
            Commands::Init {
                name: Some(name), ..
            } => std::env::current_dir().unwrap_or_default().join(name),
            Commands::Init { name: None, .. } => std::env::current_dir().unwrap_or_default(),
            _ => self
                .config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        self.root = root;

        // CLI overrides
        if let Some(url) = cli.site_url.clone() {
            self.site.url = Some(url);
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
            if !Self::prompt_continue()? {
                bail!("Aborted due to unknown config fields");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub(crate) fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        // Show only the filename since the config sits at the project root
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        eprintln!();
        log!("warning"; "unknown fields in {}:", display_path);
        log!("warning"; "ignoring:");
        for field in fields {
            eprintln!("- {}", field);
        }
        eprintln!();
    }

    /// Prompt user to continue. Returns true only if user explicitly confirms.
    fn prompt_continue() -> Result<bool> {
        use std::io::{self, Write};

        eprint!("Continue? [y/N] ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        // Default no (empty input), explicit "y" or "yes" to continue
        Ok(input == "y" || input == "yes")
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // sanitization
    // ========================================================================

    /// Sanitize the raw configuration into engine settings.
    ///
    /// Invalid entries are dropped into diagnostics, never passed through to
    /// the engine. A version other than the supported one is reported as a
    /// warning here and enforced as pass-through by the engine itself.
    pub fn sanitize(&self) -> SanitizedConfig {
        let mut diag = ConfigDiagnostics::new();

        if self.version != FORMAT_VERSION {
            diag.warn(
                FieldPath::new("version"),
                format!(
                    "unsupported config format version `{}` (supported: `{FORMAT_VERSION}`), documents will pass through unchanged",
                    self.version
                ),
            );
        }

        let base = section::sanitize_base(&self.site, &mut diag);
        let rules = section::sanitize_rules(&self.rules, &mut diag);
        let whitelist = section::sanitize_whitelist(&self.whitelist, &mut diag);
        let targets = section::sanitize_targets(&self.rewrite.targets, &mut diag);

        let settings = base.map(|base| {
            let mut whitelist: FxHashSet<String> = whitelist.into_iter().collect();
            if whitelist.is_empty()
                && let Some(host) = base.host_str()
            {
                // Mirror of the usual setup: the site's own host is the one
                // being offloaded to a CDN
                debug!("config"; "empty whitelist, defaulting to base host `{host}`");
                whitelist.insert(host.to_string());
            }

            RewriteSettings {
                version: self.version.clone(),
                base,
                rules: RuleSet::new(rules),
                whitelist,
                targets,
            }
        });

        SanitizedConfig {
            settings,
            diagnostics: diag,
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config with the minimal required `[site]` section.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> Config {
    let config = format!("site = {{ url = \"https://blog.example.com\" }}\n{extra}");
    let (parsed, ignored) = Config::parse_with_ignored(&config).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
