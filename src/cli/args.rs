//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// cdnshift CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: cdnshift.toml)
    #[arg(short = 'C', long, default_value = "cdnshift.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Override the base site URL from the config.
    ///
    /// Useful for CI/CD pipelines where the production URL differs from the
    /// one committed in cdnshift.toml.
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a starter configuration file
    #[command(visible_alias = "i")]
    Init {
        /// Directory to initialize (relative to current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        name: Option<PathBuf>,

        /// Print the config template to stdout instead of writing it
        #[arg(short, long)]
        dry: bool,
    },

    /// Rewrite URLs in HTML files (or stdin to stdout)
    #[command(visible_alias = "r")]
    Rewrite {
        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Check the configuration and report diagnostics
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: CheckArgs,
    },
}

/// Rewrite command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RewriteArgs {
    /// Files or directories to rewrite. If omitted, reads stdin and writes
    /// stdout. Use `-` to read paths from stdin, one per line.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Write rewritten files under this directory (mirrors input layout)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Rewrite files in place (only files that actually change are written)
    #[arg(short, long)]
    pub in_place: bool,
}

/// Check command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Emit diagnostics as JSON for an external configuration surface
    #[arg(short, long)]
    pub json: bool,
}

#[allow(unused)]
impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
    pub const fn is_rewrite(&self) -> bool {
        matches!(self.command, Commands::Rewrite { .. })
    }
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check { .. })
    }
}
