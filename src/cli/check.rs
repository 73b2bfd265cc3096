//! Configuration check command.
//!
//! Runs the sanitizers and surfaces the structured diagnostics, either in
//! human-readable form or as JSON for an external configuration surface.

use anyhow::Result;

use crate::config::{Config, ConfigError, SanitizedConfig};
use crate::log;
use crate::utils::plural_count;

use super::args::CheckArgs;

pub fn run(args: &CheckArgs, config: &Config) -> Result<()> {
    let SanitizedConfig {
        settings,
        diagnostics,
    } = config.sanitize();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        if diagnostics.has_errors() {
            std::process::exit(1);
        }
        return Ok(());
    }

    diagnostics.print_warnings();

    let Some(settings) = settings else {
        return Err(ConfigError::Diagnostics(diagnostics).into());
    };

    log!(
        "check";
        "configuration ok: {}, {}, base {}",
        plural_count(settings.rules.len(), "rule"),
        plural_count(settings.whitelist.len(), "whitelisted host"),
        settings.base
    );
    Ok(())
}
