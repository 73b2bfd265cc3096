//! Batch rewrite command.
//!
//! Runs one engine pass per input file. Passes share a single immutable
//! [`Rewriter`] and run in parallel, one document each; a failing file is
//! reported and never aborts the batch.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::{Config, ConfigError};
use crate::logger::ProgressLine;
use crate::rewrite::Rewriter;
use crate::utils::plural_count;
use crate::{debug, log};

use super::args::RewriteArgs;
use super::common::{RewriteJob, collect_html_files};

/// Per-file result of a batch run.
struct FileOutcome {
    input: PathBuf,
    rewritten: usize,
}

/// Rewrite the given paths (or stdin when none are given).
pub fn run(args: &RewriteArgs, config: &Config) -> Result<()> {
    let sanitized = config.sanitize();
    sanitized.diagnostics.print_warnings();
    let Some(settings) = sanitized.settings else {
        return Err(ConfigError::Diagnostics(sanitized.diagnostics).into());
    };
    let rewriter = Rewriter::new(settings);

    // Filter mode: stdin to stdout
    if args.paths.is_empty() {
        return rewrite_stdin(&rewriter);
    }

    let jobs = collect_html_files(&args.paths)?;
    if jobs.is_empty() {
        log!("rewrite"; "no html files found");
        return Ok(());
    }

    // Without a destination a single file goes to stdout; more than one
    // needs --in-place or --output
    if args.output.is_none() && !args.in_place {
        if let [job] = jobs.as_slice() {
            let content = fs::read_to_string(&job.input)
                .with_context(|| format!("failed to read {}", job.input.display()))?;
            print!("{}", rewriter.rewrite(&content));
            return Ok(());
        }
        anyhow::bail!(
            "{} given: pass --in-place or --output <dir>",
            plural_count(jobs.len(), "input file")
        );
    }

    let progress = ProgressLine::new(&[("html", jobs.len())]);
    let results: Vec<Result<FileOutcome>> = jobs
        .par_iter()
        .map(|job| {
            let outcome = rewrite_file(job, &rewriter, args);
            progress.inc("html");
            outcome
        })
        .collect();
    progress.finish();

    report(&results, jobs.len())
}

/// Rewrite one file to its destination.
fn rewrite_file(job: &RewriteJob, rewriter: &Rewriter, args: &RewriteArgs) -> Result<FileOutcome> {
    let content = fs::read_to_string(&job.input)
        .with_context(|| format!("failed to read {}", job.input.display()))?;

    let outcome = rewriter.rewrite_with_stats(&content);

    if let Some(dir) = &args.output {
        let dest = dir.join(&job.relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&dest, &outcome.html)
            .with_context(|| format!("failed to write {}", dest.display()))?;
    } else if outcome.rewritten > 0 {
        // In place: only files that actually changed are written
        fs::write(&job.input, &outcome.html)
            .with_context(|| format!("failed to write {}", job.input.display()))?;
    } else {
        debug!("rewrite"; "unchanged: {}", job.input.display());
    }

    Ok(FileOutcome {
        input: job.input.clone(),
        rewritten: outcome.rewritten,
    })
}

/// Filter mode: rewrite stdin to stdout.
fn rewrite_stdin(rewriter: &Rewriter) -> Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(rewriter.rewrite(&input).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Log the batch summary; fail if any file failed.
fn report(results: &[Result<FileOutcome>], total: usize) -> Result<()> {
    let mut urls = 0;
    let mut changed_files = 0;
    let mut failures = 0;

    for result in results {
        match result {
            Ok(outcome) => {
                if outcome.rewritten > 0 {
                    changed_files += 1;
                    urls += outcome.rewritten;
                    debug!("rewrite"; "{}: {}", outcome.input.display(), plural_count(outcome.rewritten, "url"));
                }
            }
            Err(e) => {
                failures += 1;
                log!("error"; "{e:#}");
            }
        }
    }

    log!(
        "rewrite";
        "rewrote {} in {} ({} scanned)",
        plural_count(urls, "url"),
        plural_count(changed_files, "file"),
        plural_count(total, "file")
    );

    if failures > 0 {
        anyhow::bail!("failed to rewrite {}", plural_count(failures, "file"));
    }
    Ok(())
}
