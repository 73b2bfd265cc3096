//! Common utilities shared across CLI commands.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::Result;
use jwalk::WalkDir;

/// One file scheduled for rewriting.
#[derive(Debug, Clone)]
pub struct RewriteJob {
    /// Source file.
    pub input: PathBuf,
    /// Path relative to the argument that produced it; used to mirror the
    /// input layout under `--output`.
    pub relative: PathBuf,
}

/// Collect HTML files from CLI path arguments.
///
/// Files must be HTML; directories are walked recursively. `-` as the only
/// argument reads paths from stdin, one per line.
pub fn collect_html_files(paths: &[PathBuf]) -> Result<Vec<RewriteJob>> {
    // Handle stdin case: read paths from stdin when `-` is passed
    let paths: Vec<PathBuf> = if paths.len() == 1 && paths[0].as_os_str() == "-" {
        read_paths_from_stdin()?
    } else {
        paths.to_vec()
    };

    let mut jobs = Vec::new();
    for path in &paths {
        if path.is_file() {
            if !is_html_file(path) {
                anyhow::bail!("Not an HTML file: {}", path.display());
            }
            let relative = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.clone());
            jobs.push(RewriteJob {
                input: path.clone(),
                relative,
            });
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort(true) {
                let entry = entry?;
                let input = entry.path();
                if input.is_file() && is_html_file(&input) {
                    let relative = input.strip_prefix(path).unwrap_or(&input).to_path_buf();
                    jobs.push(RewriteJob { input, relative });
                }
            }
        } else {
            anyhow::bail!("Path not found: {}", path.display());
        }
    }

    Ok(jobs)
}

/// Check for a `.html`/`.htm` extension.
pub fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Read file paths from stdin, one per line
pub fn read_paths_from_stdin() -> Result<Vec<PathBuf>> {
    let stdin = io::stdin();
    let mut paths = Vec::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_html_file() {
        assert!(is_html_file(Path::new("index.html")));
        assert!(is_html_file(Path::new("page.HTM")));
        assert!(!is_html_file(Path::new("style.css")));
        assert!(!is_html_file(Path::new("README")));
    }

    #[test]
    fn test_collect_from_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("a.html"), "<p>a</p>").unwrap();
        fs::write(temp.path().join("sub/b.htm"), "<p>b</p>").unwrap();
        fs::write(temp.path().join("style.css"), "body{}").unwrap();

        let jobs = collect_html_files(&[temp.path().to_path_buf()]).unwrap();
        let mut relatives: Vec<_> = jobs.iter().map(|j| j.relative.clone()).collect();
        relatives.sort();
        assert_eq!(relatives, vec![PathBuf::from("a.html"), PathBuf::from("sub/b.htm")]);
    }

    #[test]
    fn test_collect_rejects_non_html_file() {
        let temp = TempDir::new().unwrap();
        let css = temp.path().join("style.css");
        fs::write(&css, "body{}").unwrap();
        assert!(collect_html_files(&[css]).is_err());
    }

    #[test]
    fn test_collect_missing_path() {
        assert!(collect_html_files(&[PathBuf::from("/no/such/path")]).is_err());
    }
}
