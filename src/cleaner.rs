//! Post-processing of written `.org` files: drop empty paragraphs and leading
//! `- ` bullets, collapse trailing blank lines.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanOptions {
    pub remove_empty_paragraphs: bool,
    pub remove_leading_dashes: bool,
}

impl CleanOptions {
    pub fn is_noop(&self) -> bool {
        !self.remove_empty_paragraphs && !self.remove_leading_dashes
    }
}

/// Cleaned text and the number of changes made.
pub fn clean_org_content(content: &str, opts: &CleanOptions) -> (String, usize) {
    let mut changes = 0usize;
    let mut lines: Vec<&str> = Vec::new();

    for line in content.lines() {
        let mut line = line;
        if opts.remove_leading_dashes {
            if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("-\t")) {
                line = rest;
                changes += 1;
            }
        }
        if opts.remove_empty_paragraphs && line.trim().is_empty() {
            changes += 1;
            continue;
        }
        lines.push(line);
    }

    // At most one trailing blank line survives.
    while lines.len() > 1
        && lines[lines.len() - 1].trim().is_empty()
        && lines[lines.len() - 2].trim().is_empty()
    {
        lines.pop();
        changes += 1;
    }

    (lines.join("\n"), changes)
}

/// Line-by-line differences for a dry run.
pub fn preview_changes(original: &str, cleaned: &str) -> Vec<String> {
    let before: Vec<&str> = original.lines().collect();
    let after: Vec<&str> = cleaned.lines().collect();
    let mut out: Vec<String> = before
        .iter()
        .zip(&after)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, (a, b))| format!("line {}: {a:?} -> {b:?}", i + 1))
        .collect();
    if before.len() != after.len() {
        out.push(format!(
            "line count {} -> {}",
            before.len(),
            after.len()
        ));
    }
    out
}

/// Clean one file in place. The file is rewritten only when something changed,
/// and never when `dry_run` is set.
pub fn clean_file(path: &Path, opts: &CleanOptions, dry_run: bool) -> Result<usize> {
    let original =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (cleaned, changes) = clean_org_content(&original, opts);
    if changes == 0 {
        debug!(path = %path.display(), "no changes needed");
        return Ok(0);
    }
    if dry_run {
        for line in preview_changes(&original, &cleaned) {
            info!(path = %path.display(), "{line}");
        }
        return Ok(changes);
    }
    fs::write(path, cleaned).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), changes, "cleaned");
    Ok(changes)
}

/// `.org` files named directly, plus those found under directories.
pub fn find_org_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            crate::batch::scan_dir(path, "org", recursive, &mut found)?;
            found.sort();
            out.extend(found);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}
