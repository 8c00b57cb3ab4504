//! Converting many documents at once.
//!
//! Output paths are planned up front in input order, so conflict resolution is
//! deterministic; the conversions themselves then run on a rayon pool, each
//! with its own converter state.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cleaner::{clean_file, CleanOptions};
use crate::org::{convert_file, ConversionStats};
use crate::progress::ConsoleProgress;

pub const DOCX_EXTENSION: &str = "docx";
pub const DEFAULT_OUTPUT_EXTENSION: &str = "org";

/// Word keeps `~$name.docx` lock files next to open documents.
const LOCK_FILE_PREFIX: &str = "~$";

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    Overwrite,
    #[default]
    Suffix,
    Skip,
}

#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Explicit output file; only valid with a single input.
    pub output: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub extension: String,
    pub conflict: ConflictPolicy,
    pub workers: Option<usize>,
    pub recursive: bool,
    /// Cleaner run over each written file.
    pub clean: Option<CleanOptions>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output: None,
            output_dir: None,
            extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            conflict: ConflictPolicy::default(),
            workers: None,
            recursive: true,
            clean: None,
        }
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Converted {
        output: PathBuf,
        stats: ConversionStats,
    },
    Skipped {
        output: PathBuf,
    },
    Failed {
        error: anyhow::Error,
    },
}

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} skipped, {} failed",
            self.succeeded(),
            self.skipped(),
            self.failed()
        )
    }
}

enum Planned {
    Write(PathBuf),
    Skip(PathBuf),
}

/// Files with `extension` (case-insensitive) under `dir`, lock files excluded.
pub fn scan_dir(
    dir: &Path,
    extension: &str,
    recursive: bool,
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list {}", dir.display()))?
            .path();
        if path.is_dir() {
            if recursive {
                scan_dir(&path, extension, recursive, out)?;
            }
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.starts_with(LOCK_FILE_PREFIX) {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            out.push(path);
        }
    }
    Ok(())
}

/// Expand directories into their `.docx` files; files are taken as given.
pub fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            scan_dir(input, DOCX_EXTENSION, recursive, &mut found)?;
            if found.is_empty() {
                warn!("no .{DOCX_EXTENSION} files in {}", input.display());
            }
            found.sort();
            out.extend(found);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

/// `<dir>/<stem>.<extension>`, with `dir` defaulting to the input's directory.
pub fn default_output_path(input: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    let mut name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_os_string();
    name.push(".");
    name.push(extension);
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(name)
}

/// First `<stem>_<n>.<ext>` that neither exists nor is already claimed.
fn suffixed_path(target: &Path, claimed: &HashSet<PathBuf>) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = target
        .extension()
        .map(|s| s.to_string_lossy().into_owned());
    let dir = target.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut n = 1usize;
    loop {
        let name = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() && !claimed.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn plan_output(
    target: PathBuf,
    policy: ConflictPolicy,
    claimed: &mut HashSet<PathBuf>,
) -> Planned {
    // Overwrite only replaces files from before the run; two inputs of the
    // same batch never share an output.
    let planned = if claimed.contains(&target) {
        match policy {
            ConflictPolicy::Skip => return Planned::Skip(target),
            ConflictPolicy::Overwrite | ConflictPolicy::Suffix => {
                Planned::Write(suffixed_path(&target, claimed))
            }
        }
    } else {
        match (target.exists(), policy) {
            (false, _) | (true, ConflictPolicy::Overwrite) => Planned::Write(target),
            (true, ConflictPolicy::Skip) => return Planned::Skip(target),
            (true, ConflictPolicy::Suffix) => Planned::Write(suffixed_path(&target, claimed)),
        }
    };
    if let Planned::Write(path) = &planned {
        claimed.insert(path.clone());
    }
    planned
}

fn convert_one(
    input: &Path,
    output: &Path,
    clean: Option<&CleanOptions>,
) -> Result<ConversionStats> {
    let stats = convert_file(input, output)?;
    if let Some(opts) = clean.filter(|o| !o.is_noop()) {
        clean_file(output, opts, false)?;
    }
    Ok(stats)
}

/// Convert every input. Per-file failures are recorded in the report; only
/// problems with the inputs themselves (unreadable directories, bad options)
/// are returned as `Err`.
pub fn run_batch(
    inputs: &[PathBuf],
    opts: &BatchOptions,
    progress: &ConsoleProgress,
) -> Result<BatchReport> {
    let files = collect_inputs(inputs, opts.recursive)?;
    if opts.output.is_some() && files.len() != 1 {
        bail!(
            "--output needs exactly one input document, got {}",
            files.len()
        );
    }

    let mut claimed = HashSet::new();
    let planned: Vec<(PathBuf, Planned)> = files
        .into_iter()
        .map(|input| {
            let target = opts.output.clone().unwrap_or_else(|| {
                default_output_path(&input, opts.output_dir.as_deref(), &opts.extension)
            });
            let plan = plan_output(target, opts.conflict, &mut claimed);
            (input, plan)
        })
        .collect();

    let total = planned.len();
    progress.info(format!("converting {total} document(s)"));

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = opts.workers.filter(|n| *n > 0) {
        pool = pool.num_threads(n);
    }
    let pool = pool.build().context("failed to start worker pool")?;

    let files = pool.install(|| {
        planned
            .into_par_iter()
            .map(|(input, plan)| {
                let outcome = match plan {
                    Planned::Skip(output) => {
                        info!(output = %output.display(), "exists, skipping");
                        FileOutcome::Skipped { output }
                    }
                    Planned::Write(output) => {
                        match convert_one(&input, &output, opts.clean.as_ref()) {
                            Ok(stats) => FileOutcome::Converted { output, stats },
                            Err(error) => {
                                warn!(input = %input.display(), "conversion failed: {error:#}");
                                FileOutcome::Failed { error }
                            }
                        }
                    }
                };
                progress.tick("documents", total);
                FileReport { input, outcome }
            })
            .collect::<Vec<_>>()
    });

    Ok(BatchReport { files })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};

    use super::{collect_inputs, default_output_path, plan_output, ConflictPolicy, Planned};

    fn written(plan: Planned) -> PathBuf {
        match plan {
            Planned::Write(p) => p,
            Planned::Skip(p) => panic!("unexpected skip of {}", p.display()),
        }
    }

    #[test]
    fn output_path_uses_stem_and_extension() {
        assert_eq!(
            default_output_path(Path::new("docs/Report.v2.docx"), None, "org"),
            PathBuf::from("docs/Report.v2.org")
        );
        assert_eq!(
            default_output_path(Path::new("docs/a.docx"), Some(Path::new("out")), "txt"),
            PathBuf::from("out/a.txt")
        );
    }

    #[test]
    fn conflict_policies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("a.org");
        std::fs::write(&target, "old").expect("write");
        std::fs::write(dir.path().join("a_1.org"), "old").expect("write");

        let mut claimed = HashSet::new();
        assert_eq!(
            written(plan_output(target.clone(), ConflictPolicy::Overwrite, &mut claimed)),
            target
        );
        let mut claimed = HashSet::new();
        assert!(matches!(
            plan_output(target.clone(), ConflictPolicy::Skip, &mut claimed),
            Planned::Skip(_)
        ));
        let mut claimed = HashSet::new();
        assert_eq!(
            written(plan_output(target.clone(), ConflictPolicy::Suffix, &mut claimed)),
            dir.path().join("a_2.org")
        );
        // Two inputs aiming at the same new file within one batch.
        assert_eq!(
            written(plan_output(target, ConflictPolicy::Suffix, &mut claimed)),
            dir.path().join("a_3.org")
        );
    }

    #[test]
    fn overwrite_never_shares_an_output_within_a_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("x.org");
        std::fs::write(&target, "old").expect("write");

        let mut claimed = HashSet::new();
        assert_eq!(
            written(plan_output(target.clone(), ConflictPolicy::Overwrite, &mut claimed)),
            target
        );
        assert_eq!(
            written(plan_output(target.clone(), ConflictPolicy::Overwrite, &mut claimed)),
            dir.path().join("x_1.org")
        );
        assert!(matches!(
            plan_output(target, ConflictPolicy::Skip, &mut claimed),
            Planned::Skip(_)
        ));
    }

    #[test]
    fn directories_expand_to_sorted_docx_without_lock_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).expect("mkdir");
        for name in ["b.docx", "a.DOCX", "~$b.docx", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").expect("write");
        }
        std::fs::write(nested.join("c.docx"), "").expect("write");

        let found = collect_inputs(&[dir.path().to_path_buf()], true).expect("collect");
        assert_eq!(
            found,
            vec![
                dir.path().join("a.DOCX"),
                dir.path().join("b.docx"),
                nested.join("c.docx"),
            ]
        );
        let shallow = collect_inputs(&[dir.path().to_path_buf()], false).expect("collect");
        assert_eq!(shallow.len(), 2);
    }
}
