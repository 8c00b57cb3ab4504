use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::batch::ConflictPolicy;

pub const CONFIG_FILENAME: &str = "docx2org.toml";
pub const CONFIG_ENV: &str = "DOCX2ORG_CONFIG";

const SEARCH_LEVELS: usize = 8;

pub const DEFAULT_CONFIG_TOML: &str = r#"# docx2org configuration. Every key is optional; command-line flags win.

[output]
# What to do when the target .org file already exists:
# "overwrite", "suffix" (write <stem>_1.org, <stem>_2.org, ...) or "skip".
conflict = "suffix"
# Directory for converted files. Relative paths are resolved against this file.
# Default: next to each input document.
# output_dir = "org"
extension = "org"

[batch]
# Documents converted in parallel. Default: number of CPUs.
# workers = 4
recursive = true

[clean]
# Run the cleaner over every freshly written file.
enabled = false
remove_empty_paragraphs = false
remove_leading_dashes = false
"#;

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub batch: BatchSection,
    #[serde(default)]
    pub clean: CleanSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub conflict: Option<ConflictPolicy>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub extension: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BatchSection {
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub recursive: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CleanSection {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub remove_empty_paragraphs: Option<bool>,
    #[serde(default)]
    pub remove_leading_dashes: Option<bool>,
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

/// Config file to use when none was given on the command line:
/// `$DOCX2ORG_CONFIG`, then upwards from the current directory, then next to the executable.
pub fn find_default_config() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(p));
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, CONFIG_FILENAME, SEARCH_LEVELS) {
            return Some(p);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let mut cfg: AppConfig = toml::from_str(&text)
        .with_context(|| format!("parse config toml: {}", path.display()))?;

    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
    if let Some(dir) = cfg.output.output_dir.as_mut() {
        if dir.is_relative() {
            *dir = config_dir.join(&*dir);
        }
    }
    if let Some(ext) = cfg.output.extension.as_mut() {
        *ext = ext.trim().trim_start_matches('.').to_string();
        if ext.is_empty() {
            bail!("config {}: output.extension is empty", path.display());
        }
    }
    if cfg.batch.workers == Some(0) {
        bail!("config {}: batch.workers must be at least 1", path.display());
    }
    Ok(cfg)
}

/// Explicit path if given, else the discovered one; `None` means built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<(AppConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => find_default_config(),
    };
    match path {
        Some(p) => Ok((load_config(&p)?, Some(p))),
        None => Ok((AppConfig::default(), None)),
    }
}

/// Write the commented default config into `dir`.
pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    let path = dir.join(CONFIG_FILENAME);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    std::fs::create_dir_all(dir).with_context(|| format!("create dir: {}", dir.display()))?;
    std::fs::write(&path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", path.display()))?;
    Ok(path)
}
