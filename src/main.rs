use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docx2org::batch::{
    run_batch, BatchOptions, ConflictPolicy, FileOutcome, DEFAULT_OUTPUT_EXTENSION,
};
use docx2org::cleaner::{clean_file, find_org_files, CleanOptions};
use docx2org::config::{init_default_config, resolve_config, AppConfig, CONFIG_ENV};
use docx2org::inspect::inspect_document;
use docx2org::progress::ConsoleProgress;
use docx2org::WordDocument;

#[derive(Parser, Debug)]
#[command(name = "docx2org")]
#[command(about = "Convert Word (.docx) documents to Org-mode with lists, headings and footnotes", long_about = None)]
struct Cli {
    /// Write a commented default docx2org.toml into DIR (default: current directory), then exit
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    init_config: Option<PathBuf>,

    /// Overwrite an existing config file when used with --init-config
    #[arg(long)]
    force: bool,

    /// Config file path (default: $DOCX2ORG_CONFIG, else search for docx2org.toml upwards)
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// No progress lines, errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert documents (files or directories) to .org files
    Convert(ConvertArgs),
    /// Remove empty paragraphs and/or leading dashes from .org files in place
    Clean(CleanArgs),
    /// Show the note table and the references found in each paragraph
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input .docx files or directories
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (single input only)
    #[arg(short, long, value_name = "ORG")]
    output: Option<PathBuf>,

    /// Directory for converted files (default: next to each input)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// What to do when the output file exists
    #[arg(long, value_enum)]
    conflict: Option<ConflictPolicy>,

    /// Documents converted in parallel (default: number of CPUs)
    #[arg(short = 'j', long, value_name = "N")]
    jobs: Option<usize>,

    /// Only look at the top level of input directories
    #[arg(long)]
    no_recursive: bool,

    /// Run the cleaner: drop empty paragraphs from written files
    #[arg(long)]
    clean_empty: bool,

    /// Run the cleaner: strip leading "- " from written files
    #[arg(long)]
    clean_dashes: bool,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// .org files or directories
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Remove whitespace-only lines
    #[arg(long)]
    empty: bool,

    /// Remove "- " / "-<TAB>" at the start of lines
    #[arg(long)]
    dashes: bool,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,

    /// Only look at the top level of directories
    #[arg(long)]
    no_recursive: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Input .docx
    #[arg(value_name = "DOCX")]
    input: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn convert_options(args: &ConvertArgs, cfg: &AppConfig) -> anyhow::Result<BatchOptions> {
    let extension = cfg
        .output
        .extension
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_EXTENSION.to_string());
    let recursive = !args.no_recursive && cfg.batch.recursive.unwrap_or(true);

    let clean_enabled = cfg.clean.enabled.unwrap_or(false);
    let clean = CleanOptions {
        remove_empty_paragraphs: args.clean_empty
            || (clean_enabled && cfg.clean.remove_empty_paragraphs.unwrap_or(false)),
        remove_leading_dashes: args.clean_dashes
            || (clean_enabled && cfg.clean.remove_leading_dashes.unwrap_or(false)),
    };

    if args.jobs == Some(0) {
        bail!("--jobs must be at least 1");
    }
    Ok(BatchOptions {
        output: args.output.clone(),
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| cfg.output.output_dir.clone()),
        extension,
        conflict: args
            .conflict
            .or(cfg.output.conflict)
            .unwrap_or_default(),
        workers: args.jobs.or(cfg.batch.workers),
        recursive,
        clean: (!clean.is_noop()).then_some(clean),
    })
}

fn run_convert(
    args: &ConvertArgs,
    cfg: &AppConfig,
    progress: &ConsoleProgress,
) -> anyhow::Result<()> {
    let opts = convert_options(args, cfg)?;
    let report = run_batch(&args.inputs, &opts, progress)?;

    for file in &report.files {
        match &file.outcome {
            FileOutcome::Converted { output, stats } => progress.info(format!(
                "{} -> {} ({} lines, {} notes)",
                file.input.display(),
                output.display(),
                stats.emitted_lines,
                stats.footnotes
            )),
            FileOutcome::Skipped { output } => progress.info(format!(
                "skipped {} ({} exists)",
                file.input.display(),
                output.display()
            )),
            FileOutcome::Failed { error } => {
                eprintln!("failed: {}: {error:#}", file.input.display());
            }
        }
    }
    println!("{}", report.summary());
    if report.failed() > 0 {
        bail!("{} document(s) failed", report.failed());
    }
    Ok(())
}

fn run_clean(
    args: &CleanArgs,
    cfg: &AppConfig,
    progress: &ConsoleProgress,
) -> anyhow::Result<()> {
    let mut opts = CleanOptions {
        remove_empty_paragraphs: args.empty,
        remove_leading_dashes: args.dashes,
    };
    if opts.is_noop() {
        opts = CleanOptions {
            remove_empty_paragraphs: cfg.clean.remove_empty_paragraphs.unwrap_or(false),
            remove_leading_dashes: cfg.clean.remove_leading_dashes.unwrap_or(false),
        };
    }
    if opts.is_noop() {
        bail!("nothing to clean: pass --empty and/or --dashes");
    }

    let files = find_org_files(&args.paths, !args.no_recursive)?;
    let total = files.len();
    let mut changed = 0usize;
    let mut failed = 0usize;
    for (i, path) in files.iter().enumerate() {
        match clean_file(path, &opts, args.dry_run) {
            Ok(0) => {}
            Ok(n) => {
                changed += 1;
                progress.info(format!("{}: {n} change(s)", path.display()));
            }
            Err(err) => {
                failed += 1;
                eprintln!("failed: {err:#}");
            }
        }
        progress.progress("files", i + 1, total);
    }
    let verb = if args.dry_run { "would change" } else { "changed" };
    println!("{total} file(s) checked, {changed} {verb}, {failed} failed");
    if failed > 0 {
        bail!("{failed} file(s) failed");
    }
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let doc = WordDocument::open(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let report = inspect_document(&doc);
    if args.json {
        println!("{}", report.to_json().context("serialize report")?);
    } else {
        println!("{}", report.render_text());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let progress = ConsoleProgress::new(!cli.quiet);

    if let Some(dir) = cli.init_config.as_deref() {
        let path = init_default_config(dir, cli.force).context("init default config")?;
        eprintln!("Wrote config: {}", path.display());
        return Ok(());
    }

    let Some(command) = cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help().context("print help")?;
        eprintln!("\n\nDefault config search: docx2org.toml (upwards), or set {CONFIG_ENV}.");
        return Ok(());
    };

    let (cfg, cfg_path) = resolve_config(cli.config.as_deref())?;
    if let Some(p) = cfg_path.as_deref().map(Path::display) {
        info!("using config {p}");
    }

    match command {
        Command::Convert(args) => run_convert(&args, &cfg, &progress),
        Command::Clean(args) => run_clean(&args, &cfg, &progress),
        Command::Inspect(args) => run_inspect(&args),
    }
}
