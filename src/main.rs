//! CodeRefine CLI - compare, strip and review source files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use coderefine::config::{discover_config, load_config};
use coderefine::output::{format_comparison, format_reviews, OutputFormat, ReviewSummary};
use coderefine::{read_source, strip_comments, Comparator, Config, Language};

/// Compare original and optimized code, strip comments, or review snippets
#[derive(Parser, Debug)]
#[command(name = "coderefine")]
#[command(version)]
#[command(about = "Diff and explain optimized code rewrites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the nearest .coderefine.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Diff two files and explain why the second is better
    Compare(CompareArgs),
    /// Print a file with comments and blank lines removed
    Strip(StripArgs),
    /// Review files or directories with the static rule set
    Review(ReviewArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// The original code
    original: PathBuf,

    /// The optimized rewrite
    optimized: PathBuf,

    /// Source language (defaults to the file extension)
    #[arg(short, long)]
    language: Option<Language>,

    /// Strip comments and blank lines before comparing
    #[arg(long)]
    strip_comments: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormatArg,
}

#[derive(Args, Debug)]
struct StripArgs {
    /// File to strip
    file: PathBuf,

    /// Source language (defaults to the file extension)
    #[arg(short, long)]
    language: Option<Language>,
}

#[derive(Args, Debug)]
struct ReviewArgs {
    /// Files or directories to review
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Source language (defaults to each file's extension)
    #[arg(short, long)]
    language: Option<Language>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    format: OutputFormatArg,

    /// Rules to disable (comma-separated rule IDs)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Hide fix suggestions
    #[arg(long)]
    no_fixes: bool,

    /// Exit with error code on warnings
    #[arg(long)]
    error_on_warnings: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Human-readable colored output
    Pretty,
    /// JSON output for tooling integration
    Json,
    /// Compact one-line-per-entry
    Compact,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Pretty => OutputFormat::Pretty,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Compact => OutputFormat::Compact,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let anchor = match &cli.command {
        Commands::Compare(args) => args.original.clone(),
        Commands::Strip(args) => args.file.clone(),
        Commands::Review(args) => args.paths[0].clone(),
    };
    let config = resolve_config(cli.config.as_deref(), &anchor)?;

    match cli.command {
        Commands::Compare(args) => compare(args, &config),
        Commands::Strip(args) => strip(args, &config),
        Commands::Review(args) => review(args, config),
    }
}

fn resolve_config(explicit: Option<&Path>, anchor: &Path) -> Result<Config> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => discover_config(anchor)
            .with_context(|| format!("loading config for {}", anchor.display()))?,
    };
    if let Some(source) = &config.source {
        info!(config = %source.display(), "loaded config");
    }
    if !config.lints.is_empty() {
        info!(
            rules = config.lints.rules.len(),
            categories = config.lints.categories.len(),
            "lint overrides active"
        );
    }
    Ok(config)
}

fn compare(args: CompareArgs, config: &Config) -> Result<ExitCode> {
    let mut config = config.clone();
    config.compare.strip_comments |= args.strip_comments;
    let comparator = Comparator::from_config(&config);

    let comparison = comparator
        .compare_files(&args.original, &args.optimized, args.language)
        .context("comparing files")?;

    print!("{}", format_comparison(&comparison, args.format.into()));
    if matches!(args.format, OutputFormatArg::Json) {
        println!();
    }
    Ok(ExitCode::SUCCESS)
}

fn strip(args: StripArgs, config: &Config) -> Result<ExitCode> {
    let code = read_source(&args.file)?;
    let language = args
        .language
        .or_else(|| Language::from_path(&args.file))
        .or(config.compare.language);
    if language.is_none() {
        warn!(file = %args.file.display(), "unknown language, only blank lines are removed");
    }
    println!("{}", strip_comments(&code, language));
    Ok(ExitCode::SUCCESS)
}

fn review(args: ReviewArgs, mut config: Config) -> Result<ExitCode> {
    if let Some(disabled) = args.disable {
        config.review.disabled.extend(disabled);
    }
    let comparator = Comparator::from_config(&config);

    let files = collect_files(&args.paths);
    if files.is_empty() {
        eprintln!("{}", "No source files found to review.".yellow());
        return Ok(ExitCode::SUCCESS);
    }
    info!(files = files.len(), "reviewing");

    let results: Vec<_> = files
        .par_iter()
        .filter_map(|file| match comparator.review_file(file, args.language) {
            Ok(report) => Some((file.clone(), report)),
            Err(e) => {
                eprintln!("{}: {} - {}", "Error".red().bold(), file.display(), e);
                None
            }
        })
        .collect();

    let format: OutputFormat = args.format.into();
    let mut summary = ReviewSummary::default();

    for (_, report) in &results {
        summary.add(&report.findings);
    }

    print!("{}", format_reviews(&results, format, !args.no_fixes));
    if matches!(format, OutputFormat::Json) {
        println!();
    }

    if matches!(format, OutputFormat::Pretty) {
        println!();
        if summary.total() > 0 {
            println!("{}", summary.format_pretty());
        } else {
            println!("{}", "✓ No findings!".green().bold());
        }
    }

    let failed = summary.errors > 0 || (args.error_on_warnings && summary.warnings > 0);
    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Expand directories into the files with a recognised extension.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .flat_map(|path| {
            if path.is_dir() {
                WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| Language::from_path(e.path()).is_some())
                    .map(|e| e.path().to_path_buf())
                    .collect::<Vec<_>>()
            } else {
                vec![path.clone()]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compare_flags() {
        let cli = Cli::parse_from([
            "coderefine",
            "compare",
            "old.js",
            "new.js",
            "--language",
            "typescript",
            "--strip-comments",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.language, Some(Language::TypeScript));
                assert!(args.strip_comments);
                assert!(matches!(args.format, OutputFormatArg::Json));
            }
            other => panic!("expected compare, got {other:?}"),
        }
    }

    #[test]
    fn parses_review_disable_list() {
        let cli = Cli::parse_from(["coderefine", "review", "src", "--disable", "long_line,deep_nesting"]);
        match cli.command {
            Commands::Review(args) => {
                assert_eq!(
                    args.disable,
                    Some(vec!["long_line".to_string(), "deep_nesting".to_string()])
                );
            }
            other => panic!("expected review, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_language() {
        let result = Cli::try_parse_from(["coderefine", "strip", "a.txt", "--language", "cobol"]);
        assert!(result.is_err());
    }

    #[test]
    fn collect_files_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "# notes\n").unwrap();
        let files = collect_files(&[dir.path().to_path_buf()]);
        assert_eq!(files, vec![dir.path().join("a.py")]);
    }
}
