//! cyaction: Actionable command counter CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use cyaction::commands::parse_command_list;
use cyaction::config::{build_glob_set, is_ignored, load_config, Config, CONFIG_FILENAME};
use cyaction::reporter::{ConsoleReporter, JsonReporter};
use cyaction::{AnalysisEngine, CommandSets};
use globset::GlobSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// cyaction: count actionable commands in Cypress test files
#[derive(Parser, Debug)]
#[command(name = "cyaction")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Test files or directories to analyze (default: current directory)
    paths: Vec<PathBuf>,

    /// Glob pattern selecting test files inside directories (repeatable)
    #[arg(long, short)]
    pattern: Vec<String>,

    /// Comma-separated list of actionable commands
    #[arg(long, short, value_name = "COMMANDS")]
    actionable: Option<String>,

    /// Comma-separated list of excluded commands
    #[arg(long, short, value_name = "COMMANDS")]
    excluded: Option<String>,

    /// Print the report as JSON
    #[arg(long, short)]
    json: bool,

    /// Emit the simplified per-test report instead of the full one
    #[arg(long)]
    simplified: bool,

    /// Write the JSON report to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Path to config file (default: search .cyactionrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analyze files in parallel
    #[arg(long)]
    parallel: bool,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Exit 1 if any file could not be analyzed
    #[arg(long)]
    strict: bool,

    /// Quiet mode (one line per file)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output (per-test details and info logs)
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .cyactionrc.json with the default command lists
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "cyaction=info" } else { "cyaction=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(Commands::Init { dir }) = args.command {
        return run_init(dir.as_deref());
    }

    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };

    // Resolve work directory for config search
    let first = &paths[0];
    let work_dir = if first.is_file() {
        first.parent().unwrap_or(Path::new("."))
    } else {
        first.as_path()
    };

    // Load config (CLI flags override config file)
    let loaded = load_config(work_dir, args.config.as_deref())?;
    let config = loaded.config.merge_with_cli(
        args.actionable.as_deref().map(parse_command_list),
        args.excluded.as_deref().map(parse_command_list),
        &args.pattern,
    );

    let commands = config.command_sets();
    let overlap = commands.overlap();
    if !overlap.is_empty() {
        warn!(commands = ?overlap, "commands are both actionable and excluded; they will be counted");
    }

    let test_files = collect_all(&paths, &config, loaded.base_dir.as_deref())?;
    if test_files.is_empty() {
        eprintln!("{}: No test files found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }

    if args.verbose && !args.json {
        eprintln!(
            "{}: Found {} test files",
            "Info".blue(),
            test_files.len()
        );
        eprintln!(
            "{}: Actionable commands: {}",
            "Info".blue(),
            commands.actionable().join(",")
        );
    }

    // Set up parallel processing
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let engine = AnalysisEngine::new()
        .with_commands(commands)
        .parallel(args.parallel || args.jobs.is_some());
    let report = engine.analyze_files(&test_files);

    let mut json_reporter = JsonReporter::new().pretty();
    if args.simplified {
        json_reporter = json_reporter.simplified();
    }

    if let Some(ref output) = args.output {
        json_reporter.write_to(&report, output)?;
        if !args.quiet && !args.json {
            eprintln!("{}: Results written to {}", "Done".green().bold(), output.display());
        }
    }

    if args.json || args.simplified {
        println!("{}", json_reporter.render(&report)?);
    } else if args.quiet {
        ConsoleReporter::new().report_quiet(&report);
    } else {
        let mut reporter = ConsoleReporter::new();
        if args.verbose {
            reporter = reporter.verbose();
        }
        reporter.report(&report);
    }

    if args.strict && report.errored_files() > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_init(dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let defaults = CommandSets::default();
    let config = Config {
        actionable_commands: Some(defaults.actionable().to_vec()),
        excluded_commands: Some(defaults.excluded().to_vec()),
        test_patterns: Config::default()
            .get_test_patterns()
            .into_iter()
            .map(String::from)
            .collect(),
        ignore: vec!["**/node_modules/**".to_string()],
        ..Config::default()
    };
    let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;

    std::fs::write(&config_path, json + "\n")
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {}",
        "Done".green().bold(),
        config_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Expand every CLI path into test files, keeping explicit files as given
fn collect_all(paths: &[PathBuf], config: &Config, base_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let patterns = build_glob_set(&config.get_test_patterns())?;
    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_glob_set(&config.ignore)?)
    };

    let mut files = Vec::new();
    for path in paths {
        // Explicit files are analyzed even if missing; the report records the error
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let search_root = match (&config.test_root, base_dir) {
            (Some(root), Some(base)) if path == Path::new(".") => base.join(root),
            _ => path.clone(),
        };
        files.extend(collect_test_files(&search_root, &patterns, ignore_set.as_ref())?);
    }
    Ok(files)
}

fn collect_test_files(
    root: &Path,
    patterns: &GlobSet,
    ignore_set: Option<&GlobSet>,
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() || !is_test_file(root, file_path, patterns) {
            continue;
        }
        if let Some(set) = ignore_set {
            if is_ignored(file_path, set) {
                continue;
            }
        }
        files.push(file_path.to_path_buf());
    }

    // Sort for consistent output
    files.sort();
    Ok(files)
}

fn is_test_file(root: &Path, path: &Path, patterns: &GlobSet) -> bool {
    // Skip node_modules
    if path.components().any(|c| c.as_os_str() == "node_modules") {
        return false;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    patterns.is_match(relative)
}
