//! prgscan CLI - unused function/procedure detector for .prg codebases.
//!
//! Features:
//! - Recursive, case-insensitive `.prg` discovery
//! - Rayon-powered parallel declaration and usage phases
//! - Per-phase progress bars
//! - Text log grouped by directory and file, optional JSON on stdout

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use prgscan_core::{
    init_structured_logging, load_config, print_json, print_plain, write_log, PrgScan,
    PrgscanConfig, ProgressSink, ScanPhase,
};

/// Report file used when neither flag, env nor config names one.
const DEFAULT_OUTPUT: &str = "unused.log";

/// Exit code after an internal panic.
const PANIC_EXIT_CODE: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Unused function/procedure detector for .prg codebases")]
pub struct Cli {
    /// Directory (or drive) to scan
    #[arg(long, env = "PRGSCANNER_DIR", default_value = ".")]
    dir: String,

    /// Output log file [default: unused.log]
    #[arg(long, env = "PRGSCANNER_OUT")]
    out: Option<String>,

    /// Also print results as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Directory names to skip while scanning
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Number of worker threads [default: number of CPUs]
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    threads: Option<u16>,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Exit with code 1 when unused functions/procedures are found
    #[arg(long)]
    fail_on_unused: bool,
}

/// Effective settings after merging CLI/env with prgscan.toml.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    root: PathBuf,
    output: PathBuf,
    json: bool,
    excludes: Vec<String>,
    threads: Option<usize>,
    progress: bool,
    fail_on_unused: bool,
}

/// CLI flags and env vars win over the config file, which wins over defaults.
fn resolve_settings(cli: &Cli, config: &PrgscanConfig) -> Settings {
    let output = cli
        .out
        .clone()
        .or_else(|| config.output_path().map(String::from))
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let mut excludes: Vec<String> = config.excludes().to_vec();
    for e in &cli.exclude {
        if !excludes.contains(e) {
            excludes.push(e.clone());
        }
    }

    Settings {
        root: PathBuf::from(&cli.dir),
        output: PathBuf::from(output),
        json: cli.json || config.wants_json(),
        excludes,
        threads: cli.threads.map(usize::from).or(config.threads),
        progress: !cli.no_progress,
        fail_on_unused: cli.fail_on_unused,
    }
}

/// Progress bars driven by the scan phases.
struct PhaseBars {
    bar: ProgressBar,
}

impl PhaseBars {
    fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden())
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl ProgressSink for PhaseBars {
    fn begin_phase(&self, phase: ScanPhase, total: usize) {
        let step = match phase {
            ScanPhase::Extracting => "Step 2: Identifying function/procedure declarations...",
            ScanPhase::CountingUsage => "Step 3: Checking function/procedure usage...",
            _ => "",
        };
        if !step.is_empty() {
            self.bar.println(step);
        }
        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_message(phase.to_string());
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn finish_phase(&self, phase: ScanPhase) {
        self.bar.finish_with_message(format!("{} complete", phase));
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let root = Path::new(&cli.dir);
    let config = load_config(root)
        .with_context(|| format!("Failed to load configuration from: {}", cli.dir))?
        .unwrap_or_default();
    let settings = resolve_settings(cli, &config);

    let workers = settings.threads.unwrap_or_else(rayon::current_num_threads);
    println!(
        "Step 1: Searching for .prg files in {} ({} workers)...",
        settings.root.display(),
        workers
    );

    let bars = PhaseBars::new(settings.progress);
    let outcome = PrgScan::new(&settings.root)
        .exclude_dirs(settings.excludes.iter().cloned())
        .threads(settings.threads)
        .analyze_with_progress(&bars)
        .with_context(|| format!("Failed to scan: {}", settings.root.display()))?;

    println!("Step 4: Writing report...");
    write_log(&settings.output, &outcome)
        .with_context(|| format!("Failed to write report: {}", settings.output.display()))?;

    if settings.json {
        print_json(&outcome);
    } else {
        print_plain(&outcome);
    }
    println!("Done. Report written to: {}", settings.output.display());

    // CI-friendly exit code
    Ok(if settings.fail_on_unused && outcome.has_unused() { 1 } else { 0 })
}

/// Write the panic report to `out` and return the exit code to use.
fn report_panic(info: &dyn std::fmt::Display, out: &mut dyn std::io::Write) -> i32 {
    let _ = writeln!(out, "[PANIC] prgscan internal error: {}", info);
    let _ = writeln!(out, "[PANIC] The process will exit with code {}.", PANIC_EXIT_CODE);
    PANIC_EXIT_CODE
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let code = report_panic(info, &mut std::io::stderr());
        std::process::exit(code);
    }));

    // JSON logs to stderr, filtered by RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();
    let code = run(&cli)?;
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use prgscan_core::OutputConfig;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("prgscan_cli_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("prgscan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = parse(&[
            "--dir", "src", "--out", "report.log", "--json", "--exclude", "a", "b",
            "--threads", "3", "--no-progress", "--fail-on-unused",
        ]);
        assert_eq!(cli.dir, "src");
        assert_eq!(cli.out.as_deref(), Some("report.log"));
        assert!(cli.json);
        assert_eq!(cli.exclude, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(cli.threads, Some(3));
        assert!(cli.no_progress);
        assert!(cli.fail_on_unused);
    }

    #[test]
    fn test_panic_report_exit_code() {
        let mut buf = Vec::new();
        let code = report_panic(&"table lock lost", &mut buf);
        assert_eq!(code, 2);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("[PANIC] prgscan internal error: table lock lost"));
        assert!(text.contains("exit with code 2."));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let result = Cli::try_parse_from(["prgscan", "--threads", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let cli = parse(&["--dir", "src"]);
        let settings = resolve_settings(&cli, &PrgscanConfig::default());
        if std::env::var_os("PRGSCANNER_OUT").is_none() {
            assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        }
        assert_eq!(settings.root, PathBuf::from("src"));
        assert!(!settings.json);
        assert!(settings.excludes.is_empty());
        assert_eq!(settings.threads, None);
        assert!(settings.progress);
    }

    #[test]
    fn test_resolve_config_and_cli_precedence() {
        let config = PrgscanConfig {
            exclude: Some(vec!["backup".to_string()]),
            threads: Some(2),
            output: Some(OutputConfig {
                path: Some("from_config.log".to_string()),
                format: Some("json".to_string()),
            }),
        };

        let cli = parse(&["--dir", "src", "--exclude", "backup", "old"]);
        let settings = resolve_settings(&cli, &config);
        if std::env::var_os("PRGSCANNER_OUT").is_none() {
            assert_eq!(settings.output, PathBuf::from("from_config.log"));
        }
        assert!(settings.json);
        assert_eq!(settings.excludes, vec!["backup".to_string(), "old".to_string()]);
        assert_eq!(settings.threads, Some(2));

        let cli = parse(&["--dir", "src", "--out", "cli.log", "--threads", "6"]);
        let settings = resolve_settings(&cli, &config);
        assert_eq!(settings.output, PathBuf::from("cli.log"));
        assert_eq!(settings.threads, Some(6));
    }

    #[test]
    fn test_run_writes_log() {
        let dir = create_temp_dir("run");
        fs::write(dir.join("main.prg"), "function Func1\nfunction Func2\n").unwrap();
        fs::write(dir.join("utils.prg"), "Func2()\n").unwrap();
        let out = dir.join("unused.log");

        let cli = parse(&[
            "--dir",
            dir.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--no-progress",
        ]);
        assert_eq!(run(&cli).unwrap(), 0);

        let log = fs::read_to_string(&out).unwrap();
        assert!(log.contains("    - Func1"));
        assert!(!log.contains("    - Func2"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_fail_on_unused_exit_code() {
        let dir = create_temp_dir("fail_on_unused");
        fs::write(dir.join("main.prg"), "function Orphan\n").unwrap();
        let out = dir.join("unused.log");

        let cli = parse(&[
            "--dir",
            dir.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--no-progress",
            "--fail-on-unused",
        ]);
        assert_eq!(run(&cli).unwrap(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_missing_dir_fails() {
        let dir = create_temp_dir("missing");
        let cli = parse(&[
            "--dir",
            dir.join("nope").to_str().unwrap(),
            "--out",
            dir.join("unused.log").to_str().unwrap(),
            "--no-progress",
        ]);
        assert!(run(&cli).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_unwritable_report_fails() {
        let dir = create_temp_dir("unwritable");
        fs::write(dir.join("main.prg"), "function Foo\n").unwrap();
        // the output path is an existing directory
        let cli = parse(&[
            "--dir",
            dir.to_str().unwrap(),
            "--out",
            dir.to_str().unwrap(),
            "--no-progress",
        ]);
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
        fs::remove_dir_all(&dir).ok();
    }
}
