//! Builder pattern API for running a scan.
//!
//! ```rust,ignore
//! use prgscan_core::prelude::*;
//!
//! let outcome = PrgScan::new("/path/to/sources")
//!     .exclude_dirs(["backup"])
//!     .threads(Some(8))
//!     .analyze()?;
//!
//! for unused in &outcome.unused.globals {
//!     println!("{} ({})", unused.name, unused.file.display());
//! }
//! ```
//!
//! The scan is a strict pipeline:
//! `Idle → Locating → Extracting → CountingUsage → Aggregating → Done`.
//! Each parallel phase joins on every file before the next one starts.
//! Usage counting needs the complete table: a symbol declared in a file
//! read late must still be credited for usages in a file read early.

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{IoResultExt, ScanError, ScanResult};
use crate::scan::gather_prg_files_with_excludes;
use crate::stats::{calculate_statistics, unused_declarations, Statistics, UnusedDeclarations};
use crate::symbols::{count_usages, register_declarations, SymbolTable};

/// Pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScanPhase {
    Idle,
    Locating,
    Extracting,
    CountingUsage,
    Aggregating,
    Done,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Locating => write!(f, "locating files"),
            Self::Extracting => write!(f, "extracting declarations"),
            Self::CountingUsage => write!(f, "counting usages"),
            Self::Aggregating => write!(f, "aggregating"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Receives progress signals from the parallel phases.
///
/// `advance` is called from worker threads, once per file per phase.
/// Implementations have no influence on the scan.
pub trait ProgressSink: Sync {
    /// A parallel phase is starting with `total` files.
    fn begin_phase(&self, _phase: ScanPhase, _total: usize) {}

    /// One file finished in the current phase.
    fn advance(&self);

    /// The current phase joined.
    fn finish_phase(&self, _phase: ScanPhase) {}
}

/// Progress sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self) {}
}

/// Builder for configuring a scan.
#[derive(Debug, Clone)]
pub struct PrgScan {
    /// Root directory to scan
    root: PathBuf,

    /// Directory names pruned during discovery
    excluded_dirs: Vec<String>,

    /// Dedicated pool size; None uses the global rayon pool
    threads: Option<usize>,
}

impl PrgScan {
    /// Create a new scan builder for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded_dirs: Vec::new(),
            threads: None,
        }
    }

    /// Add directory names to prune while locating files.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Run both phases on a dedicated pool of `n` workers.
    pub fn threads(mut self, n: Option<usize>) -> Self {
        self.threads = n;
        self
    }

    /// Run the scan without progress reporting.
    pub fn analyze(&self) -> ScanResult<ScanOutcome> {
        self.analyze_with_progress(&NoProgress)
    }

    /// Run the scan, reporting per-file progress to `progress`.
    pub fn analyze_with_progress(&self, progress: &dyn ProgressSink) -> ScanResult<ScanOutcome> {
        match self.threads {
            Some(0) => Err(ScanError::internal("worker pool needs at least one thread")),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("prgscan-worker-{}", i))
                    .build()
                    .map_err(|e| ScanError::internal(format!("failed to build worker pool: {}", e)))?;
                pool.install(|| self.run(progress))
            }
            None => self.run(progress),
        }
    }

    fn run(&self, progress: &dyn ProgressSink) -> ScanResult<ScanOutcome> {
        let start = Instant::now();
        info!(phase = %ScanPhase::Idle, root = %self.root.display(), workers = rayon::current_num_threads());

        // 1. Locate (fatal on traversal errors)
        enter(ScanPhase::Locating);
        let excludes: Vec<&str> = self.excluded_dirs.iter().map(String::as_str).collect();
        let files = gather_prg_files_with_excludes(&self.root, &excludes)?;
        info!(files = files.len(), "located .prg files");

        let table = SymbolTable::new();

        // 2. Declarations
        let skipped_decl = run_phase(ScanPhase::Extracting, &files, progress, |path, content| {
            let n = register_declarations(&table, path, content);
            debug!(file = %path.display(), declarations = n);
        });
        info!(
            globals = table.global_count(),
            statics = table.static_count(),
            "declaration phase complete"
        );

        // 3. Usages; only starts once every declaration is registered
        let skipped_usage = run_phase(ScanPhase::CountingUsage, &files, progress, |path, content| {
            let usage = count_usages(&table, path, content);
            debug!(
                file = %path.display(),
                global_hits = usage.global_hits,
                static_hits = usage.static_hits
            );
        });

        // 4. Aggregate
        enter(ScanPhase::Aggregating);
        let skipped: BTreeSet<PathBuf> = skipped_decl.into_iter().chain(skipped_usage).collect();
        let mut statistics = calculate_statistics(&table, start.elapsed());
        statistics.files_scanned = files.len();
        statistics.files_skipped = skipped.len();
        let unused = unused_declarations(&table);

        enter(ScanPhase::Done);
        info!(
            unused_global = statistics.unused_global,
            unused_static = statistics.unused_static,
            elapsed_ms = statistics.total_duration.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            root: self.root.clone(),
            files,
            skipped: skipped.into_iter().collect(),
            table,
            statistics,
            unused,
        })
    }
}

fn enter(phase: ScanPhase) {
    info!(phase = %phase, "entering phase");
}

/// Read a source file. Non-UTF-8 bytes are replaced, never rejected:
/// legacy sources are often in a DOS code page.
pub fn read_source(path: &Path) -> ScanResult<String> {
    let bytes = fs::read(path).with_path(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Run one parallel phase over every file and join.
///
/// Unreadable files are logged and skipped. Returns their paths.
fn run_phase<F>(
    phase: ScanPhase,
    files: &[PathBuf],
    progress: &dyn ProgressSink,
    work: F,
) -> Vec<PathBuf>
where
    F: Fn(&Path, &str) + Sync,
{
    enter(phase);
    progress.begin_phase(phase, files.len());

    // collect() is the barrier: it returns only after every task finished
    let skipped: Vec<PathBuf> = files
        .par_iter()
        .filter_map(|path| {
            let result = match read_source(path) {
                Ok(content) => {
                    work(path, &content);
                    None
                }
                Err(e) => {
                    warn!(phase = %phase, error = %e, "skipping unreadable file");
                    Some(path.clone())
                }
            };
            progress.advance();
            result
        })
        .collect();

    progress.finish_phase(phase);
    skipped
}

/// Everything a scan produced.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Root that was scanned
    pub root: PathBuf,
    /// Every located .prg file, sorted
    pub files: Vec<PathBuf>,
    /// Files that failed to read in at least one phase, sorted
    pub skipped: Vec<PathBuf>,
    /// Final symbol table (read-only from here on)
    pub table: SymbolTable,
    /// Aggregate statistics
    pub statistics: Statistics,
    /// Unused globals and statics
    pub unused: UnusedDeclarations,
}

impl ScanOutcome {
    /// Check if any unused symbol was found.
    pub fn has_unused(&self) -> bool {
        !self.unused.is_empty()
    }
}
