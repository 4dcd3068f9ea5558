//! prgscan-core: unused function/procedure detection for `.prg` codebases.
//!
//! The engine is lexical. It never builds a syntax tree and never resolves
//! scopes or calls. A declaration counts as used when its name shows up as
//! a token (case-insensitively) anywhere it is visible:
//!
//! - **global** declarations: in any scanned file
//! - **static** declarations: only in the file that declares them
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use prgscan_core::prelude::*;
//!
//! let outcome = PrgScan::new("/path/to/sources").analyze()?;
//!
//! for unused in &outcome.unused.globals {
//!     println!("Unused: {} in {}", unused.name, unused.file.display());
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`scan`]: Parallel `.prg` file discovery
//! - [`symbols`]: Declaration extraction, symbol table, usage counting
//! - [`stats`]: Statistics and unused-symbol extraction
//! - [`pipeline`]: Phase orchestration and worker pool
//! - [`report`]: Text log, JSON and plain output
//! - [`config`]: `prgscan.toml` loading
//! - [`error`]: Typed error handling

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod stats;
pub mod symbols;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{IoResultExt, ScanError, ScanResult};

// Configuration
pub use config::{load_config, OutputConfig, PrgscanConfig, CONFIG_FILE};

// Logging
pub use logging::init_structured_logging;

// Pipeline
pub use pipeline::{read_source, NoProgress, PrgScan, ProgressSink, ScanOutcome, ScanPhase};

// Reporting
pub use report::{
    group_by_directory, print_json, print_plain, render_json, render_log, write_log,
    GroupedSymbols,
};

// File scanning
pub use scan::{gather_prg_files, gather_prg_files_with_excludes, is_prg_file, PRG_SUFFIX};

// Statistics
pub use stats::{
    calculate_statistics, unused_declarations, usage_percentage, Statistics,
    UnusedDeclarations, UnusedSymbol,
};

// Symbol engine
pub use symbols::{
    apply_frequencies, count_usages, extract_declarations, match_declaration,
    register_declarations, token_frequencies, Declaration, DeclarationSite, FileUsage, Scope,
    SymbolTable, Tables, TokenFrequencies,
};
