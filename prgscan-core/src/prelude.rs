//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use prgscan_core::prelude::*;
//! ```

// Errors
pub use crate::error::{ScanError, ScanResult};

// Pipeline
pub use crate::pipeline::{NoProgress, PrgScan, ProgressSink, ScanOutcome, ScanPhase};

// Symbol engine
pub use crate::symbols::{Declaration, Scope, SymbolTable};

// Results
pub use crate::stats::{Statistics, UnusedDeclarations, UnusedSymbol};

// File scanning
pub use crate::scan::{gather_prg_files, gather_prg_files_with_excludes};

// Configuration
pub use crate::config::{load_config, PrgscanConfig};
