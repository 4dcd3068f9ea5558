//! Aggregate statistics and unused-symbol extraction.
//!
//! Both read the final symbol table after the usage phase has joined.
//! A declaration is unused when its count is still <= 1, meaning only
//! the declaration itself was ever seen.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::symbols::{Declaration, SymbolTable};

/// Immutable snapshot of scan totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_global: usize,
    pub unused_global: usize,
    pub global_usage_percentage: f64,
    pub total_static: usize,
    pub unused_static: usize,
    pub static_usage_percentage: f64,
    /// Wall-clock time from start of discovery to aggregation
    #[serde(serialize_with = "serialize_secs")]
    pub total_duration: Duration,
    /// Files handed to the pipeline
    pub files_scanned: usize,
    /// Files that could not be read in at least one phase
    pub files_skipped: usize,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Share of used declarations, in percent. Zero when there are none.
pub fn usage_percentage(total: usize, unused: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (total.saturating_sub(unused) as f64 / total as f64) * 100.0
    }
}

/// Compute totals, unused counts and percentages from the final table.
pub fn calculate_statistics(table: &SymbolTable, elapsed: Duration) -> Statistics {
    let tables = table.read();

    let total_global = tables.globals.len();
    let unused_global = tables.globals.values().filter(|d| d.is_unused()).count();
    let total_static = tables.all_statics().count();
    let unused_static = tables.all_statics().filter(|d| d.is_unused()).count();

    Statistics {
        total_global,
        unused_global,
        global_usage_percentage: usage_percentage(total_global, unused_global),
        total_static,
        unused_static,
        static_usage_percentage: usage_percentage(total_static, unused_static),
        total_duration: elapsed,
        files_scanned: 0,
        files_skipped: 0,
    }
}

/// A declaration that was never referenced.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnusedSymbol {
    /// Declaring file
    pub file: PathBuf,
    /// Name as written in the declaration
    pub name: String,
    /// Line number (1-indexed) of the kept declaration
    pub line: usize,
}

impl From<&Declaration> for UnusedSymbol {
    fn from(decl: &Declaration) -> Self {
        Self {
            file: decl.file().to_path_buf(),
            name: decl.name().to_string(),
            line: decl.line(),
        }
    }
}

/// Unused globals and statics, each sorted by file, then name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnusedDeclarations {
    pub globals: Vec<UnusedSymbol>,
    pub statics: Vec<UnusedSymbol>,
}

impl UnusedDeclarations {
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.statics.is_empty()
    }
}

/// Collect every unused declaration from the final table.
pub fn unused_declarations(table: &SymbolTable) -> UnusedDeclarations {
    let tables = table.read();

    let mut globals: Vec<UnusedSymbol> = tables
        .globals
        .values()
        .filter(|d| d.is_unused())
        .map(UnusedSymbol::from)
        .collect();
    let mut statics: Vec<UnusedSymbol> = tables
        .all_statics()
        .filter(|d| d.is_unused())
        .map(UnusedSymbol::from)
        .collect();

    globals.sort();
    statics.sort();

    UnusedDeclarations { globals, statics }
}
