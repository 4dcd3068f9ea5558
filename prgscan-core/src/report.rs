//! Output formatting: the grouped text log, JSON, and a plain summary.
//!
//! The log layout is a header with timestamp, a summary block, then one
//! section for globals and one for statics. Each section is grouped by
//! directory, then by file name, with one bullet per unused symbol.

use chrono::{DateTime, Local};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ScanError, ScanResult};
use crate::pipeline::ScanOutcome;
use crate::stats::{Statistics, UnusedSymbol};

const RULE: &str = "========================================";
const SECTION_RULE: &str = "############################################################";

/// directory → file name → symbol names
pub type GroupedSymbols = BTreeMap<PathBuf, BTreeMap<String, Vec<String>>>;

/// Group unused symbols by directory, then by file name.
pub fn group_by_directory(symbols: &[UnusedSymbol]) -> GroupedSymbols {
    let mut grouped = GroupedSymbols::new();
    for sym in symbols {
        let dir = sym
            .file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let file_name = sym
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| sym.file.display().to_string());
        grouped
            .entry(dir)
            .or_default()
            .entry(file_name)
            .or_default()
            .push(sym.name.clone());
    }
    grouped
}

fn write_section(out: &mut String, title: &str, symbols: &[UnusedSymbol]) {
    // writing into a String cannot fail
    let _ = writeln!(out, "{} ({}):", title, symbols.len());
    let _ = writeln!(out, "{}", SECTION_RULE);
    for (dir, files) in group_by_directory(symbols) {
        let _ = writeln!(out, "Directory: {}", dir.display());
        for (file, names) in files {
            let _ = writeln!(out, "  File: {}", file);
            for name in names {
                let _ = writeln!(out, "    - {}", name);
            }
        }
        out.push('\n');
    }
    out.push('\n');
}

fn write_summary(out: &mut String, stats: &Statistics) {
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "Files scanned:                 {}", stats.files_scanned);
    if stats.files_skipped > 0 {
        let _ = writeln!(out, "Files skipped (unreadable):    {}", stats.files_skipped);
    }
    let _ = writeln!(out, "Global declarations:           {}", stats.total_global);
    let _ = writeln!(out, "Unused global declarations:    {}", stats.unused_global);
    let _ = writeln!(out, "Global usage:                  {:.2}%", stats.global_usage_percentage);
    let _ = writeln!(out, "Static declarations:           {}", stats.total_static);
    let _ = writeln!(out, "Unused static declarations:    {}", stats.unused_static);
    let _ = writeln!(out, "Static usage:                  {:.2}%", stats.static_usage_percentage);
    let _ = writeln!(
        out,
        "Processing time:               {:.3}s",
        stats.total_duration.as_secs_f64()
    );
    out.push('\n');
}

/// Render the full text log.
pub fn render_log(outcome: &ScanOutcome, timestamp: DateTime<Local>) -> String {
    let mut out = String::with_capacity(4096);

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "   Unused Functions/Procedures Report");
    let _ = writeln!(out, "   Date: {}", timestamp.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "   Root: {}", outcome.root.display());
    let _ = writeln!(out, "{}", RULE);
    out.push('\n');

    write_summary(&mut out, &outcome.statistics);
    write_section(&mut out, "Unused Global Functions/Procedures", &outcome.unused.globals);
    write_section(&mut out, "Unused Static Functions/Procedures", &outcome.unused.statics);

    out
}

/// Write the text log to `path`, creating or truncating it.
pub fn write_log(path: &Path, outcome: &ScanOutcome) -> ScanResult<()> {
    let content = render_log(outcome, Local::now());
    fs::write(path, content).map_err(|e| ScanError::report(path, e))
}

/// Render statistics and unused lists as a JSON document.
pub fn render_json(outcome: &ScanOutcome) -> serde_json::Value {
    json!({
        "root": outcome.root.display().to_string(),
        "statistics": outcome.statistics,
        "unused_globals": outcome.unused.globals,
        "unused_statics": outcome.unused.statics,
        "skipped_files": outcome
            .skipped
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
    })
}

/// Prints the JSON document to stdout.
///
/// Falls back to a minimal document if serialization fails.
pub fn print_json(outcome: &ScanOutcome) {
    match serde_json::to_string_pretty(&render_json(outcome)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed");
            println!(
                "{{\"unused_global\": {}, \"unused_static\": {}}}",
                outcome.statistics.unused_global, outcome.statistics.unused_static
            );
        }
    }
}

/// Prints a short plain-text summary to stdout.
pub fn print_plain(outcome: &ScanOutcome) {
    let s = &outcome.statistics;
    if !outcome.has_unused() {
        println!("No unused functions/procedures found.");
    } else {
        println!(
            "UNUSED: {} global, {} static",
            s.unused_global, s.unused_static
        );
    }
    println!(
        "Globals: {} ({:.2}% used), statics: {} ({:.2}% used), {} files in {:.3}s",
        s.total_global,
        s.global_usage_percentage,
        s.total_static,
        s.static_usage_percentage,
        s.files_scanned,
        s.total_duration.as_secs_f64()
    );
}
