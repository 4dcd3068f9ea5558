//! Shared store of every discovered function/procedure declaration.
//!
//! Concurrency discipline:
//! - Structural changes (new declaration, new per-file static map,
//!   duplicate handling) take the single write lock, once per declaration.
//! - Usage counts are `AtomicU64` fields. Incrementing one only needs the
//!   shared read lock, so usage workers never contend on the table itself.
//!
//! The table is created per scan and passed by reference into each phase.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Visibility class of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Matchable anywhere in the scanned tree
    Global,
    /// Matchable only inside its declaring file
    Static,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// A declaration as seen on a single source line, before registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSite {
    /// Declared name, as written
    pub name: String,
    /// Global or static
    pub scope: Scope,
    /// Declaring file
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
}

/// A registered declaration and its running usage count.
#[derive(Debug)]
pub struct Declaration {
    name: String,
    lower_name: String,
    file: PathBuf,
    line: usize,
    scope: Scope,
    usage_count: AtomicU64,
}

impl Declaration {
    fn from_site(site: DeclarationSite) -> Self {
        Self {
            lower_name: site.name.to_lowercase(),
            name: site.name,
            file: site.file,
            line: site.line,
            scope: site.scope,
            // the declaration itself counts as one occurrence
            usage_count: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased name, the key used against token frequencies.
    pub fn lower_name(&self) -> &str {
        &self.lower_name
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Current usage count, including the declaration itself.
    pub fn usage_count(&self) -> u64 {
        self.usage_count.load(Ordering::Relaxed)
    }

    /// True when nothing beyond the declaration was ever counted.
    pub fn is_unused(&self) -> bool {
        self.usage_count() <= 1
    }

    /// Atomically add `n` occurrences.
    ///
    /// Relaxed is enough: readers only look at the final value after the
    /// phase join, which already orders all increments before the read.
    pub fn add_usages(&self, n: u64) {
        if n > 0 {
            self.usage_count.fetch_add(n, Ordering::Relaxed);
        }
    }
}

/// The two declaration maps guarded by the table lock.
#[derive(Debug, Default)]
pub struct Tables {
    /// Global declarations keyed by name (case as written)
    pub globals: HashMap<String, Declaration>,
    /// Static declarations keyed by declaring file, then name
    pub statics: HashMap<PathBuf, HashMap<String, Declaration>>,
}

impl Tables {
    /// Statics declared in `file`, if any.
    pub fn statics_in(&self, file: &Path) -> Option<&HashMap<String, Declaration>> {
        self.statics.get(file)
    }

    /// Iterate every static declaration across all files.
    pub fn all_statics(&self) -> impl Iterator<Item = &Declaration> {
        self.statics.values().flat_map(|m| m.values())
    }
}

/// Thread-safe symbol table shared by the extraction and usage phases.
#[derive(Debug, Default)]
pub struct SymbolTable {
    inner: RwLock<Tables>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one declaration site. One write-lock critical section.
    ///
    /// - Global seen before: the existing counter is incremented, so a
    ///   name declared twice reads as "used". The kept entry points at
    ///   the lexicographically smallest declaring file, which keeps
    ///   attribution independent of worker scheduling.
    /// - Static seen before in the same file: replaced (last write wins).
    pub fn register(&self, site: DeclarationSite) {
        let mut guard = self.write();
        let tables = &mut *guard;
        match site.scope {
            Scope::Global => match tables.globals.get_mut(&site.name) {
                Some(existing) => {
                    existing.add_usages(1);
                    if site.file < existing.file {
                        existing.file = site.file;
                        existing.line = site.line;
                    }
                }
                None => {
                    tables
                        .globals
                        .insert(site.name.clone(), Declaration::from_site(site));
                }
            },
            Scope::Static => {
                tables
                    .statics
                    .entry(site.file.clone())
                    .or_default()
                    .insert(site.name.clone(), Declaration::from_site(site));
            }
        }
    }

    /// Shared access for counting and reporting.
    pub fn read(&self) -> RwLockReadGuard<'_, Tables> {
        // A panicking writer cannot leave a map half-inserted, so the
        // data behind a poisoned lock is still consistent.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn global_count(&self) -> usize {
        self.read().globals.len()
    }

    pub fn static_count(&self) -> usize {
        self.read().all_statics().count()
    }

    /// Usage count of a global, by exact name.
    pub fn global_usage(&self, name: &str) -> Option<u64> {
        self.read().globals.get(name).map(Declaration::usage_count)
    }

    /// Usage count of a static, by declaring file and exact name.
    pub fn static_usage(&self, file: &Path, name: &str) -> Option<u64> {
        self.read()
            .statics_in(file)
            .and_then(|m| m.get(name))
            .map(Declaration::usage_count)
    }

    /// Snapshot of every declaration as `(scope, file, name, count)`, sorted.
    pub fn snapshot(&self) -> Vec<(Scope, PathBuf, String, u64)> {
        let tables = self.read();
        let mut rows: Vec<_> = tables
            .globals
            .values()
            .chain(tables.all_statics())
            .map(|d| (d.scope, d.file.clone(), d.name.clone(), d.usage_count()))
            .collect();
        rows.sort();
        rows
    }
}
