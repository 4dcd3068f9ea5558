//! Symbol engine: declaration extraction and lexical usage counting.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │  decl_extractor.rs  │     │  usage_counter.rs   │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  [static] function/ │     │  Tokenize, count,   │
//! │  procedure <name>   │     │  credit occurrences │
//! └──────────┬──────────┘     └──────────┬──────────┘
//!            │ register (write lock)     │ add (read lock + atomic)
//!            └───────────┬───────────────┘
//!                        ▼
//!            ┌─────────────────────┐
//!            │  symbol_table.rs    │
//!            │  ─────────────────  │
//!            │  globals: name      │
//!            │  statics: file/name │
//!            └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use prgscan_core::symbols::{count_usages, register_declarations, SymbolTable};
//!
//! let table = SymbolTable::new();
//! for (path, content) in &files {
//!     register_declarations(&table, path, content);
//! }
//! // every declaration must be known before counting starts
//! for (path, content) in &files {
//!     count_usages(&table, path, content);
//! }
//! ```

pub mod decl_extractor;
pub mod symbol_table;
pub mod usage_counter;

// Re-exports for convenience
pub use decl_extractor::{extract_declarations, match_declaration, register_declarations};
pub use symbol_table::{Declaration, DeclarationSite, Scope, SymbolTable, Tables};
pub use usage_counter::{apply_frequencies, count_usages, token_frequencies, FileUsage, TokenFrequencies};
