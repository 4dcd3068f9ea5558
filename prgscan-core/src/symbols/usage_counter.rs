//! Lexical usage counting against registered declarations.
//!
//! Each file is lower-cased and split into identifier-like tokens: runs of
//! Unicode letters, decimal digits and `_`. Anything else, including
//! superscripts, fractions and letter-like numerals, separates tokens. Every global whose lower-cased name appears is
//! credited with the occurrences found. Statics are credited only from
//! their own file. One occurrence is discounted in the declaring file, for
//! the declaration line itself.
//!
//! Increments are atomic and commutative, so the final counts do not depend
//! on which worker handles which file, or in what order.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use super::symbol_table::{Declaration, SymbolTable};

/// Per-file token frequency table, keyed by lower-cased token.
#[derive(Debug, Clone, Default)]
pub struct TokenFrequencies {
    counts: HashMap<String, u64>,
}

impl TokenFrequencies {
    /// Occurrences of an already lower-cased token.
    pub fn get(&self, lower_token: &str) -> u64 {
        self.counts.get(lower_token).copied().unwrap_or(0)
    }
}

/// Token pattern: letters (L*), decimal digits (Nd) and underscore.
fn token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // SAFETY: This regex pattern is hardcoded and covered by the tests below.
    REGEX.get_or_init(|| {
        Regex::new(r"[\p{L}\p{Nd}_]+").expect("Hardcoded regex pattern is valid")
    })
}

/// Tokenize content into a frequency table.
pub fn token_frequencies(content: &str) -> TokenFrequencies {
    let lowered = content.to_lowercase();
    let mut counts: HashMap<String, u64> = HashMap::new();

    for token in token_regex().find_iter(&lowered).map(|m| m.as_str()) {
        // avoid allocating for tokens already seen
        match counts.get_mut(token) {
            Some(n) => *n += 1,
            None => {
                counts.insert(token.to_string(), 1);
            }
        }
    }

    TokenFrequencies { counts }
}

/// Occurrences creditable to `decl` from a file with these frequencies.
fn creditable(decl: &Declaration, freq: &TokenFrequencies, in_declaring_file: bool) -> u64 {
    let found = freq.get(decl.lower_name());
    if in_declaring_file {
        found.saturating_sub(1)
    } else {
        found
    }
}

/// Summary of what one file contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileUsage {
    /// Occurrences added to global declarations
    pub global_hits: u64,
    /// Occurrences added to this file's static declarations
    pub static_hits: u64,
}

/// Apply a file's frequencies to the table.
///
/// Takes only the shared read lock. Counters are bumped atomically.
pub fn apply_frequencies(table: &SymbolTable, path: &Path, freq: &TokenFrequencies) -> FileUsage {
    let tables = table.read();
    let mut usage = FileUsage::default();

    for decl in tables.globals.values() {
        let n = creditable(decl, freq, decl.file() == path);
        decl.add_usages(n);
        usage.global_hits += n;
    }

    if let Some(statics) = tables.statics_in(path) {
        for decl in statics.values() {
            let n = creditable(decl, freq, true);
            decl.add_usages(n);
            usage.static_hits += n;
        }
    }

    usage
}

/// Tokenize one file's content and credit its usages.
pub fn count_usages(table: &SymbolTable, path: &Path, content: &str) -> FileUsage {
    let freq = token_frequencies(content);
    apply_frequencies(table, path, &freq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{register_declarations, Scope};
    use std::path::PathBuf;

    #[test]
    fn test_tokenize_basic() {
        let freq = token_frequencies("Func2()  func2 := FUNC2 + x_1; x_1");
        assert_eq!(freq.get("func2"), 3);
        assert_eq!(freq.get("x_1"), 2);
        assert_eq!(freq.get("Func2"), 0, "keys are lower-cased");
        assert_eq!(freq.counts.len(), 2);
    }

    #[test]
    fn test_tokenize_separators() {
        let freq = token_frequencies("a.b->c:d\"e\"'f'[g]{h}//i\n\tj");
        for t in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"] {
            assert_eq!(freq.get(t), 1, "token {}", t);
        }
        assert!(token_frequencies("  ;; () ").counts.is_empty());
    }

    #[test]
    fn test_tokenize_unicode_letters() {
        let freq = token_frequencies("Ação ação");
        assert_eq!(freq.get("ação"), 2);
    }

    #[test]
    fn test_tokenize_splits_on_non_decimal_numerics() {
        // superscripts (No), fractions (No) and roman numerals (Nl) are separators
        let freq = token_frequencies("Foo² Foo½ BarⅫ");
        assert_eq!(freq.get("foo"), 2);
        assert_eq!(freq.get("bar"), 1);
        assert_eq!(freq.get("foo²"), 0);
        assert_eq!(freq.get("ⅻ"), 0);

        // decimal digits from any script stay inside the token
        assert_eq!(token_frequencies("x٣ X٣").get("x٣"), 2);
    }

    #[test]
    fn test_reference_followed_by_superscript_counts() {
        let table = SymbolTable::new();
        let main = PathBuf::from("main.prg");
        register_declarations(&table, &main, "function Foo\n");

        count_usages(&table, &main, "function Foo\n");
        count_usages(&table, &PathBuf::from("calc.prg"), "x := Foo² + Foo½\n");
        assert_eq!(table.global_usage("Foo"), Some(3));
    }

    #[test]
    fn test_tokens_are_whole_words() {
        let freq = token_frequencies("FooBar Foo_ Foo");
        assert_eq!(freq.get("foo"), 1);
        assert_eq!(freq.get("foobar"), 1);
        assert_eq!(freq.get("foo_"), 1);
    }

    #[test]
    fn test_declaration_alone_is_discounted() {
        let table = SymbolTable::new();
        let main = PathBuf::from("main.prg");
        let content = "function Foo\nreturn nil\n";
        register_declarations(&table, &main, content);

        let usage = count_usages(&table, &main, content);
        assert_eq!(usage, FileUsage::default());
        assert_eq!(table.global_usage("Foo"), Some(1));
    }

    #[test]
    fn test_global_used_in_other_file_case_insensitive() {
        let table = SymbolTable::new();
        let main = PathBuf::from("main.prg");
        let utils = PathBuf::from("utils.prg");
        register_declarations(&table, &main, "Procedure MyProc\n");

        count_usages(&table, &main, "Procedure MyProc\n");
        let usage = count_usages(&table, &utils, "MYPROC(1)\nmyproc()\n");

        assert_eq!(usage.global_hits, 2);
        assert_eq!(table.global_usage("MyProc"), Some(3));
    }

    #[test]
    fn test_static_only_counted_in_own_file() {
        let table = SymbolTable::new();
        let a = PathBuf::from("a.prg");
        let b = PathBuf::from("b.prg");
        register_declarations(&table, &a, "static function Bar\n");

        count_usages(&table, &a, "static function Bar\n");
        let usage_b = count_usages(&table, &b, "Bar() Bar() BAR()");

        assert_eq!(usage_b.static_hits, 0);
        assert_eq!(table.static_usage(&a, "Bar"), Some(1));
    }

    #[test]
    fn test_static_used_twice() {
        let table = SymbolTable::new();
        let utils = PathBuf::from("utils.prg");
        let content = "static procedure Helper\nreturn\n\nfunction Run\n  Helper()\n  Helper()\nreturn nil\n";
        register_declarations(&table, &utils, content);

        let usage = count_usages(&table, &utils, content);
        assert_eq!(usage.static_hits, 2);
        assert_eq!(table.static_usage(&utils, "Helper"), Some(3));
    }

    #[test]
    fn test_duplicate_global_declarations_inflate_count() {
        let table = SymbolTable::new();
        let a = PathBuf::from("a.prg");
        let b = PathBuf::from("b.prg");
        register_declarations(&table, &a, "function Dup\n");
        register_declarations(&table, &b, "function Dup\n");
        assert_eq!(table.global_usage("Dup"), Some(2));

        // a.prg is the kept declaring file, so only its line is discounted;
        // b.prg's declaration line counts as a usage
        count_usages(&table, &a, "function Dup\n");
        count_usages(&table, &b, "function Dup\n");
        assert_eq!(table.global_usage("Dup"), Some(3));
        assert_eq!(table.read().globals["Dup"].scope(), Scope::Global);
    }
}
