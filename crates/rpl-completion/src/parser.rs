//! Lexical category extraction for RPL documents
//!
//! The parser is deliberately naive: every category is one independent regex
//! sweep over the whole document. There is no tokenizer and no position
//! tracking; the same text may feed several categories.
//!
//! # Example
//!
//! ```
//! use rpl_completion::parser::RplParser;
//!
//! let parser = RplParser::new();
//! let result = parser.parse("fn foo($x: i32) {}\nuse core::mem;");
//!
//! assert_eq!(result.functions, vec!["foo"]);
//! assert_eq!(result.metavariables, vec!["x"]);
//! assert_eq!(result.imports, vec!["mem"]);
//! ```

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::vocabulary;

/// How the static categories (keywords, operators) are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyMode {
    /// Return the full built-in vocabulary regardless of input
    #[default]
    Static,
    /// Return only the vocabulary terms that occur in the input
    Matched,
}

/// Strings extracted from one document, grouped by category
///
/// Every field is deduplicated and kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub keywords: Vec<String>,
    pub functions: Vec<String>,
    pub metavariables: Vec<String>,
    pub operators: Vec<String>,
    pub imports: Vec<String>,
    pub macros: Vec<String>,
}

impl ExtractionResult {
    /// Total number of strings across all categories
    pub fn len(&self) -> usize {
        self.keywords.len()
            + self.functions.len()
            + self.metavariables.len()
            + self.operators.len()
            + self.imports.len()
            + self.macros.len()
    }

    /// True when no category holds anything
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn function_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"fn\s+((?-u:\w)+)\s*\(").expect("Invalid regex"))
}

fn metavariable_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // Matches `$x`, `let $x:`, `let mut $x =` and `@let $x`
        Regex::new(r"(?:@?let(?:\s+mut)?\s+)?\$((?-u:\w)+)\s*[:=]?").expect("Invalid regex")
    })
}

fn import_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // `^` also matches after a lone `\r`
        Regex::new(r"(?mR)^\s*use\s+(?:(?-u:\w)+::)*((?-u:\w)+)\s*;").expect("Invalid regex")
    })
}

/// Collect capture group 1 of every match, deduplicated in first-seen order
fn capture_unique(regex: &Regex, text: &str) -> Vec<String> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unique()
        .collect()
}

/// Word-bounded matcher for one vocabulary term
fn term_regex(term: &str) -> Regex {
    let escaped = regex::escape(term);
    let starts_word = term.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_');
    let ends_word = term.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_');
    let pattern = format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        escaped,
        if ends_word { r"\b" } else { "" }
    );
    Regex::new(&pattern).expect("escaped vocabulary term is a valid regex")
}

/// Per-term matchers used in [`VocabularyMode::Matched`]
#[derive(Debug)]
struct VocabularyMatchers {
    keywords: Vec<(&'static str, Regex)>,
    operators: Vec<(&'static str, Regex)>,
}

impl VocabularyMatchers {
    fn compile() -> Self {
        Self {
            keywords: vocabulary::keywords().map(|t| (t, term_regex(t))).collect(),
            operators: vocabulary::OPERATORS
                .iter()
                .map(|&t| (t, term_regex(t)))
                .collect(),
        }
    }

    fn present(terms: &[(&'static str, Regex)], text: &str) -> Vec<String> {
        terms
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(term, _)| term.to_string())
            .collect()
    }
}

/// Naive RPL parser
///
/// Cheap to construct in [`VocabularyMode::Static`]; in
/// [`VocabularyMode::Matched`] the per-term matchers are compiled once here.
#[derive(Debug)]
pub struct RplParser {
    mode: VocabularyMode,
    matchers: Option<VocabularyMatchers>,
}

impl RplParser {
    /// Create a parser returning the static vocabulary
    pub fn new() -> Self {
        Self::with_mode(VocabularyMode::Static)
    }

    /// Create a parser with the given vocabulary mode
    pub fn with_mode(mode: VocabularyMode) -> Self {
        let matchers = match mode {
            VocabularyMode::Static => None,
            VocabularyMode::Matched => Some(VocabularyMatchers::compile()),
        };
        Self { mode, matchers }
    }

    /// The vocabulary mode this parser was built with
    pub fn mode(&self) -> VocabularyMode {
        self.mode
    }

    /// Extract every category from `text`
    ///
    /// Total over all inputs: unmatched or malformed regions simply
    /// contribute nothing.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let (keywords, operators) = match &self.matchers {
            Some(m) => (
                VocabularyMatchers::present(&m.keywords, text),
                VocabularyMatchers::present(&m.operators, text),
            ),
            None => (
                vocabulary::keywords().map(str::to_string).collect(),
                vocabulary::OPERATORS.iter().map(|s| s.to_string()).collect(),
            ),
        };

        let result = ExtractionResult {
            keywords,
            functions: self.extract_functions(text),
            metavariables: self.extract_metavariables(text),
            operators,
            imports: self.extract_imports(text),
            macros: vocabulary::MACROS.iter().map(|s| s.to_string()).collect(),
        };

        trace!(
            functions = result.functions.len(),
            metavariables = result.metavariables.len(),
            imports = result.imports.len(),
            "Extracted RPL categories"
        );

        result
    }

    /// Function names declared with `fn name(`
    pub fn extract_functions(&self, text: &str) -> Vec<String> {
        capture_unique(function_regex(), text)
    }

    /// Metavariable names, without the `$` sigil
    pub fn extract_metavariables(&self, text: &str) -> Vec<String> {
        capture_unique(metavariable_regex(), text)
    }

    /// Last path segment of every `use a::b::c;` line
    pub fn extract_imports(&self, text: &str) -> Vec<String> {
        capture_unique(import_regex(), text)
    }
}

impl Default for RplParser {
    fn default() -> Self {
        Self::new()
    }
}
