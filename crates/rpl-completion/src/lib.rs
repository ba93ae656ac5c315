/// RPL completion and formatting
///
/// Editor support for RPL, a small language describing structural patterns over
/// Rust-like code.
///
/// # Architecture
///
/// 1. **Vocabulary**: fixed keyword, operator and macro tables plus the completion
///    trigger characters
/// 2. **Parser**: independent regex sweeps that sort document text into six
///    categories (keywords, functions, metavariables, operators, imports, macros)
/// 3. **Generator**: one completion item per extracted string, tagged with its
///    category, plus two function declaration snippets
/// 4. **Engine**: async entry point combining parser and generator
/// 5. **Formatter**: identity by default, optionally delegating pattern block
///    bodies to an external tool
///
/// Extraction is total: any input, however malformed, produces a result.
///
/// # Example
///
/// ```
/// use rpl_completion::{RplParser, RplFormatter};
///
/// let result = RplParser::new().parse("use std::collections::HashMap;\nuse core::mem;");
/// assert_eq!(result.imports, vec!["HashMap", "mem"]);
///
/// # tokio_test::block_on(async {
/// let text = "patt { $x }";
/// assert_eq!(RplFormatter::new().format(text).await, text);
/// # });
/// ```
pub mod config;
pub mod engine;
pub mod formatter;
pub mod generator;
pub mod parser;
pub mod types;
pub mod vocabulary;

pub use config::{CompletionSettings, ConfigFormat, ConfigLoader, FormatterSettings, RplConfig};
pub use engine::{CompletionEngine, RplCompletionEngine};
pub use formatter::{find_block, Block, CommandFormatter, ExternalFormatter, FormatMode, RplFormatter};
pub use generator::{CompletionGenerator, RplCompletionGenerator};
pub use parser::{ExtractionResult, RplParser, VocabularyMode};
pub use types::*;
pub use vocabulary::trigger_characters;
