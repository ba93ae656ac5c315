/// Completion engine for RPL documents
///
/// The engine is a two-stage pipeline:
///
/// 1. **Extraction**: [`RplParser`] sweeps the whole document into category sets
/// 2. **Generation**: a [`CompletionGenerator`] maps every category string to an item
///
/// Ranking and prefix filtering are left to the editor.
///
/// # Example
///
/// ```
/// use rpl_completion::engine::{CompletionEngine, RplCompletionEngine};
/// use rpl_completion::types::Position;
///
/// # tokio_test::block_on(async {
/// let engine = RplCompletionEngine::default();
/// let items = engine
///     .generate_completions("let $x = 1;", Position::new(0, 0))
///     .await
///     .unwrap();
/// assert!(items.iter().any(|i| i.label == "x"));
/// # });
/// ```
use crate::config::CompletionSettings;
use crate::generator::{CompletionGenerator, RplCompletionGenerator};
use crate::parser::RplParser;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Main completion engine trait
///
/// Async so hosts can drive it from their request loop; implementations may
/// ignore the cursor position.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Generate completion suggestions for `code`
    ///
    /// # Errors
    ///
    /// The RPL engine never fails; the `Result` leaves room for engines that
    /// talk to external services.
    async fn generate_completions(
        &self,
        code: &str,
        position: Position,
    ) -> CompletionResult<Vec<CompletionItem>>;

    /// Resolve additional details for a completion item
    async fn resolve_completion(&self, item: &CompletionItem) -> CompletionResult<CompletionItem>;
}

/// Engine combining the naive parser with a completion generator
pub struct RplCompletionEngine {
    parser: RplParser,
    generator: Arc<dyn CompletionGenerator>,
}

impl RplCompletionEngine {
    /// Create a new completion engine
    pub fn new(parser: RplParser, generator: Arc<dyn CompletionGenerator>) -> Self {
        Self { parser, generator }
    }

    /// Build an engine from completion settings
    pub fn from_settings(settings: &CompletionSettings) -> Self {
        Self::new(
            RplParser::with_mode(settings.vocabulary_mode),
            Arc::new(RplCompletionGenerator::new().with_snippets(settings.snippets)),
        )
    }

    /// The parser used for extraction
    pub fn parser(&self) -> &RplParser {
        &self.parser
    }
}

impl Default for RplCompletionEngine {
    fn default() -> Self {
        Self::from_settings(&CompletionSettings::default())
    }
}

#[async_trait]
impl CompletionEngine for RplCompletionEngine {
    async fn generate_completions(
        &self,
        code: &str,
        position: Position,
    ) -> CompletionResult<Vec<CompletionItem>> {
        let extracted = self.parser.parse(code);
        let items = self.generator.generate(&extracted);

        debug!(
            line = position.line,
            character = position.character,
            count = items.len(),
            "Generated RPL completions"
        );

        Ok(items)
    }

    async fn resolve_completion(&self, item: &CompletionItem) -> CompletionResult<CompletionItem> {
        Ok(item.clone())
    }
}
