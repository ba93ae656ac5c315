//! Completion item generation from extracted RPL categories
//!
//! Every extracted string becomes one item tagged with its category label.
//! The generator never filters by cursor prefix; the editor does that.

use crate::parser::ExtractionResult;
use crate::types::{CompletionItem, CompletionItemKind};

/// Category labels shown as item detail
pub const KEYWORD_DETAIL: &str = "RPL Keyword";
pub const FUNCTION_DETAIL: &str = "RPL Function";
pub const METAVARIABLE_DETAIL: &str = "RPL Metavariable";
pub const OPERATOR_DETAIL: &str = "RPL Operator";
pub const IMPORT_DETAIL: &str = "RPL Import";
pub const MACRO_DETAIL: &str = "RPL Macro";

/// Function declaration skeletons offered on every request
const FUNCTION_SNIPPETS: &[(&str, &str, &str)] = &[
    (
        "fn",
        "fn ${1:name}(${2:args}) -> ${3:Ret} {\n\t$0\n}",
        "Function declaration",
    ),
    (
        "pub fn",
        "pub fn ${1:name}(${2:args}) -> ${3:Ret} {\n\t$0\n}",
        "Public function declaration",
    ),
];

/// Turns extraction results into completion items
pub trait CompletionGenerator: Send + Sync {
    /// Produce items for every string of every category
    fn generate(&self, result: &ExtractionResult) -> Vec<CompletionItem>;
}

/// Default RPL generator
#[derive(Debug, Clone)]
pub struct RplCompletionGenerator {
    include_snippets: bool,
}

impl RplCompletionGenerator {
    /// Create a generator that also emits the function snippets
    pub fn new() -> Self {
        Self {
            include_snippets: true,
        }
    }

    /// Enable or disable the function snippets
    pub fn with_snippets(mut self, include_snippets: bool) -> Self {
        self.include_snippets = include_snippets;
        self
    }

    fn category_items<'a>(
        names: &'a [String],
        kind: CompletionItemKind,
        detail: &str,
    ) -> impl Iterator<Item = CompletionItem> + 'a {
        let detail = detail.to_string();
        names.iter().map(move |name| {
            CompletionItem::new(name.clone(), kind, name.clone()).with_detail(detail.clone())
        })
    }

    /// The fixed function declaration snippets
    pub fn snippet_items() -> Vec<CompletionItem> {
        FUNCTION_SNIPPETS
            .iter()
            .map(|(label, template, description)| {
                CompletionItem::new(
                    label.to_string(),
                    CompletionItemKind::Snippet,
                    template.to_string(),
                )
                .with_detail(description.to_string())
                .as_snippet()
            })
            .collect()
    }
}

impl Default for RplCompletionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionGenerator for RplCompletionGenerator {
    fn generate(&self, result: &ExtractionResult) -> Vec<CompletionItem> {
        let mut items = Vec::with_capacity(result.len() + FUNCTION_SNIPPETS.len());

        items.extend(Self::category_items(
            &result.keywords,
            CompletionItemKind::Keyword,
            KEYWORD_DETAIL,
        ));
        items.extend(Self::category_items(
            &result.functions,
            CompletionItemKind::Function,
            FUNCTION_DETAIL,
        ));
        items.extend(Self::category_items(
            &result.metavariables,
            CompletionItemKind::Variable,
            METAVARIABLE_DETAIL,
        ));
        items.extend(Self::category_items(
            &result.operators,
            CompletionItemKind::Operator,
            OPERATOR_DETAIL,
        ));
        items.extend(Self::category_items(
            &result.imports,
            CompletionItemKind::Module,
            IMPORT_DETAIL,
        ));
        items.extend(Self::category_items(
            &result.macros,
            CompletionItemKind::Macro,
            MACRO_DETAIL,
        ));

        if self.include_snippets {
            items.extend(Self::snippet_items());
        }

        items
    }
}
