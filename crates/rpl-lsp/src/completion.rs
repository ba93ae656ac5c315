/// Code completion support for LSP
///
/// Converts completion engine output to LSP `CompletionItem` JSON.
use crate::types::{LspError, LspResult, Position};
use rpl_completion::{CompletionEngine, CompletionItem, CompletionItemKind, InsertTextFormat};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// LSP numeric completion item kind
fn lsp_kind(kind: CompletionItemKind) -> u32 {
    match kind {
        CompletionItemKind::Function => 3,
        CompletionItemKind::Variable => 6,
        CompletionItemKind::Module => 9,
        CompletionItemKind::Keyword => 14,
        CompletionItemKind::Snippet => 15,
        CompletionItemKind::Operator => 24,
        // LSP has no macro kind; editors render macros as functions
        CompletionItemKind::Macro => 3,
    }
}

fn lsp_insert_text_format(format: InsertTextFormat) -> u32 {
    match format {
        InsertTextFormat::PlainText => 1,
        InsertTextFormat::Snippet => 2,
    }
}

/// Completion handler for LSP
pub struct CompletionHandler {
    engine: Arc<dyn CompletionEngine>,
}

impl CompletionHandler {
    /// Create a new completion handler
    pub fn new(engine: Arc<dyn CompletionEngine>) -> Self {
        Self { engine }
    }

    /// Handle textDocument/completion request
    pub async fn handle_completion(&self, code: &str, position: Position) -> LspResult<Vec<Value>> {
        debug!(
            "Handling completion request at line={}, character={}",
            position.line, position.character
        );

        let completions = self
            .engine
            .generate_completions(code, position.into())
            .await
            .map_err(|e| LspError::InternalError(format!("Completion generation failed: {}", e)))?;

        debug!("Generated {} completions", completions.len());

        Ok(completions.iter().map(Self::completion_item_to_json).collect())
    }

    /// Handle completionItem/resolve request
    ///
    /// Items are complete when first sent; resolving only validates them.
    pub async fn handle_completion_resolve(&self, item: &Value) -> LspResult<Value> {
        item.get("label")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LspError::InvalidParams("Missing label in completion item".to_string()))?;

        Ok(item.clone())
    }

    /// Convert a completion item to LSP JSON
    pub fn completion_item_to_json(item: &CompletionItem) -> Value {
        let mut json = json!({
            "label": item.label,
            "kind": lsp_kind(item.kind),
            "insertText": item.insert_text,
            "insertTextFormat": lsp_insert_text_format(item.insert_text_format),
        });

        if let Some(detail) = &item.detail {
            json["detail"] = json!(detail);
        }

        json
    }
}
