//! Document formatting support for LSP
//!
//! The formatter always answers with a single edit replacing the whole document.

use rpl_completion::RplFormatter;
use serde_json::{json, Value};
use tracing::debug;

use crate::types::Range;

/// Formatting handler for LSP
#[derive(Debug, Clone, Default)]
pub struct FormattingHandler {
    formatter: RplFormatter,
}

impl FormattingHandler {
    /// Create a new formatting handler
    pub fn new(formatter: RplFormatter) -> Self {
        Self { formatter }
    }

    /// The underlying formatter
    pub fn formatter(&self) -> &RplFormatter {
        &self.formatter
    }

    /// Handle textDocument/formatting request
    pub async fn handle_formatting(&self, code: &str) -> Vec<Value> {
        debug!("Formatting RPL document ({} bytes)", code.len());
        let formatted = self.formatter.format(code).await;
        debug!("RPL formatting completed");

        vec![json!({
            "range": Range::whole(code),
            "newText": formatted,
        })]
    }
}
