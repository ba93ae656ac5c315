//! Core completion types
//!
//! Completion items, their kinds, cursor positions and the error type shared by
//! the parser, generator, engine and formatter.

use serde::{Deserialize, Serialize};

/// Result type for completion and formatting operations
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Errors raised by the completion crate
///
/// Extraction itself never fails; these cover configuration loading and the
/// external formatter path.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// External formatter failed or produced unusable output
    #[error("Formatter error: {0}")]
    FormatterError(String),

    /// External formatter did not finish in time
    #[error("Formatter timed out after {limit:?}")]
    Timeout { limit: std::time::Duration },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Position in a document (line and character, both 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    /// Create a new position
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Kind of a completion item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionItemKind {
    /// Language keyword
    Keyword,
    /// Function name
    Function,
    /// Metavariable
    Variable,
    /// Operator name
    Operator,
    /// Imported symbol
    Module,
    /// Pattern macro
    Macro,
    /// Template snippet
    Snippet,
}

/// How the editor should interpret `insert_text`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertTextFormat {
    /// Insert verbatim
    #[default]
    PlainText,
    /// Insert as a snippet with tab stops (`$1`, `${1:name}`, `$0`)
    Snippet,
}

/// A single completion suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionItem {
    /// Label shown in the completion list
    pub label: String,
    /// Item kind
    pub kind: CompletionItemKind,
    /// Text inserted on accept
    pub insert_text: String,
    /// Insert text interpretation
    #[serde(default)]
    pub insert_text_format: InsertTextFormat,
    /// Short detail shown next to the label (the category label)
    pub detail: Option<String>,
}

impl CompletionItem {
    /// Create a new plain-text completion item
    pub fn new(label: String, kind: CompletionItemKind, insert_text: String) -> Self {
        Self {
            label,
            kind,
            insert_text,
            insert_text_format: InsertTextFormat::PlainText,
            detail: None,
        }
    }

    /// Set the detail text
    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Mark the insert text as a snippet
    pub fn as_snippet(mut self) -> Self {
        self.insert_text_format = InsertTextFormat::Snippet;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_item_builder() {
        let item = CompletionItem::new(
            "patt".to_string(),
            CompletionItemKind::Keyword,
            "patt".to_string(),
        )
        .with_detail("RPL Keyword".to_string());

        assert_eq!(item.label, "patt");
        assert_eq!(item.detail.as_deref(), Some("RPL Keyword"));
        assert_eq!(item.insert_text_format, InsertTextFormat::PlainText);
    }

    #[test]
    fn test_snippet_format() {
        let item = CompletionItem::new(
            "fn".to_string(),
            CompletionItemKind::Snippet,
            "fn ${1:name}() {}".to_string(),
        )
        .as_snippet();
        assert_eq!(item.insert_text_format, InsertTextFormat::Snippet);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&CompletionItemKind::Macro).unwrap();
        assert_eq!(json, "\"macro\"");
    }

    #[test]
    fn test_error_display() {
        let err = CompletionError::Timeout {
            limit: std::time::Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "Formatter timed out after 3s");

        let err = CompletionError::Timeout {
            limit: std::time::Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Formatter timed out after 250ms");
    }
}
