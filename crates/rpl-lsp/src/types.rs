//! Core LSP types
//!
//! Error type, lifecycle state and document coordinates used by the server.

use serde::{Deserialize, Serialize};

/// Result type for LSP operations
pub type LspResult<T> = Result<T, LspError>;

/// LSP-specific error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LspError {
    /// Malformed JSON or message body
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Request not valid in the current state or shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Method not found
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LspError {
    /// JSON-RPC error code reported to the client
    pub fn code(&self) -> i32 {
        match self {
            LspError::ParseError(_) => -32700,
            LspError::InvalidRequest(_) => -32600,
            LspError::MethodNotFound(_) => -32601,
            LspError::InvalidParams(_) => -32602,
            LspError::InternalError(_) | LspError::IoError(_) | LspError::SerializationError(_) => {
                -32603
            }
        }
    }
}

/// Server lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for `initialize` / `initialized`
    Initializing,
    /// Serving requests
    Initialized,
    /// `shutdown` received, waiting for `exit`
    ShuttingDown,
    /// `exit` received
    ShutDown,
}

/// Position in a document (line and UTF-16 character offset)
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

    /// Position just past the last character of `text`
    ///
    /// `\n`, `\r\n` and a lone `\r` each end a line.
    pub fn end_of(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line = 0u32;
        let mut line_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line += 1;
                    line_start = i + 1;
                }
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line += 1;
                    line_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }

        let character = text[line_start..].encode_utf16().count() as u32;
        Self { line, character }
    }
}

impl From<Position> for rpl_completion::Position {
    fn from(position: Position) -> Self {
        rpl_completion::Position::new(position.line, position.character)
    }
}

/// Range in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering the whole of `text`
    pub fn whole(text: &str) -> Self {
        Self::new(Position::default(), Position::end_of(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_empty() {
        assert_eq!(Position::end_of(""), Position::new(0, 0));
    }

    #[test]
    fn test_end_of_multiline() {
        assert_eq!(Position::end_of("ab\ncd\nxyz"), Position::new(2, 3));
        assert_eq!(Position::end_of("ab\n"), Position::new(1, 0));
    }

    #[test]
    fn test_end_of_carriage_returns() {
        assert_eq!(Position::end_of("ab\rcd"), Position::new(1, 2));
        assert_eq!(Position::end_of("ab\r\ncd"), Position::new(1, 2));
        assert_eq!(Position::end_of("a\r\r\n\nb"), Position::new(3, 1));
        assert_eq!(Position::end_of("x\r"), Position::new(1, 0));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LspError::ParseError("x".into()).code(), -32700);
        assert_eq!(LspError::SerializationError("x".into()).code(), -32603);
    }

    #[test]
    fn test_end_of_counts_utf16_units() {
        // U+1F600 is two UTF-16 code units
        assert_eq!(Position::end_of("a\u{1F600}"), Position::new(0, 3));
    }

    #[test]
    fn test_range_serialization() {
        let range = Range::whole("x\ny");
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["end"]["line"], 1);
        assert_eq!(json["end"]["character"], 1);
    }
}
