//! JSON-RPC message transport
//!
//! Message framing with `Content-Length` headers and JSON-RPC message parsing
//! and serialization. The transport is generic over any async byte stream;
//! the server binary uses stdin/stdout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::types::{LspError, LspResult};

const JSONRPC_VERSION: &str = "2.0";

/// Largest message body the transport will buffer (64 MiB)
pub const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

const CONTENT_LENGTH: &str = "content-length:";

/// Client to server request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: Value, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Reply to a request, carrying either a result or an error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Error member of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl From<LspError> for JsonRpcError {
    fn from(err: LspError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Message without an id; never answered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Any message exchanged over the transport
#[derive(Debug, Clone)]
pub enum LspMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Notification(JsonRpcNotification),
}

impl LspMessage {
    /// Decode one message body
    ///
    /// Objects with `result` or `error` are responses, objects with both `id`
    /// and `method` are requests, and objects with only `method` are
    /// notifications.
    pub fn from_json(json: &str) -> LspResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| LspError::ParseError(format!("Failed to parse JSON: {}", e)))?;

        let is_response = value.get("result").is_some() || value.get("error").is_some();
        let has_id = value.get("id").is_some();
        let has_method = value.get("method").is_some();

        let decoded = match (is_response, has_id, has_method) {
            (true, _, _) => serde_json::from_value(value).map(LspMessage::Response),
            (false, true, true) => serde_json::from_value(value).map(LspMessage::Request),
            (false, false, true) => serde_json::from_value(value).map(LspMessage::Notification),
            _ => {
                return Err(LspError::InvalidRequest(
                    "Message is neither a request, a response nor a notification".to_string(),
                ))
            }
        };

        decoded.map_err(|e| LspError::ParseError(format!("Malformed message: {}", e)))
    }

    /// Encode the message body
    pub fn to_json(&self) -> LspResult<String> {
        match self {
            LspMessage::Request(req) => serde_json::to_string(req),
            LspMessage::Response(resp) => serde_json::to_string(resp),
            LspMessage::Notification(notif) => serde_json::to_string(notif),
        }
        .map_err(|e| LspError::SerializationError(format!("Failed to serialize message: {}", e)))
    }
}

/// `Content-Length` framed transport over an async reader and writer
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

/// Transport bound to the process's stdin and stdout
pub type StdioTransport = Transport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Create a stdio transport
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a transport over the given streams
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next message
    ///
    /// Returns `Ok(None)` once the input stream is closed. A `Content-Length`
    /// header preceded by stray bytes on its line (the unread body of a
    /// rejected message) starts a fresh header block, so one bad frame costs
    /// at most that frame.
    pub async fn read_message(&mut self) -> LspResult<Option<LspMessage>> {
        let mut headers = HashMap::new();
        let mut saw_header = false;

        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .await
                .map_err(|e| LspError::IoError(format!("Failed to read header: {}", e)))?;

            if read == 0 {
                if saw_header {
                    warn!("Input closed inside a message header");
                }
                return Ok(None);
            }

            let mut line = line.trim();
            if line.is_empty() {
                if saw_header {
                    break;
                }
                // Tolerate blank lines between messages
                continue;
            }

            if let Some(offset) = line.to_ascii_lowercase().find(CONTENT_LENGTH) {
                if offset > 0 {
                    warn!("Discarding {} stray bytes before header", offset);
                    headers.clear();
                    line = &line[offset..];
                }
            }

            saw_header = true;
            if let Some((key, value)) = line.split_once(':') {
                headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let content_length: usize = headers
            .get("content-length")
            .ok_or_else(|| LspError::InvalidRequest("Missing Content-Length header".to_string()))?
            .parse()
            .map_err(|e| LspError::InvalidRequest(format!("Invalid Content-Length: {}", e)))?;

        if content_length > MAX_CONTENT_LENGTH {
            return Err(LspError::InvalidRequest(format!(
                "Content-Length {} exceeds the {} byte limit",
                content_length, MAX_CONTENT_LENGTH
            )));
        }

        let mut content = vec![0u8; content_length];
        self.reader
            .read_exact(&mut content)
            .await
            .map_err(|e| LspError::IoError(format!("Failed to read content: {}", e)))?;

        let json = String::from_utf8(content)
            .map_err(|e| LspError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        LspMessage::from_json(&json).map(Some)
    }

    /// Write a message
    pub async fn write_message(&mut self, message: &LspMessage) -> LspResult<()> {
        let json = message.to_json()?;

        self.writer
            .write_all(frame(&json).as_bytes())
            .await
            .map_err(|e| LspError::IoError(format!("Failed to write message: {}", e)))?;

        self.writer
            .flush()
            .await
            .map_err(|e| LspError::IoError(format!("Failed to flush output: {}", e)))?;

        Ok(())
    }

    /// Consume the transport, returning the underlying streams
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Frame a message body with its `Content-Length` header
pub fn frame(json: &str) -> String {
    format!("Content-Length: {}\r\n\r\n{}", json.len(), json)
}
