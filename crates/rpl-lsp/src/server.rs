//! LSP Server implementation
//!
//! Handles initialization and shutdown, keeps the text of open documents, and
//! routes completion and formatting requests to the RPL engine.

use std::{collections::HashMap, sync::Arc};

use rpl_completion::{trigger_characters, CompletionEngine, RplCompletionEngine, RplConfig, RplFormatter};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::{
    completion::CompletionHandler,
    formatting::FormattingHandler,
    transport::{JsonRpcError, JsonRpcResponse, LspMessage, StdioTransport, Transport},
    types::{LspError, LspResult, Position, ServerState},
};

/// Language identifier editors use for RPL documents
pub const LANGUAGE_ID: &str = "rpl";

/// File extension of RPL documents
pub const FILE_EXTENSION: &str = "rpl";

/// Server capabilities
#[derive(Debug, Clone)]
pub struct ServerCapabilities {
    /// Text document sync kind (1 = full)
    pub text_document_sync: u32,
    pub completion_provider: bool,
    pub document_formatting_provider: bool,
    /// Characters that trigger completion
    pub trigger_characters: Vec<char>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            text_document_sync: 1,
            completion_provider: true,
            document_formatting_provider: true,
            trigger_characters: trigger_characters(),
        }
    }
}

impl ServerCapabilities {
    /// Convert to JSON
    pub fn to_json(&self) -> Value {
        let mut caps = json!({
            "textDocumentSync": self.text_document_sync,
            "documentFormattingProvider": self.document_formatting_provider,
        });

        if self.completion_provider {
            let triggers: Vec<String> = self.trigger_characters.iter().map(|c| c.to_string()).collect();
            caps["completionProvider"] = json!({
                "resolveProvider": true,
                "triggerCharacters": triggers,
            });
        }

        caps
    }
}

/// LSP Server
pub struct LspServer {
    state: ServerState,
    capabilities: ServerCapabilities,
    /// Raw client capabilities from `initialize`
    client_capabilities: Option<Value>,
    /// Open documents (URI -> content)
    documents: HashMap<String, String>,
    completion_handler: CompletionHandler,
    formatting_handler: FormattingHandler,
    /// Set when `shutdown` was received before `exit`
    shutdown_requested: bool,
}

impl LspServer {
    /// Create a server with the default configuration
    pub fn new() -> Self {
        Self::with_config(&RplConfig::default())
    }

    /// Create a server from configuration
    pub fn with_config(config: &RplConfig) -> Self {
        Self::with_components(
            Arc::new(RplCompletionEngine::from_settings(&config.completion)),
            RplFormatter::from_settings(&config.formatter),
        )
    }

    /// Create a server from an explicit engine and formatter
    pub fn with_components(engine: Arc<dyn CompletionEngine>, formatter: RplFormatter) -> Self {
        Self {
            state: ServerState::Initializing,
            capabilities: ServerCapabilities::default(),
            client_capabilities: None,
            documents: HashMap::new(),
            completion_handler: CompletionHandler::new(engine),
            formatting_handler: FormattingHandler::new(formatter),
            shutdown_requested: false,
        }
    }

    /// Get the current server state
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Get server capabilities
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    /// Get client capabilities
    pub fn client_capabilities(&self) -> Option<&Value> {
        self.client_capabilities.as_ref()
    }

    /// Whether `shutdown` preceded `exit`
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Get a document by URI
    pub fn get_document(&self, uri: &str) -> Option<&str> {
        self.documents.get(uri).map(|s| s.as_str())
    }

    /// Set a document
    pub fn set_document(&mut self, uri: String, content: String) {
        self.documents.insert(uri, content);
    }

    /// Remove a document
    pub fn remove_document(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    fn ensure_initialized(&self) -> LspResult<()> {
        if self.state != ServerState::Initialized {
            return Err(LspError::InvalidRequest(
                "Server is not initialized".to_string(),
            ));
        }
        Ok(())
    }

    fn text_document_uri(params: &Value) -> LspResult<&str> {
        params
            .get("textDocument")
            .ok_or_else(|| LspError::InvalidParams("Missing textDocument".to_string()))?
            .get("uri")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LspError::InvalidParams("Missing uri".to_string()))
    }

    fn position(params: &Value) -> LspResult<Position> {
        let position = params
            .get("position")
            .ok_or_else(|| LspError::InvalidParams("Missing position".to_string()))?;

        let coordinate = |name: &str| -> LspResult<u32> {
            let value = position
                .get(name)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| LspError::InvalidParams(format!("Missing {}", name)))?;
            u32::try_from(value)
                .map_err(|_| LspError::InvalidParams(format!("{} out of range: {}", name, value)))
        };

        Ok(Position::new(coordinate("line")?, coordinate("character")?))
    }

    fn document(&self, uri: &str) -> LspResult<&str> {
        self.get_document(uri)
            .ok_or_else(|| LspError::InvalidParams(format!("Document not found: {}", uri)))
    }

    /// Handle initialize request
    pub async fn handle_initialize(&mut self, params: Value) -> LspResult<Value> {
        if self.state != ServerState::Initializing {
            return Err(LspError::InvalidRequest(
                "Server is not in initializing state".to_string(),
            ));
        }

        info!("Initializing RPL language server");

        if let Some(capabilities) = params.get("capabilities") {
            self.client_capabilities = Some(capabilities.clone());
            debug!("Client capabilities received");
        }

        Ok(json!({
            "capabilities": self.capabilities.to_json(),
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "languageId": LANGUAGE_ID,
                "fileExtensions": [FILE_EXTENSION],
            }
        }))
    }

    /// Handle initialized notification
    pub async fn handle_initialized(&mut self) -> LspResult<()> {
        if self.state != ServerState::Initializing {
            return Err(LspError::InvalidRequest(
                "Server is not in initializing state".to_string(),
            ));
        }

        self.state = ServerState::Initialized;
        info!("RPL language server is now active");
        Ok(())
    }

    /// Handle shutdown request
    pub async fn handle_shutdown(&mut self) -> LspResult<Value> {
        self.ensure_initialized()?;

        info!("Shutdown request received");
        self.state = ServerState::ShuttingDown;
        self.shutdown_requested = true;
        Ok(json!(null))
    }

    /// Handle exit notification
    ///
    /// Always stops the server; an exit without a prior shutdown is logged.
    pub async fn handle_exit(&mut self) -> LspResult<()> {
        if self.state != ServerState::ShuttingDown {
            warn!("Exit received without shutdown (state: {:?})", self.state);
        }

        info!("Exit notification received");
        self.state = ServerState::ShutDown;
        Ok(())
    }

    /// Handle didOpen notification
    pub async fn handle_did_open(&mut self, params: Value) -> LspResult<()> {
        self.ensure_initialized()?;

        let uri = Self::text_document_uri(&params)?;
        let text = params
            .get("textDocument")
            .and_then(|doc| doc.get("text"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| LspError::InvalidParams("Missing text".to_string()))?;

        debug!("Document opened: uri={}, size={} bytes", uri, text.len());
        self.set_document(uri.to_string(), text.to_string());
        Ok(())
    }

    /// Handle didChange notification (full document sync)
    pub async fn handle_did_change(&mut self, params: Value) -> LspResult<()> {
        self.ensure_initialized()?;

        let uri = Self::text_document_uri(&params)?.to_string();
        let content_changes = params
            .get("contentChanges")
            .and_then(|v| v.as_array())
            .ok_or_else(|| LspError::InvalidParams("Missing contentChanges".to_string()))?;

        if let Some(text) = content_changes
            .last()
            .and_then(|change| change.get("text"))
            .and_then(|v| v.as_str())
        {
            debug!("Document changed: uri={}, size={} bytes", uri, text.len());
            self.set_document(uri, text.to_string());
        }

        Ok(())
    }

    /// Handle didClose notification
    pub async fn handle_did_close(&mut self, params: Value) -> LspResult<()> {
        self.ensure_initialized()?;

        let uri = Self::text_document_uri(&params)?.to_string();
        debug!("Document closed: uri={}", uri);
        self.remove_document(&uri);
        Ok(())
    }

    /// Handle completion request
    pub async fn handle_completion(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let uri = Self::text_document_uri(&params)?;
        let position = Self::position(&params)?;
        let code = self.document(uri)?;

        let items = self
            .completion_handler
            .handle_completion(code, position)
            .await?;

        Ok(json!(items))
    }

    /// Handle completionItem/resolve request
    pub async fn handle_completion_resolve(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;
        self.completion_handler
            .handle_completion_resolve(&params)
            .await
    }

    /// Handle textDocument/formatting request
    pub async fn handle_formatting(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let uri = Self::text_document_uri(&params)?;
        let code = self.document(uri)?;

        info!("Formatting RPL document: {}", uri);
        let edits = self.formatting_handler.handle_formatting(code).await;
        Ok(json!(edits))
    }

    /// Process a message, returning the result for requests
    pub async fn process_message(&mut self, message: LspMessage) -> LspResult<Option<Value>> {
        match message {
            LspMessage::Request(req) => {
                let params = req.params.unwrap_or(json!({}));
                match req.method.as_str() {
                    "initialize" => self.handle_initialize(params).await,
                    "shutdown" => self.handle_shutdown().await,
                    "textDocument/completion" => self.handle_completion(params).await,
                    "completionItem/resolve" => self.handle_completion_resolve(params).await,
                    "textDocument/formatting" => self.handle_formatting(params).await,
                    _ => Err(LspError::MethodNotFound(req.method)),
                }
                .map(Some)
            }
            LspMessage::Notification(notif) => {
                let params = notif.params.unwrap_or(json!({}));
                match notif.method.as_str() {
                    "initialized" => self.handle_initialized().await,
                    "textDocument/didOpen" => self.handle_did_open(params).await,
                    "textDocument/didChange" => self.handle_did_change(params).await,
                    "textDocument/didClose" => self.handle_did_close(params).await,
                    "exit" => self.handle_exit().await,
                    _ => {
                        debug!("Ignoring notification: {}", notif.method);
                        Ok(())
                    }
                }
                .map(|_| None)
            }
            LspMessage::Response(_) => Ok(None),
        }
    }

    /// Run the server on stdin/stdout
    pub async fn run_stdio(&mut self) -> LspResult<()> {
        let mut transport = StdioTransport::stdio();
        self.run(&mut transport).await
    }

    /// Run the server until `exit` or end of input
    pub async fn run<R, W>(&mut self, transport: &mut Transport<R, W>) -> LspResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("RPL language server started");

        loop {
            let message = match transport.read_message().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("Input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read message: {}", e);
                    if matches!(e, LspError::IoError(_)) {
                        return Err(e);
                    }
                    continue;
                }
            };

            let request_id = match &message {
                LspMessage::Request(req) => {
                    debug!("Received request: method={}, id={:?}", req.method, req.id);
                    Some(req.id.clone())
                }
                LspMessage::Notification(notif) => {
                    debug!("Received notification: method={}", notif.method);
                    None
                }
                LspMessage::Response(_) => {
                    debug!("Received response");
                    None
                }
            };

            let outcome = self.process_message(message).await;

            let response = match (request_id, outcome) {
                (Some(id), Ok(result)) => {
                    Some(JsonRpcResponse::success(id, result.unwrap_or(Value::Null)))
                }
                (Some(id), Err(err)) => {
                    warn!("Error processing request: {}", err);
                    Some(JsonRpcResponse::error(id, JsonRpcError::from(err)))
                }
                (None, Err(err)) => {
                    warn!("Error processing notification: {}", err);
                    None
                }
                (None, Ok(_)) => None,
            };

            if let Some(response) = response {
                if let Err(e) = transport.write_message(&LspMessage::Response(response)).await {
                    error!("Failed to send response: {}", e);
                }
            }

            if self.state == ServerState::ShutDown {
                info!("RPL language server shutting down");
                break;
            }
        }

        info!("RPL language server stopped");
        Ok(())
    }
}

impl Default for LspServer {
    fn default() -> Self {
        Self::new()
    }
}
