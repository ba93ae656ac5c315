//! Language Server Protocol server for RPL
//!
//! Exposes RPL completion and formatting to any LSP-capable editor.
//!
//! # Architecture
//!
//! 1. **Transport**: `Content-Length` framed JSON-RPC over stdio
//! 2. **Server**: lifecycle state machine and open-document store
//! 3. **Completion**: every request re-runs category extraction over the full
//!    document text and returns one item per extracted string
//! 4. **Formatting**: one edit replacing the whole document with the formatter output
//!
//! The server holds no language logic of its own; everything RPL-specific lives
//! in `rpl-completion`.

pub mod completion;
pub mod formatting;
pub mod server;
pub mod transport;
pub mod types;

pub use completion::CompletionHandler;
pub use formatting::FormattingHandler;
pub use server::{LspServer, ServerCapabilities, FILE_EXTENSION, LANGUAGE_ID};
pub use transport::{LspMessage, StdioTransport, Transport};
pub use types::{LspError, LspResult, Position, Range, ServerState};
