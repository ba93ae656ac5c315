//! Document formatting for RPL
//!
//! The default formatter is the identity transform. The external mode hands the
//! body of every `patt { .. }`, `util { .. }` and `import { .. }` block to an
//! [`ExternalFormatter`] and stitches the document back together; everything
//! outside those blocks is copied verbatim.

use std::io::Write;
use std::process::Stdio;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FormatterSettings;
use crate::types::{CompletionError, CompletionResult};
use crate::vocabulary::BLOCK_KEYWORDS;

/// Formatting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    /// Output equals input
    #[default]
    Identity,
    /// Delegate block bodies to an external formatter
    External,
}

/// A keyword block located in a document (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Start of the opening keyword
    pub keyword_start: usize,
    /// First byte after the opening `{`
    pub body_start: usize,
    /// Offset of the matching closing `}`
    pub body_end: usize,
}

impl Block {
    /// First byte after the closing `}`
    pub fn end(&self) -> usize {
        self.body_end + 1
    }
}

fn block_start_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        let keywords = BLOCK_KEYWORDS.join("|");
        Regex::new(&format!(r"\b(?:{})\s*\{{", keywords)).expect("Invalid regex")
    })
}

/// Find the next keyword block at or after byte offset `from`
///
/// Returns `None` when no block keyword is followed by `{`, or when the braces
/// opened by the first such keyword never balance.
pub fn find_block(text: &str, from: usize) -> Option<Block> {
    if from > text.len() || !text.is_char_boundary(from) {
        return None;
    }

    let start = block_start_regex().find_at(text, from)?;
    let body_start = start.end();

    let mut depth = 1usize;
    for (offset, byte) in text.as_bytes()[body_start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(Block {
                        keyword_start: start.start(),
                        body_start,
                        body_end: body_start + offset,
                    });
                }
            }
            _ => {}
        }
    }

    None
}

/// Capability to format a fragment of host-language code
#[async_trait]
pub trait ExternalFormatter: Send + Sync {
    /// Format `code`, returning the new text
    async fn format_code(&self, code: &str) -> CompletionResult<String>;
}

/// Runs a formatter executable on a temporary file
///
/// The fragment is written to a temporary file, the command is run with the
/// file path as its last argument, and the file is read back. The temporary
/// file is removed when the call returns, on success and on error alike.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandFormatter {
    /// Create a formatter running `command` with `args`
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: Duration::from_secs(10),
        }
    }

    /// Build from formatter settings
    pub fn from_settings(settings: &FormatterSettings) -> Self {
        Self::new(settings.command.clone(), settings.args.clone())
            .with_timeout(Duration::from_secs(settings.timeout_secs))
    }

    /// Set the maximum run time of the command
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn write_temp_file(code: &str) -> CompletionResult<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("rpl-fmt-")
            .suffix(".rs")
            .tempfile()?;
        file.write_all(code.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

#[async_trait]
impl ExternalFormatter for CommandFormatter {
    async fn format_code(&self, code: &str) -> CompletionResult<String> {
        let file = Self::write_temp_file(code)?;

        debug!(
            command = %self.command,
            path = %file.path().display(),
            "Running external formatter"
        );

        let output = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| CompletionError::Timeout {
                limit: self.timeout,
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompletionError::FormatterError(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let formatted = tokio::fs::read_to_string(file.path()).await?;
        Ok(formatted)
    }
}

/// RPL document formatter
#[derive(Clone, Default)]
pub struct RplFormatter {
    external: Option<Arc<dyn ExternalFormatter>>,
}

impl RplFormatter {
    /// Identity formatter
    pub fn new() -> Self {
        Self { external: None }
    }

    /// Block-delegating formatter backed by `external`
    pub fn with_external(external: Arc<dyn ExternalFormatter>) -> Self {
        Self {
            external: Some(external),
        }
    }

    /// Build from formatter settings
    pub fn from_settings(settings: &FormatterSettings) -> Self {
        match settings.mode {
            FormatMode::Identity => Self::new(),
            FormatMode::External => {
                Self::with_external(Arc::new(CommandFormatter::from_settings(settings)))
            }
        }
    }

    /// Active formatting strategy
    pub fn mode(&self) -> FormatMode {
        if self.external.is_some() {
            FormatMode::External
        } else {
            FormatMode::Identity
        }
    }

    /// Format `text`, reporting external formatter failures
    pub async fn try_format(&self, text: &str) -> CompletionResult<String> {
        let Some(external) = &self.external else {
            return Ok(text.to_string());
        };

        let mut formatted = String::with_capacity(text.len());
        let mut cursor = 0;

        while let Some(block) = find_block(text, cursor) {
            formatted.push_str(&text[cursor..block.body_start]);
            let body = &text[block.body_start..block.body_end];
            formatted.push_str(&external.format_code(body).await?);
            // The closing brace is copied with the next verbatim segment
            cursor = block.body_end;
        }

        formatted.push_str(&text[cursor..]);
        Ok(formatted)
    }

    /// Format `text`; on failure the input is returned unchanged
    pub async fn format(&self, text: &str) -> String {
        match self.try_format(text).await {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!("RPL formatting failed, leaving document unchanged: {}", e);
                text.to_string()
            }
        }
    }
}

impl std::fmt::Debug for RplFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RplFormatter")
            .field("mode", &self.mode())
            .finish()
    }
}
