//! Document loading.
//!
//! Reads one input at a time and decodes it into a dynamic document tree.
//! Content whose first non-whitespace character is `{` or `[` is decoded as
//! JSON; everything else is decoded as YAML. A YAML stream with more than
//! one document is rejected.

use std::fs::File;
use std::io::Read;

use minder_core::FileArg;
use serde_json::Value;

use crate::error::{ApplyError, Result};

/// Reads and decodes inputs.
///
/// Standard input can be consumed once per loader.
pub struct DocumentLoader {
    stdin: Option<Box<dyn Read + Send>>,
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("stdin_available", &self.stdin.is_some())
            .finish()
    }
}

impl DocumentLoader {
    /// Creates a loader that reads `-` from the given reader.
    #[must_use]
    pub fn new(stdin: Box<dyn Read + Send>) -> Self {
        Self { stdin: Some(stdin) }
    }

    /// Creates a loader with no standard input.
    #[must_use]
    pub fn without_stdin() -> Self {
        Self { stdin: None }
    }

    /// Reads and decodes one input.
    ///
    /// The file is opened read-only and closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Io`] if the input cannot be read, and
    /// [`ApplyError::MalformedDocument`] if it cannot be decoded.
    pub fn load(&mut self, arg: &FileArg) -> Result<Value> {
        let bytes = self.read(arg)?;
        decode_document(arg.path(), &bytes)
    }

    fn read(&mut self, arg: &FileArg) -> Result<Vec<u8>> {
        let io_error = |source| ApplyError::Io {
            path: arg.path().to_string(),
            source,
        };

        let mut bytes = Vec::new();
        if arg.is_stdin() {
            let mut stdin = self.stdin.take().ok_or_else(|| {
                ApplyError::invalid_arguments("standard input is not available or was already read")
            })?;
            stdin.read_to_end(&mut bytes).map_err(io_error)?;
        } else {
            let mut file = File::open(arg.as_path()).map_err(io_error)?;
            file.read_to_end(&mut bytes).map_err(io_error)?;
        }
        Ok(bytes)
    }
}

/// Decodes raw bytes as JSON or YAML.
///
/// # Errors
///
/// Returns [`ApplyError::MalformedDocument`] for content that is not UTF-8
/// or does not parse.
pub fn decode_document(path: &str, bytes: &[u8]) -> Result<Value> {
    let malformed = |reason: String| ApplyError::MalformedDocument {
        path: path.to_string(),
        reason,
    };

    let text = std::str::from_utf8(bytes)
        .map_err(|e| malformed(format!("content is not valid UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if looks_like_json(text) {
        serde_json::from_str(text).map_err(|e| malformed(format!("invalid JSON: {e}")))
    } else {
        serde_yaml::from_str(text).map_err(|e| malformed(format!("invalid YAML: {e}")))
    }
}

fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{' | '['))
}
