//! Concrete input entries produced from user path arguments.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// The path token that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// One concrete input to the apply pipeline.
///
/// An entry is *explicit* when the user named it on the command line and
/// *expanded* when it was found by walking a directory the user named.
/// Expanded entries are never standard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileArg {
    path: String,
    expanded: bool,
}

impl FileArg {
    /// Creates an entry for a path the user named explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFileArg`] if `path` is empty.
    pub fn explicit(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(Error::InvalidFileArg {
                reason: "path cannot be empty".to_string(),
            });
        }
        Ok(Self {
            path,
            expanded: false,
        })
    }

    /// Creates an entry found through directory expansion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFileArg`] if `path` is empty or is the stdin token.
    pub fn expanded(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() || path == STDIN_PATH {
            return Err(Error::InvalidFileArg {
                reason: format!("'{path}' cannot come from directory expansion"),
            });
        }
        Ok(Self {
            path,
            expanded: true,
        })
    }

    /// Returns the entry for standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self {
            path: STDIN_PATH.to_string(),
            expanded: false,
        }
    }

    /// The path as given (or as found during the walk).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path as a filesystem path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// True if this entry came from directory expansion.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// True if this entry stands for standard input.
    #[must_use]
    pub fn is_stdin(&self) -> bool {
        self.path == STDIN_PATH
    }
}

impl fmt::Display for FileArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_stdin() {
            f.write_str("<stdin>")
        } else {
            f.write_str(&self.path)
        }
    }
}
