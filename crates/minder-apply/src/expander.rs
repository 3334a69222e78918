//! Path expansion.
//!
//! Turns the user's path arguments into an ordered list of [`FileArg`]s.
//! Files named directly become explicit entries, directories are walked
//! depth-first with entries sorted by file name, and every regular file
//! found becomes an expanded entry. Symbolic links inside a walked
//! directory are not followed and are not yielded.
//!
//! All argument checks run before the filesystem is touched.

use std::fs;

use minder_core::{FileArg, STDIN_PATH};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ApplyError, Result};

/// Expands user path arguments into concrete inputs.
#[derive(Debug, Clone, Copy)]
pub struct PathExpander {
    allow_stdin: bool,
}

impl Default for PathExpander {
    fn default() -> Self {
        Self { allow_stdin: true }
    }
}

impl PathExpander {
    /// Creates an expander that accepts `-` for standard input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether `-` is accepted.
    #[must_use]
    pub const fn with_stdin(mut self, allow: bool) -> Self {
        self.allow_stdin = allow;
        self
    }

    /// Expands `paths` in order.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::InvalidArguments`] for an empty list, an empty
    /// path, or `-` that is disallowed or not the only argument. Returns
    /// [`ApplyError::Io`] or [`ApplyError::Walk`] if a path cannot be read.
    pub fn expand<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<FileArg>> {
        self.validate(paths)?;

        let mut args = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if path == STDIN_PATH {
                args.push(FileArg::stdin());
                continue;
            }

            let metadata = fs::metadata(path).map_err(|source| ApplyError::Io {
                path: path.to_string(),
                source,
            })?;

            if metadata.is_dir() {
                let before = args.len();
                expand_directory(path, &mut args)?;
                debug!(path, files = args.len() - before, "expanded directory");
            } else {
                args.push(explicit(path)?);
            }
        }

        Ok(args)
    }

    fn validate<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        if paths.is_empty() {
            return Err(ApplyError::invalid_arguments("no files specified"));
        }

        if paths.iter().any(|p| p.as_ref().is_empty()) {
            return Err(ApplyError::invalid_arguments("file path cannot be empty"));
        }

        if paths.iter().any(|p| p.as_ref() == STDIN_PATH) {
            if !self.allow_stdin {
                return Err(ApplyError::invalid_arguments(
                    "reading from standard input is not allowed here",
                ));
            }
            if paths.len() > 1 {
                return Err(ApplyError::invalid_arguments(
                    "'-' cannot be combined with other file arguments",
                ));
            }
        }

        Ok(())
    }
}

fn explicit(path: &str) -> Result<FileArg> {
    FileArg::explicit(path).map_err(|e| ApplyError::invalid_arguments(e.to_string()))
}

fn expand_directory(root: &str, args: &mut Vec<FileArg>) -> Result<()> {
    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| ApplyError::Walk {
            path: root.to_string(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path().to_string_lossy().into_owned();
        let arg =
            FileArg::expanded(path).map_err(|e| ApplyError::invalid_arguments(e.to_string()))?;
        args.push(arg);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "type: profile\nname: x\n").unwrap();
    }

    fn paths(args: &[FileArg]) -> Vec<String> {
        args.iter().map(|a| a.path().to_string()).collect()
    }

    #[test]
    fn test_rejects_empty_list() {
        let err = PathExpander::new().expand::<&str>(&[]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ArgumentValidation);
    }

    #[test]
    fn test_rejects_empty_path() {
        let err = PathExpander::new().expand(&[""]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ArgumentValidation);
    }

    #[test]
    fn test_stdin_alone() {
        let args = PathExpander::new().expand(&["-"]).unwrap();
        assert_eq!(args, vec![FileArg::stdin()]);
    }

    #[test]
    fn test_stdin_mixed_is_rejected_before_io() {
        // The other path does not exist; validation must fail first.
        let err = PathExpander::new()
            .expand(&["-", "/definitely/not/here.yaml"])
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ArgumentValidation);

        let err = PathExpander::new().expand(&["a.yaml", "-"]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ArgumentValidation);
    }

    #[test]
    fn test_stdin_disallowed() {
        let err = PathExpander::new()
            .with_stdin(false)
            .expand(&["-"])
            .unwrap_err();
        assert!(err.to_string().contains("standard input"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.yaml");
        let err = PathExpander::new()
            .expand(&[missing.to_string_lossy()])
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_explicit_file_any_extension() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "policy.txt");
        let file = temp.path().join("policy.txt");

        let args = PathExpander::new().expand(&[file.to_string_lossy()]).unwrap();
        assert_eq!(args.len(), 1);
        assert!(!args[0].is_expanded());
    }

    #[test]
    fn test_directory_walk_is_sorted_and_recursive() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.yaml");
        touch(temp.path(), "a.yaml");
        touch(temp.path(), "sub/c.yaml");
        touch(temp.path(), "sub/0.json");
        fs::create_dir_all(temp.path().join("empty")).unwrap();

        let root = temp.path().to_string_lossy().into_owned();
        let args = PathExpander::new().expand(&[root.as_str()]).unwrap();

        let expected: Vec<String> = ["a.yaml", "b.yaml", "sub/0.json", "sub/c.yaml"]
            .iter()
            .map(|n| temp.path().join(n).to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths(&args), expected);
        assert!(args.iter().all(FileArg::is_expanded));
    }

    #[test]
    fn test_input_order_is_preserved_without_dedup() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "dir/x.yaml");
        touch(temp.path(), "z.yaml");

        let z = temp.path().join("z.yaml").to_string_lossy().into_owned();
        let dir = temp.path().join("dir").to_string_lossy().into_owned();
        let args = PathExpander::new()
            .expand(&[z.as_str(), dir.as_str(), z.as_str()])
            .unwrap();

        assert_eq!(args.len(), 3);
        assert!(!args[0].is_expanded());
        assert!(args[1].is_expanded());
        assert!(args[1].path().ends_with("x.yaml"));
        assert_eq!(args[2].path(), z);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "outside/secret.yaml");
        touch(temp.path(), "dir/real.yaml");
        std::os::unix::fs::symlink(
            temp.path().join("outside"),
            temp.path().join("dir/linked"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("dir/real.yaml"),
            temp.path().join("dir/alias.yaml"),
        )
        .unwrap();

        let dir = temp.path().join("dir").to_string_lossy().into_owned();
        let args = PathExpander::new().expand(&[dir.as_str()]).unwrap();

        assert_eq!(args.len(), 1);
        assert!(args[0].path().ends_with("real.yaml"));
    }
}
