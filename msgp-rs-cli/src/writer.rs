//! File writer for generated codecs.
//!
//! Writes generated Rust files to disk, with support for dry-run mode and
//! for checking whether files on disk are current.

use std::path::{Path, PathBuf};

use crate::error::{CliResult, WriteError};

/// Result of a write operation.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// File already had the generated content and was left alone.
    Unchanged {
        /// Path to the file.
        path: PathBuf,
    },
    /// Dry run - content was not written.
    DryRun {
        /// Content that would have been written.
        content: String,
        /// Path where content would have been written.
        path: PathBuf,
    },
}

/// Freshness of a generated file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Content matches.
    UpToDate,
    /// File exists with different content.
    Stale,
    /// File does not exist.
    Missing,
}

/// File writer with dry-run support.
#[derive(Debug)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    /// Create a new file writer.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Write content to a file.
    ///
    /// In dry-run mode, returns the content without writing. A file whose
    /// content already matches is not rewritten, so its modification time
    /// does not trigger rebuilds.
    pub fn write(&self, path: &Path, content: &str) -> CliResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path: path.to_path_buf(),
            });
        }

        if Self::status(path, content) == FileStatus::UpToDate {
            tracing::debug!(path = %path.display(), "unchanged");
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| WriteError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");

        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }

    /// Compare a file on disk with freshly generated content.
    pub fn status(path: &Path, content: &str) -> FileStatus {
        match std::fs::read_to_string(path) {
            Ok(existing) if existing == content => FileStatus::UpToDate,
            Ok(_) => FileStatus::Stale,
            Err(_) => FileStatus::Missing,
        }
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl WriteResult {
    /// Get the path associated with this result.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::Unchanged { path }
            | WriteResult::DryRun { path, .. } => path,
        }
    }

    /// Check if the file was written.
    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }

    /// Get the number of bytes written (0 unless written).
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } => *bytes,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTENT: &str = "// Code generated by msgp-rs-gen. DO NOT EDIT.\n";

    #[test]
    fn test_write_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codecs.rs");

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert!(result.was_written());
        assert_eq!(result.bytes(), CONTENT.len());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONTENT);
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/codecs.rs");

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert!(matches!(result, WriteResult::Written { .. }));
        assert!(path.exists());
    }

    #[test]
    fn test_write_same_content_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codecs.rs");
        let writer = FileWriter::new(false);

        writer.write(&path, CONTENT).unwrap();
        let result = writer.write(&path, CONTENT).unwrap();

        assert!(matches!(result, WriteResult::Unchanged { .. }));
        assert_eq!(result.bytes(), 0);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codecs.rs");

        let writer = FileWriter::new(true);
        assert!(writer.is_dry_run());
        let result = writer.write(&path, CONTENT).unwrap();

        assert!(!path.exists());
        match result {
            WriteResult::DryRun { content, .. } => assert_eq!(content, CONTENT),
            other => panic!("expected dry run, got {:?}", other),
        }
    }

    #[test]
    fn test_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("codecs.rs");

        assert_eq!(FileWriter::status(&path, CONTENT), FileStatus::Missing);
        std::fs::write(&path, CONTENT).unwrap();
        assert_eq!(FileWriter::status(&path, CONTENT), FileStatus::UpToDate);
        assert_eq!(FileWriter::status(&path, "other"), FileStatus::Stale);
    }

    #[test]
    fn test_write_result_path() {
        let path = PathBuf::from("/test/codecs.rs");
        let unchanged = WriteResult::Unchanged { path: path.clone() };
        assert_eq!(unchanged.path(), path.as_path());
        assert!(!unchanged.was_written());
    }
}
