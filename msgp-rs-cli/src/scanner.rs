//! Schema file scanner.
//!
//! Recursively finds `*.json` schema documents under a directory,
//! respecting `.gitignore` patterns and an optional glob filter. A path
//! naming a single file is returned as-is.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{CliResult, ScanError};

/// Extension of schema documents.
pub const SCHEMA_EXTENSION: &str = "json";

/// `*` and `?` in a filter stop at path separators; only `**` crosses them.
const FILTER_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A discovered schema file with its content.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    /// Path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// File content.
    pub content: String,
}

/// Scanner for discovering schema documents.
#[derive(Debug)]
pub struct SchemaScanner {
    root: PathBuf,
    respect_gitignore: bool,
    filter: Option<glob::Pattern>,
}

impl SchemaScanner {
    /// Create a new scanner for the given root directory or file.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
            filter: None,
        }
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Only include files whose relative path matches `pattern`.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(glob_pattern);
        Ok(self)
    }

    /// Scan and return every schema document, sorted by relative path.
    pub fn scan(&self) -> CliResult<Vec<SchemaFile>> {
        if !self.root.exists() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        if self.root.is_file() {
            let file = self.read(&self.root)?;
            return Ok(vec![file]);
        }

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(false)
            .build();

        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            if path.extension().map_or(true, |ext| ext != SCHEMA_EXTENSION) {
                continue;
            }
            if let Some(ref pattern) = self.filter {
                if !pattern.matches_path_with(&self.relative_path(path), FILTER_OPTIONS) {
                    tracing::trace!(path = %path.display(), "filtered out");
                    continue;
                }
            }

            files.push(self.read(path)?);
        }

        if files.is_empty() {
            return Err(ScanError::no_schema_files(self.root.clone()).into());
        }

        // Walk order depends on the filesystem; output must not.
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        tracing::debug!(count = files.len(), root = %self.root.display(), "found schema files");
        Ok(files)
    }

    fn read(&self, path: &Path) -> CliResult<SchemaFile> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(SchemaFile {
            path: path.to_path_buf(),
            relative_path: self.relative_path(path),
            content,
        })
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        if path == self.root {
            return path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf());
        }
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
