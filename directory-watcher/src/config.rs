//! File eligibility configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default file extensions eligible for indexing.
const DEFAULT_EXTENSIONS: &[&str] = &["rs", "py", "md", "json", "yaml", "yml", "toml", "txt"];

/// Default directory names pruned from traversal and watching.
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Dependencies and build output
    "node_modules",
    "target",
    "vendor",
    // Virtual environments and caches
    "venv",
    ".venv",
    "__pycache__",
];

/// Decides which files belong in the index.
///
/// A file is eligible when its extension is on the allow-list and no
/// component of its path is an excluded directory name. The same filter is
/// applied by the tree-walking indexer and by the watcher's relevance
/// check, so the two always agree on what the index covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFilter {
    /// Extensions (without the leading dot) eligible for indexing.
    pub allowed_extensions: Vec<String>,

    /// Directory names pruned entirely from traversal.
    pub excluded_dirs: Vec<String>,
}

impl FileFilter {
    /// Create a filter with the default allow- and deny-lists.
    pub fn new() -> Self {
        Self {
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replace the extension allow-list.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Add one extension to the allow-list.
    pub fn allow_extension(mut self, extension: impl Into<String>) -> Self {
        self.allowed_extensions.push(extension.into());
        self
    }

    /// Add one directory name to the deny-list.
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.excluded_dirs.push(name.into());
        self
    }

    /// Check if a directory name is on the deny-list.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    /// Check if the path's extension is on the allow-list.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.allowed_extensions.iter().any(|a| a == ext))
    }

    /// Check if any component of the path is an excluded directory.
    pub fn traverses_excluded(&self, path: &Path) -> bool {
        path.components()
            .filter_map(|c| c.as_os_str().to_str())
            .any(|name| self.is_excluded_dir(name))
    }

    /// Check if a file path is eligible for indexing.
    pub fn is_eligible(&self, path: &Path) -> bool {
        self.matches_extension(path) && !self.traverses_excluded(path)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new()
    }
}
