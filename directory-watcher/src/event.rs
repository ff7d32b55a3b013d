//! Change events from directory watching.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::FileFilter;

/// A file system change event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The kind of change.
    pub kind: ChangeKind,

    /// Path to the affected file or directory.
    pub path: PathBuf,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Check whether this event should trigger re-indexing.
    ///
    /// Relevant changes are creations, modifications, and deletions of
    /// non-directory paths that pass the file filter. A deleted path no
    /// longer exists on disk, so `is_dir` is false for it and the check
    /// still applies.
    pub fn is_relevant(&self, filter: &FileFilter) -> bool {
        matches!(
            self.kind,
            ChangeKind::Created | ChangeKind::Modified | ChangeKind::Deleted
        ) && !self.path.is_dir()
            && filter.is_eligible(&self.path)
    }
}

/// Kind of change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// File was created.
    Created,

    /// File content was modified.
    Modified,

    /// File was deleted.
    Deleted,

    /// Anything else (metadata, access time, unclassified).
    Other,
}

impl From<notify::EventKind> for ChangeKind {
    fn from(kind: notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Create(_) => Self::Created,
            notify::EventKind::Modify(modify_kind) => match modify_kind {
                // Renames arrive as paired events; treat the old path as a
                // deletion and the new path as a creation.
                notify::event::ModifyKind::Name(rename) => match rename {
                    notify::event::RenameMode::From => Self::Deleted,
                    notify::event::RenameMode::To => Self::Created,
                    _ => Self::Modified,
                },
                notify::event::ModifyKind::Metadata(_) => Self::Other,
                _ => Self::Modified,
            },
            notify::EventKind::Remove(_) => Self::Deleted,
            _ => Self::Other,
        }
    }
}
