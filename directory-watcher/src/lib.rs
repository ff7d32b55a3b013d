//! # Directory Watcher
//!
//! This crate provides file system monitoring for the loupe semantic search
//! engine. It watches a project tree, filters the raw notification stream
//! down to relevant changes, and triggers debounced re-indexing through a
//! [`Reindexer`] handle.
//!
//! ## Features
//!
//! - **Real-time Watching**: Monitor a project tree for file changes
//! - **Eligibility Filtering**: Extension allow-list and directory deny-list
//! - **Debouncing**: Rapid change bursts collapse to one re-index per window
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Directory Watcher                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  notify ──► ChangeEvent ──► FileFilter ──► Debouncer            │
//! │                                               │                 │
//! │                                               ▼                 │
//! │                                          Reindexer              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The notify callback only forwards events into a channel; filtering,
//! debouncing, and the re-index call itself run on a separate task so that
//! event delivery is never blocked.

pub mod config;
pub mod debounce;
pub mod error;
pub mod event;
pub mod watcher;

pub use config::FileFilter;
pub use debounce::{DEFAULT_DEBOUNCE, DebounceState, Debouncer};
pub use error::{Result, WatcherError};
pub use event::{ChangeEvent, ChangeKind};
pub use watcher::{ProjectWatcher, Reindexer};
