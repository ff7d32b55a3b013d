//! Project watcher implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::FileFilter;
use crate::debounce::Debouncer;
use crate::error::{Result, WatcherError};
use crate::event::{ChangeEvent, ChangeKind};

/// Performs the actual re-index when the watcher decides one is due.
///
/// Implemented by the search engine; the watcher only holds a handle so
/// that re-indexing runs off the event-delivery path.
#[async_trait]
pub trait Reindexer: Send + Sync {
    /// Rebuild the index.
    ///
    /// Errors are reported by the watch loop and do not stop watching.
    async fn reindex(&self) -> anyhow::Result<()>;
}

/// Watches a project tree and triggers debounced re-indexing.
pub struct ProjectWatcher {
    /// Watched project root.
    root: PathBuf,

    /// Eligibility filter for change relevance.
    filter: FileFilter,

    /// Debounce window.
    window: Duration,

    /// Internal notify watcher; present while running.
    watcher: Option<RecommendedWatcher>,

    /// Watch loop task; present while running.
    task: Option<JoinHandle<()>>,

    /// Whether the watcher is running.
    running: Arc<RwLock<bool>>,
}

impl ProjectWatcher {
    /// Create a watcher for a project root.
    pub fn new(root: impl Into<PathBuf>, filter: FileFilter, window: Duration) -> Result<Self> {
        let root = root.into();

        if !root.exists() {
            return Err(WatcherError::DirectoryNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(WatcherError::NotADirectory(root.display().to_string()));
        }

        Ok(Self {
            root,
            filter,
            window,
            watcher: None,
            task: None,
            running: Arc::new(RwLock::new(false)),
        })
    }

    /// Start watching and dispatching re-indexes to `reindexer`.
    ///
    /// The notify callback only forwards raw events into a channel;
    /// filtering, debouncing, and the re-index call run on a spawned task,
    /// so event delivery is never blocked by an in-progress re-index.
    pub async fn start(&mut self, reindexer: Arc<dyn Reindexer>) -> Result<()> {
        if *self.running.read().await {
            return Err(WatcherError::AlreadyWatching(self.root.display().to_string()));
        }

        let (event_tx, event_rx) = mpsc::channel(1024);

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let kind = ChangeKind::from(event.kind);
                    for path in event.paths {
                        if event_tx.blocking_send(ChangeEvent::new(kind, path)).is_err() {
                            // Loop has shut down; nothing left to notify.
                            return;
                        }
                    }
                }
                Err(e) => error!("watch error: {e}"),
            },
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        self.watcher = Some(watcher);

        self.task = Some(tokio::spawn(watch_loop(
            event_rx,
            self.filter.clone(),
            self.window,
            reindexer,
        )));

        *self.running.write().await = true;
        info!("Watching {} for changes", self.root.display());

        Ok(())
    }

    /// Stop watching and release the filesystem watch handles.
    pub async fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            let _ = watcher.unwatch(&self.root);
        }

        // Dropping the notify watcher closed the event channel, which ends
        // the loop once it drains; abort instead of waiting in case a
        // re-index is mid-flight.
        if let Some(task) = self.task.take() {
            task.abort();
        }

        *self.running.write().await = false;
        info!("Stopped watching {}", self.root.display());
    }

    /// Check if the watcher is running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// The watched project root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Drains change events, applies relevance and debounce rules, and runs
/// re-indexes.
async fn watch_loop(
    mut events: mpsc::Receiver<ChangeEvent>,
    filter: FileFilter,
    window: Duration,
    reindexer: Arc<dyn Reindexer>,
) {
    let mut debouncer = Debouncer::new(window);
    let flush = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(flush);
    let mut armed = false;

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };
                if !event.is_relevant(&filter) {
                    continue;
                }
                match debouncer.on_event(Instant::now()) {
                    Some(deadline) => {
                        debug!("Change to {} scheduled a re-index", event.path.display());
                        flush.as_mut().reset(tokio::time::Instant::from_std(deadline));
                        armed = true;
                    }
                    None => {
                        debug!("Change to {} dropped by debounce", event.path.display());
                    }
                }
            }
            _ = &mut flush, if armed => {
                armed = false;
                if debouncer.on_deadline() {
                    info!("Re-indexing after file changes");
                    if let Err(e) = reindexer.reindex().await {
                        error!("re-index failed: {e:#}");
                    }
                    debouncer.on_reindex_complete();

                    // Changes that raced with the re-index fall under the
                    // same debounce rule: dropped, not queued.
                    let mut dropped = 0usize;
                    while events.try_recv().is_ok() {
                        dropped += 1;
                    }
                    if dropped > 0 {
                        debug!("Dropped {dropped} events that arrived during re-index");
                    }
                }
            }
        }
    }

    debug!("Watch loop exited");
}
