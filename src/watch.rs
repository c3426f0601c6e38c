//! Watching source images for external edits.
//!
//! Editors often save by writing a temporary file and renaming it, so the
//! watcher observes the parent directory of every source and filters events
//! down to the files it was asked about. Bursts of events are coalesced by a
//! debounce window; each batch reports every changed file once.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

use log::{debug, warn};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer};

use crate::error::{LitError, Result};

/// Default quiet period before a batch of changes is delivered.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Debounced watcher over a set of source files.
pub struct SourceWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<DebounceEventResult>,
    /// Canonical path -> path as the caller knows it.
    files: HashMap<PathBuf, PathBuf>,
    dirs: HashSet<PathBuf>,
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl SourceWatcher {
    pub fn new(debounce: Duration) -> Result<Self> {
        let (tx, rx) = channel();
        let debouncer = new_debouncer(debounce, tx).map_err(|e| LitError::Watch {
            message: format!("Failed to initialize file watcher: {}", e),
        })?;
        Ok(Self {
            debouncer,
            rx,
            files: HashMap::new(),
            dirs: HashSet::new(),
        })
    }

    /// Start watching `paths`. Files already watched are skipped.
    pub fn watch_files(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            let canon = canonical(path);
            if self.files.contains_key(&canon) {
                continue;
            }

            let dir = canon
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            if !self.dirs.contains(&dir) {
                self.debouncer
                    .watcher()
                    .watch(&dir, RecursiveMode::NonRecursive)
                    .map_err(|e| LitError::Watch {
                        message: format!("Failed to watch {}: {}", dir.display(), e),
                    })?;
                debug!("watching {}", dir.display());
                self.dirs.insert(dir);
            }

            self.files.insert(canon, path.clone());
        }
        Ok(())
    }

    /// Number of watched files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Block until the next batch that touches a watched file.
    pub fn recv(&self) -> Result<Vec<PathBuf>> {
        loop {
            let batch = self.rx.recv().map_err(|e| LitError::Watch {
                message: format!("Watch channel closed: {}", e),
            })?;
            let changed = self.filter_batch(batch);
            if !changed.is_empty() {
                return Ok(changed);
            }
        }
    }

    /// Like [`Self::recv`], giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Vec<PathBuf>>> {
        match self.rx.recv_timeout(timeout) {
            Ok(batch) => Ok(Some(self.filter_batch(batch))),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LitError::Watch {
                message: "Watch channel closed".to_string(),
            }),
        }
    }

    fn filter_batch(&self, batch: DebounceEventResult) -> Vec<PathBuf> {
        match batch {
            Ok(events) => {
                let settled = events
                    .iter()
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .map(|e| e.path.as_path());
                relevant_changes(settled, &self.files)
            }
            Err(e) => {
                // Non-fatal; keep watching
                warn!("watch error: {:?}", e);
                Vec::new()
            }
        }
    }
}

/// Map event paths to the watched files they name, once each, in order of
/// first appearance.
pub fn relevant_changes<'a>(
    events: impl IntoIterator<Item = &'a Path>,
    files: &HashMap<PathBuf, PathBuf>,
) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut changed = Vec::new();
    for path in events {
        let hit = files.get(path).or_else(|| files.get(&canonical(path)));
        if let Some(original) = hit {
            if seen.insert(original.clone()) {
                changed.push(original.clone());
            }
        }
    }
    changed
}
