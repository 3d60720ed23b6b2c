//! Source directory watcher driving reload restarts.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::reload::filter::WatchFilter;

/// Watches source directories and reports changed paths that pass the filter.
pub struct SourceWatcher {
    dirs: Vec<PathBuf>,
    filter: WatchFilter,
    change_tx: mpsc::UnboundedSender<PathBuf>,
}

impl SourceWatcher {
    /// Create a new SourceWatcher.
    ///
    /// Returns the watcher and a receiver for changed paths.
    pub fn new(dirs: Vec<PathBuf>, filter: WatchFilter) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        (
            Self {
                dirs,
                filter,
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching. Events are delivered from notify's own thread; the
    /// returned watcher must be kept alive for as long as changes matter.
    ///
    /// Directories that do not exist are skipped with a warning.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx;
        let filter = self.filter;
        // Some backends report canonical paths (e.g. /private/var on macOS).
        let dirs: Vec<PathBuf> = self
            .dirs
            .iter()
            .flat_map(|d| [Some(d.clone()), d.canonicalize().ok()])
            .flatten()
            .collect();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_content_change(&event.kind) {
                        return;
                    }
                    for path in event.paths {
                        if is_relevant(&dirs, &filter, &path) {
                            let _ = tx.send(path);
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        for dir in &self.dirs {
            if !dir.is_dir() {
                tracing::warn!(path = ?dir, "Reload directory does not exist, not watching it");
                continue;
            }
            watcher.watch(dir, RecursiveMode::Recursive)?;
            tracing::info!(path = ?dir, "Watching for changes");
        }

        Ok(watcher)
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create() || kind.is_remove()
}

/// Filter `path` relative to whichever watched directory contains it.
fn is_relevant(dirs: &[PathBuf], filter: &WatchFilter, path: &Path) -> bool {
    dirs.iter()
        .filter_map(|dir| path.strip_prefix(dir).ok())
        .any(|relative| filter.matches(relative))
}

/// Collects changed paths into batches separated by a quiet period.
///
/// Pending paths and the deadline live here rather than in the future, so
/// dropping a `next_batch` call mid-window (e.g. inside `select!`) loses
/// nothing.
pub struct Debouncer {
    rx: mpsc::UnboundedReceiver<PathBuf>,
    delay: Duration,
    pending: BTreeSet<PathBuf>,
    deadline: Instant,
    closed: bool,
}

impl Debouncer {
    pub fn new(rx: mpsc::UnboundedReceiver<PathBuf>, delay: Duration) -> Self {
        Self {
            rx,
            delay,
            pending: BTreeSet::new(),
            deadline: Instant::now(),
            closed: false,
        }
    }

    /// Wait for a change, then keep collecting until `delay` passes quietly.
    ///
    /// Returns the distinct changed paths, or `None` once every sender is
    /// gone and nothing is pending. Cancel-safe.
    pub async fn next_batch(&mut self) -> Option<Vec<PathBuf>> {
        loop {
            if self.pending.is_empty() {
                if self.closed {
                    return None;
                }
                match self.rx.recv().await {
                    Some(path) => self.push(path),
                    None => {
                        self.closed = true;
                        return None;
                    }
                }
                continue;
            }

            if self.closed {
                return Some(self.take());
            }

            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(path) => self.push(path),
                    None => self.closed = true,
                },
                _ = sleep_until(self.deadline) => return Some(self.take()),
            }
        }
    }

    fn push(&mut self, path: PathBuf) {
        self.pending.insert(path);
        self.deadline = Instant::now() + self.delay;
    }

    fn take(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReloadConfig;

    fn default_filter() -> WatchFilter {
        let config = ReloadConfig::default();
        WatchFilter::new(config.include, config.exclude)
    }

    #[test]
    fn test_relevance_is_relative_to_watched_dir() {
        let dirs = vec![PathBuf::from("/srv/.hidden/backend")];
        let filter = default_filter();

        // The hidden parent is above the watched dir and must not exclude it.
        assert!(is_relevant(&dirs, &filter, Path::new("/srv/.hidden/backend/main.py")));
        assert!(!is_relevant(&dirs, &filter, Path::new("/srv/.hidden/backend/__pycache__/main.py")));
        assert!(!is_relevant(&dirs, &filter, Path::new("/srv/other/main.py")));
    }

    #[tokio::test]
    async fn test_debounce_collects_burst() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(PathBuf::from("/b.py")).unwrap();
        tx.send(PathBuf::from("/a.py")).unwrap();
        tx.send(PathBuf::from("/b.py")).unwrap();

        let mut debouncer = Debouncer::new(rx, Duration::from_millis(20));
        let batch = debouncer.next_batch().await.unwrap();
        assert_eq!(batch, vec![PathBuf::from("/a.py"), PathBuf::from("/b.py")]);
    }

    #[tokio::test]
    async fn test_debounce_splits_separated_changes() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(PathBuf::from("/first.py")).unwrap();

        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(PathBuf::from("/second.py")).unwrap();
        });

        let mut debouncer = Debouncer::new(rx, Duration::from_millis(20));
        let first = debouncer.next_batch().await.unwrap();
        assert_eq!(first, vec![PathBuf::from("/first.py")]);

        let second = debouncer.next_batch().await.unwrap();
        assert_eq!(second, vec![PathBuf::from("/second.py")]);

        sender.await.unwrap();
        assert!(debouncer.next_batch().await.is_none());
    }

    #[tokio::test]
    async fn test_interrupted_batch_keeps_paths() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(rx, Duration::from_millis(300));
        tx.send(PathBuf::from("/main.py")).unwrap();

        // Abandon the call inside the quiet window, as a losing select! arm would.
        let interrupted =
            tokio::time::timeout(Duration::from_millis(50), debouncer.next_batch()).await;
        assert!(interrupted.is_err());

        tx.send(PathBuf::from("/routes.py")).unwrap();
        let batch = debouncer.next_batch().await.unwrap();
        assert_eq!(batch, vec![PathBuf::from("/main.py"), PathBuf::from("/routes.py")]);
    }

    #[tokio::test]
    async fn test_pending_batch_flushed_after_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(rx, Duration::from_secs(60));
        tx.send(PathBuf::from("/main.py")).unwrap();
        drop(tx);

        assert_eq!(debouncer.next_batch().await, Some(vec![PathBuf::from("/main.py")]));
        assert_eq!(debouncer.next_batch().await, None);
    }

    #[tokio::test]
    async fn test_watcher_reports_source_edits() {
        let dir = tempfile::tempdir().unwrap();
        let backend = dir.path().canonicalize().unwrap().join("backend");
        std::fs::create_dir(&backend).unwrap();

        let (watcher, mut rx) = SourceWatcher::new(vec![backend.clone()], default_filter());
        let _guard = watcher.run().unwrap();

        std::fs::write(backend.join("notes.txt"), "ignored").unwrap();
        std::fs::write(backend.join("main.py"), "app = None\n").unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no change reported")
            .unwrap();
        assert_eq!(changed.file_name().unwrap(), "main.py");
    }
}
