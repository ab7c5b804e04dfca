//! Shared worker-status table
//!
//! The only mutable state shared across worker tasks. Each runner writes
//! exactly its own worker's entry; the live progress monitor is the single
//! reader. Every access takes the lock, and a later update always
//! overwrites an earlier one — no update is ever rolled back.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One worker's live state
#[derive(Debug, Clone)]
pub struct WorkerStatus {
    /// Current human-readable activity line
    pub activity: String,
    /// Whether the worker has finished (successfully or not)
    pub done: bool,
    started: Instant,
    finished: Option<Instant>,
}

impl WorkerStatus {
    fn new() -> Self {
        Self {
            activity: "Starting...".to_string(),
            done: false,
            started: Instant::now(),
            finished: None,
        }
    }

    /// Wall-clock time this worker has been (or was) running
    pub fn elapsed(&self) -> Duration {
        match self.finished {
            Some(end) => end.duration_since(self.started),
            None => self.started.elapsed(),
        }
    }
}

/// Mutex-guarded status table keyed by worker name, iterated in the
/// originally requested worker order.
pub struct StatusBoard {
    names: Vec<String>,
    entries: Mutex<HashMap<String, WorkerStatus>>,
}

impl StatusBoard {
    /// Create a board with one entry per worker, in request order
    pub fn new(workers: &[impl AsRef<str>]) -> Self {
        let names: Vec<String> = workers.iter().map(|w| w.as_ref().to_string()).collect();
        let entries = names
            .iter()
            .map(|n| (n.clone(), WorkerStatus::new()))
            .collect();
        Self {
            names,
            entries: Mutex::new(entries),
        }
    }

    /// Overwrite a worker's activity line. Unknown workers are ignored.
    pub fn update(&self, worker: &str, activity: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(status) = entries.get_mut(worker) {
            status.activity = activity.into();
        }
    }

    /// Mark a worker finished with a final activity line
    pub fn finish(&self, worker: &str, activity: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(status) = entries.get_mut(worker) {
            status.activity = activity.into();
            status.done = true;
            status.finished = Some(Instant::now());
        }
    }

    /// Snapshot of all entries in requested worker order
    pub fn snapshot(&self) -> Vec<(String, WorkerStatus)> {
        let entries = self.entries.lock().unwrap();
        self.names
            .iter()
            .filter_map(|n| entries.get(n).map(|s| (n.clone(), s.clone())))
            .collect()
    }

    /// Number of workers on the board
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_preserves_request_order() {
        let board = StatusBoard::new(&["zai", "minimax", "claude"]);
        board.update("claude", "Reading file...");
        let snap = board.snapshot();
        let names: Vec<_> = snap.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zai", "minimax", "claude"]);
    }

    #[test]
    fn test_later_update_overwrites() {
        let board = StatusBoard::new(&["zai"]);
        board.update("zai", "first");
        board.update("zai", "second");
        assert_eq!(board.snapshot()[0].1.activity, "second");
    }

    #[test]
    fn test_finish_freezes_elapsed() {
        let board = StatusBoard::new(&["zai"]);
        board.finish("zai", "Done");
        let status = board.snapshot()[0].1.clone();
        assert!(status.done);
        let first = status.elapsed();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(board.snapshot()[0].1.elapsed(), first);
    }

    #[test]
    fn test_unknown_worker_ignored() {
        let board = StatusBoard::new(&["zai"]);
        board.update("ghost", "anything");
        assert_eq!(board.len(), 1);
    }
}
