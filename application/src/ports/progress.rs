//! Progress notification port
//!
//! Implementations live in the presentation layer; the worker pool reports
//! worker-level events through this interface.

use judge_domain::{Verdict, Worker};

/// Callback for progress updates during a judge run
pub trait ProgressNotifier: Send + Sync {
    /// Called when a worker is dispatched
    fn on_worker_start(&self, worker: &Worker);

    /// Called when a worker's verdict has been produced
    fn on_worker_complete(&self, worker: &Worker, verdict: &Verdict);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_worker_start(&self, _worker: &Worker) {}
    fn on_worker_complete(&self, _worker: &Worker, _verdict: &Verdict) {}
}
