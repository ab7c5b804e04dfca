//! Plain-text progress (no live display)

use crate::output::console::{paint, verdict_icon};
use colored::Colorize;
use judge_application::ProgressNotifier;
use judge_domain::{Verdict, Worker};

/// Prints one line per worker event
pub struct ConsoleProgress;

impl ProgressNotifier for ConsoleProgress {
    fn on_worker_start(&self, worker: &Worker) {
        println!("  {} {} dispatched", "->".cyan(), worker.name.bold());
    }

    fn on_worker_complete(&self, worker: &Worker, verdict: &Verdict) {
        println!(
            "  {} {} — {} ({}%)",
            paint(verdict.label, verdict_icon(verdict.label)),
            worker.name.to_uppercase().bold(),
            paint(verdict.label, verdict.label.as_str()),
            verdict.confidence
        );
    }
}
