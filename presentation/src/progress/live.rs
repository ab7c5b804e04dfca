//! Live worker activity display
//!
//! One spinner line per worker, refreshed from the shared status board on a
//! short tick. The display task only ever reads the board; it can lag or
//! die without affecting the workers.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use judge_application::StatusBoard;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(80);
const ACTIVITY_WIDTH: usize = 55;

/// Renders the status board until stopped
pub struct LiveMonitor {
    multi: MultiProgress,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl LiveMonitor {
    /// Spawn the display task for all workers on the board
    pub fn start(board: Arc<StatusBoard>) -> Self {
        let multi = MultiProgress::new();
        let mut bars: HashMap<String, ProgressBar> = HashMap::new();

        for (name, status) in board.snapshot() {
            let bar = multi.add(ProgressBar::new_spinner());
            bar.set_style(Self::spinner_style());
            bar.set_prefix(name.to_uppercase());
            bar.set_message(status.activity.clone());
            bars.insert(name, bar);
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(TICK) => {}
                }

                for (name, status) in board.snapshot() {
                    let Some(bar) = bars.get(&name) else {
                        continue;
                    };
                    let elapsed = status.elapsed().as_secs();
                    if status.done {
                        if !bar.is_finished() {
                            bar.finish_with_message(format!("{} ({}s)", status.activity, elapsed));
                        }
                    } else {
                        bar.set_message(format!(
                            "{} [{}s]",
                            clip(&status.activity, ACTIVITY_WIDTH),
                            elapsed
                        ));
                        bar.tick();
                    }
                }
            }
        });

        Self {
            multi,
            cancel,
            handle,
        }
    }

    /// Stop the display task and clear its lines
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
        let _ = self.multi.clear();
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {prefix:.bold}: {msg}")
            .unwrap()
    }
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    }
}
