//! Child-process agent runner
//!
//! Implements the `AgentRunner` port: resolves the worker's executable,
//! launches it with the fixed print-mode flags, and captures everything it
//! prints. Batch mode reads to EOF over pipes; streaming mode runs the
//! child in a pseudo-terminal and feeds classified activity lines to the
//! status board as they arrive.

use super::ansi::strip_ansi;
use super::resolver::ExecutableResolver;
use super::transport::{ChunkRead, PipeChannel, ProcessChannel, PtyChannel, SPLASH_ENV};
use async_trait::async_trait;
use judge_application::{AgentRunner, CaptureOutcome, StatusBoard};
use judge_domain::{Worker, classify_activity};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SILENCE_FALLBACK: Duration = Duration::from_millis(500);
const THINKING_ROTATE: Duration = Duration::from_secs(3);
const ACTIVITY_MAX_CHARS: usize = 55;

/// Shown while a worker has produced no output yet
const THINKING_MESSAGES: [&str; 6] = [
    "Thinking...",
    "Analyzing context...",
    "Processing request...",
    "Building investigation plan...",
    "Preparing tools...",
    "Reviewing conversation...",
];

/// Print-mode invocation every agent understands
pub(crate) fn agent_args(prompt: &str) -> Vec<String> {
    vec![
        "--dangerously-skip-permissions".to_string(),
        "--print".to_string(),
        "-p".to_string(),
        prompt.to_string(),
    ]
}

/// Runs analysis agents as child processes
pub struct CliAgentRunner {
    resolver: ExecutableResolver,
    live: Option<Arc<StatusBoard>>,
}

impl CliAgentRunner {
    pub fn new(resolver: ExecutableResolver) -> Self {
        Self {
            resolver,
            live: None,
        }
    }

    /// Switch to streaming capture, publishing activity to `board`
    pub fn with_live_board(mut self, board: Arc<StatusBoard>) -> Self {
        self.live = Some(board);
        self
    }

    async fn run_streaming(
        &self,
        worker: &Worker,
        path: &Path,
        args: &[String],
        timeout: Duration,
        board: &StatusBoard,
    ) -> CaptureOutcome {
        let mut channel = match PtyChannel::spawn(path, args, &[SPLASH_ENV, ("TERM", "dumb")]) {
            Ok(c) => c,
            Err(e) => {
                board.finish(&worker.name, clip(&format!("Error: {e}"), 40));
                return CaptureOutcome::process_error(e);
            }
        };
        board.update(&worker.name, "Starting analysis...");

        let deadline = tokio::time::Instant::now() + timeout;
        let mut raw = String::new();
        let mut line_buffer = String::new();
        let mut recent: VecDeque<String> = VecDeque::with_capacity(3);
        let mut chunk_count = 0usize;
        let mut first_output = false;
        let mut last_activity = tokio::time::Instant::now();
        let mut thinking_idx = 0usize;

        loop {
            if tokio::time::Instant::now() >= deadline {
                channel.kill();
                warn!(worker = %worker.name, "worker timed out");
                board.finish(&worker.name, "Timed out");
                return CaptureOutcome::timed_out(strip_ansi(&raw));
            }

            if !first_output && last_activity.elapsed() >= THINKING_ROTATE {
                thinking_idx = (thinking_idx + 1) % THINKING_MESSAGES.len();
                board.update(&worker.name, THINKING_MESSAGES[thinking_idx]);
                last_activity = tokio::time::Instant::now();
            }

            match channel.read_chunk(POLL_INTERVAL).await {
                ChunkRead::Data(bytes) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    chunk_count += 1;
                    first_output = true;
                    raw.push_str(&text);
                    if recent.len() == 3 {
                        recent.pop_front();
                    }
                    recent.push_back(text.clone());
                    line_buffer.push_str(&text);

                    while let Some(pos) = line_buffer.find('\n') {
                        let line: String = line_buffer.drain(..=pos).collect();
                        if let Some(activity) = classify_activity(&strip_ansi(&line)) {
                            board.update(&worker.name, activity);
                            last_activity = tokio::time::Instant::now();
                        }
                    }

                    // Activity classifier found nothing for a while: surface
                    // the last raw line, or at least a sign of life
                    if last_activity.elapsed() >= SILENCE_FALLBACK {
                        let recent_text: String = recent.iter().map(String::as_str).collect();
                        let clean = strip_ansi(&recent_text);
                        let last_line = clean
                            .lines()
                            .map(str::trim)
                            .filter(|l| l.len() > 3)
                            .next_back();
                        if let Some(line) = last_line {
                            board.update(&worker.name, clip(line, ACTIVITY_MAX_CHARS));
                            last_activity = tokio::time::Instant::now();
                        } else if chunk_count % 10 == 0 {
                            board.update(&worker.name, format!("Working... ({chunk_count} chunks)"));
                            last_activity = tokio::time::Instant::now();
                        }
                    }
                }
                ChunkRead::Eof => break,
                ChunkRead::Idle => {
                    if channel.try_wait().is_some() {
                        // Child exited; drain what is still buffered
                        while let ChunkRead::Data(bytes) =
                            channel.read_chunk(POLL_INTERVAL).await
                        {
                            raw.push_str(&String::from_utf8_lossy(&bytes));
                        }
                        break;
                    }
                }
            }
        }

        board.finish(&worker.name, "Done");
        CaptureOutcome::success(strip_ansi(&raw), "")
    }
}

/// Batch capture: read to EOF over pipes, enforce the deadline
pub(crate) async fn run_batch(path: &Path, args: &[String], timeout: Duration) -> CaptureOutcome {
    let mut channel = match PipeChannel::spawn(path, args, &[SPLASH_ENV]) {
        Ok(c) => c,
        Err(e) => return CaptureOutcome::process_error(e),
    };

    let deadline = tokio::time::Instant::now() + timeout;
    let mut raw = Vec::new();

    loop {
        if tokio::time::Instant::now() >= deadline {
            channel.kill();
            return CaptureOutcome::timed_out(strip_ansi(&String::from_utf8_lossy(&raw)));
        }

        match channel.read_chunk(POLL_INTERVAL).await {
            ChunkRead::Data(bytes) => raw.extend_from_slice(&bytes),
            ChunkRead::Eof => break,
            ChunkRead::Idle => {
                if channel.try_wait().is_some() {
                    while let ChunkRead::Data(bytes) = channel.read_chunk(POLL_INTERVAL).await {
                        raw.extend_from_slice(&bytes);
                    }
                    break;
                }
            }
        }
    }

    let stderr = channel.take_stderr().await;
    CaptureOutcome::success(strip_ansi(&String::from_utf8_lossy(&raw)), stderr)
}

fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[async_trait]
impl AgentRunner for CliAgentRunner {
    async fn run(&self, worker: &Worker, prompt: &str, timeout: Duration) -> CaptureOutcome {
        let Some(path) = self.resolver.resolve(&worker.executable) else {
            let detail = format!(
                "Worker '{}' not found on PATH or in {}",
                worker.executable,
                self.resolver.bin_dir().display()
            );
            warn!(worker = %worker.name, "{}", detail);
            if let Some(board) = &self.live {
                board.finish(&worker.name, "Not found");
            }
            return CaptureOutcome::not_found(detail);
        };

        debug!(worker = %worker.name, path = %path.display(), "launching worker");
        let args = agent_args(prompt);

        match &self.live {
            Some(board) => {
                self.run_streaming(worker, &path, &args, timeout, board)
                    .await
            }
            None => run_batch(&path, &args, timeout).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use judge_application::CaptureFailure;

    fn fake_worker(dir: &Path, name: &str, script: &str) -> Worker {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        Worker::new(name)
    }

    #[tokio::test]
    async fn test_unresolvable_worker_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CliAgentRunner::new(ExecutableResolver::new(dir.path()));

        let outcome = runner
            .run(&Worker::new("no-such-agent"), "prompt", Duration::from_secs(5))
            .await;

        assert!(matches!(outcome.failure, Some(CaptureFailure::NotFound(_))));
    }

    #[tokio::test]
    async fn test_batch_capture_returns_full_output() {
        let dir = tempfile::tempdir().unwrap();
        let worker = fake_worker(dir.path(), "zai", r#"echo '{"verdict": "approve"}'"#);
        let runner = CliAgentRunner::new(ExecutableResolver::new(dir.path()));

        let outcome = runner.run(&worker, "prompt", Duration::from_secs(5)).await;

        assert!(outcome.failure.is_none());
        assert!(outcome.output.contains(r#""verdict": "approve""#));
    }

    #[tokio::test]
    async fn test_deadline_kills_and_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let worker = fake_worker(dir.path(), "slow", "echo partial; sleep 30");
        let runner = CliAgentRunner::new(ExecutableResolver::new(dir.path()));

        let start = std::time::Instant::now();
        let outcome = runner
            .run(&worker, "prompt", Duration::from_millis(500))
            .await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(outcome.failure, Some(CaptureFailure::Timeout));
        assert!(outcome.output.contains("partial"));
    }

    #[tokio::test]
    async fn test_streaming_capture_publishes_activity() {
        let dir = tempfile::tempdir().unwrap();
        let worker = fake_worker(
            dir.path(),
            "zai",
            r#"echo 'Reading file src/main.rs'; echo done"#,
        );
        let board = Arc::new(StatusBoard::new(&["zai"]));
        let runner =
            CliAgentRunner::new(ExecutableResolver::new(dir.path())).with_live_board(board.clone());

        let outcome = runner.run(&worker, "prompt", Duration::from_secs(10)).await;

        assert!(outcome.failure.is_none());
        let (_, status) = &board.snapshot()[0];
        assert!(status.done);
        assert_eq!(status.activity, "Done");
    }
}
