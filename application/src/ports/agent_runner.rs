//! Agent process runner port
//!
//! The adapter owns one external process per call: launch, capture the
//! combined output stream (batch or streaming), enforce the deadline.
//! Failures are data, not errors — a worker that cannot run still yields an
//! outcome, so no single worker can abort a run.

use async_trait::async_trait;
use judge_domain::Worker;
use std::time::Duration;
use thiserror::Error;

/// Terminal failure modes of one capture attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureFailure {
    /// Executable resolvable neither on PATH nor in the configured bin dir
    #[error("{0}")]
    NotFound(String),

    /// Deadline exceeded; the process was forcibly terminated
    #[error("Timeout")]
    Timeout,

    /// I/O error or unexpected process death, caught at the runner boundary
    #[error("{0}")]
    Process(String),
}

/// Everything one capture attempt produced
#[derive(Debug, Clone, Default)]
pub struct CaptureOutcome {
    /// Combined output captured so far (may be partial on failure)
    pub output: String,
    /// Separately captured diagnostic stream, when the transport splits them
    pub stderr: String,
    /// Why the capture terminated early, if it did
    pub failure: Option<CaptureFailure>,
}

impl CaptureOutcome {
    /// Clean completion
    pub fn success(output: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            stderr: stderr.into(),
            failure: None,
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            failure: Some(CaptureFailure::NotFound(detail.into())),
            ..Default::default()
        }
    }

    /// Deadline exceeded; keeps whatever output arrived before the kill
    pub fn timed_out(partial_output: impl Into<String>) -> Self {
        Self {
            output: partial_output.into(),
            failure: Some(CaptureFailure::Timeout),
            ..Default::default()
        }
    }

    pub fn process_error(error: impl Into<String>) -> Self {
        Self {
            failure: Some(CaptureFailure::Process(error.into())),
            ..Default::default()
        }
    }
}

/// Port for running one analysis agent to completion
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Launch the worker's executable with the prompt and capture its
    /// combined output, enforcing `timeout`. Must not panic or error:
    /// every failure mode is encoded in the outcome.
    async fn run(&self, worker: &Worker, prompt: &str, timeout: Duration) -> CaptureOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_out_keeps_partial_output() {
        let o = CaptureOutcome::timed_out("partial");
        assert_eq!(o.output, "partial");
        assert_eq!(o.failure, Some(CaptureFailure::Timeout));
    }

    #[test]
    fn test_success_has_no_failure() {
        let o = CaptureOutcome::success("done", "");
        assert!(o.failure.is_none());
    }
}
