//! Run Judge use case
//!
//! Dispatches the investigation prompt to every configured worker, collects
//! one verdict per worker regardless of how each one fares, and folds the
//! verdicts into a consensus. Workers run concurrently by default; the
//! sequential mode exists for debugging a single misbehaving agent.

use crate::config::ExecutionParams;
use crate::ports::agent_runner::{AgentRunner, CaptureFailure, CaptureOutcome};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use judge_domain::{
    Consensus, Verdict, Worker, calculate_consensus, extract_verdict_with_stderr,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors that can occur before any worker is dispatched
#[derive(Error, Debug)]
pub enum RunJudgeError {
    #[error("No workers configured")]
    NoWorkers,
}

/// Input for the RunJudge use case
#[derive(Debug, Clone)]
pub struct RunJudgeInput {
    /// Workers to dispatch, in display order
    pub workers: Vec<Worker>,
    /// Fully rendered investigation prompt, identical for every worker
    pub prompt: String,
    /// Timeout and scheduling parameters
    pub params: ExecutionParams,
}

impl RunJudgeInput {
    pub fn new(workers: Vec<Worker>, prompt: impl Into<String>) -> Self {
        Self {
            workers,
            prompt: prompt.into(),
            params: ExecutionParams::default(),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct JudgeReport {
    /// One verdict per requested worker, in request order
    pub verdicts: Vec<Verdict>,
    /// Aggregated decision across all verdicts
    pub consensus: Consensus,
}

/// Use case for running a full judge pass
pub struct RunJudgeUseCase<R: AgentRunner + 'static> {
    runner: Arc<R>,
}

impl<R: AgentRunner + 'static> RunJudgeUseCase<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunJudgeInput) -> Result<JudgeReport, RunJudgeError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunJudgeInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<JudgeReport, RunJudgeError> {
        if input.workers.is_empty() {
            return Err(RunJudgeError::NoWorkers);
        }

        info!("Starting judge run with {} workers", input.workers.len());

        let verdicts = if input.params.sequential {
            self.dispatch_sequential(&input, progress).await
        } else {
            self.dispatch_concurrent(&input, progress).await
        };

        let consensus = calculate_consensus(&verdicts);
        debug!(
            "Consensus: {} ({}% confidence, {}% agreement)",
            consensus.final_label, consensus.confidence, consensus.agreement
        );

        Ok(JudgeReport {
            verdicts,
            consensus,
        })
    }

    /// Run all workers in parallel, then restore request order
    async fn dispatch_concurrent(
        &self,
        input: &RunJudgeInput,
        progress: &dyn ProgressNotifier,
    ) -> Vec<Verdict> {
        let mut join_set = JoinSet::new();

        for worker in &input.workers {
            progress.on_worker_start(worker);

            let runner = Arc::clone(&self.runner);
            let worker = worker.clone();
            let prompt = input.prompt.clone();
            let timeout = input.params.timeout;

            join_set.spawn(async move {
                let outcome = runner.run(&worker, &prompt, timeout).await;
                (worker, outcome)
            });
        }

        let mut verdicts = Vec::new();

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((worker, outcome)) => {
                    let verdict = Self::verdict_from_outcome(&worker, outcome);
                    info!("Worker {} finished: {}", worker.name, verdict.label);
                    progress.on_worker_complete(&worker, &verdict);
                    verdicts.push(verdict);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        Self::restore_order(&input.workers, verdicts, progress)
    }

    /// Run workers one at a time, in request order
    async fn dispatch_sequential(
        &self,
        input: &RunJudgeInput,
        progress: &dyn ProgressNotifier,
    ) -> Vec<Verdict> {
        let mut verdicts = Vec::new();

        for worker in &input.workers {
            progress.on_worker_start(worker);
            let outcome = self
                .runner
                .run(worker, &input.prompt, input.params.timeout)
                .await;
            let verdict = Self::verdict_from_outcome(worker, outcome);
            info!("Worker {} finished: {}", worker.name, verdict.label);
            progress.on_worker_complete(worker, &verdict);
            verdicts.push(verdict);
        }

        verdicts
    }

    /// Sort verdicts back into request order and backfill any worker whose
    /// task never yielded a verdict (panicked task).
    fn restore_order(
        workers: &[Worker],
        mut collected: Vec<Verdict>,
        progress: &dyn ProgressNotifier,
    ) -> Vec<Verdict> {
        let mut verdicts = Vec::with_capacity(workers.len());

        for worker in workers {
            match collected.iter().position(|v| v.worker == worker.name) {
                Some(i) => verdicts.push(collected.swap_remove(i)),
                None => {
                    warn!("Worker {} produced no verdict", worker.name);
                    let verdict =
                        Verdict::process_error(&worker.name, "Worker task ended unexpectedly");
                    progress.on_worker_complete(worker, &verdict);
                    verdicts.push(verdict);
                }
            }
        }

        verdicts
    }

    /// Map a capture outcome to a verdict. Success goes through extraction;
    /// every failure mode becomes a failure verdict carrying whatever output
    /// was captured before the failure.
    fn verdict_from_outcome(worker: &Worker, outcome: CaptureOutcome) -> Verdict {
        match outcome.failure {
            None => extract_verdict_with_stderr(&worker.name, &outcome.output, &outcome.stderr),
            Some(CaptureFailure::NotFound(detail)) => Verdict::not_found(&worker.name, detail),
            Some(CaptureFailure::Timeout) => Verdict::timed_out(&worker.name, outcome.output),
            Some(CaptureFailure::Process(error)) => Verdict::process_error(&worker.name, error),
        }
    }
}
