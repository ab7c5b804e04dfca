//! Application layer for codebase-judge
//!
//! Use cases orchestrate the domain logic through ports; adapters for the
//! ports live in the infrastructure and presentation layers.

pub mod config;
pub mod ports;
pub mod use_cases;

pub use config::ExecutionParams;
pub use ports::agent_runner::{AgentRunner, CaptureFailure, CaptureOutcome};
pub use ports::progress::{NoProgress, ProgressNotifier};
pub use ports::status::{StatusBoard, WorkerStatus};
pub use ports::synthesizer::Synthesizer;
pub use use_cases::run_judge::{JudgeReport, RunJudgeError, RunJudgeInput, RunJudgeUseCase};
