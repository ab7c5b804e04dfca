//! Domain layer for codebase-judge
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Verdict
//!
//! Each analysis worker produces one [`Verdict`]: a label from a closed set,
//! a confidence score, and free-text findings. Workers are uncontrolled
//! external processes, so verdicts are recovered from their raw output via a
//! tiered extraction cascade that degrades gracefully instead of failing.
//!
//! ## Consensus
//!
//! All verdicts of one run are folded into a single [`Consensus`] judgment.
//! The decision order is deliberately risk-averse: a rejection that is not
//! outvoted by approvals blocks an approve outcome.

pub mod activity;
pub mod core;
pub mod prompt;
pub mod verdict;

// Re-export commonly used types
pub use activity::classify_activity;
pub use core::{error::DomainError, question::Question, worker::Worker};
pub use prompt::PromptTemplate;
pub use verdict::{
    Consensus, ExtractionNote, Verdict, VerdictLabel, calculate_consensus, extract_verdict,
    extract_verdict_with_stderr,
};
