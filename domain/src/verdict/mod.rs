//! Verdict model, extraction cascade, and consensus calculation
//!
//! A [`Verdict`] is one worker's judgment; a [`Consensus`] is the aggregate
//! across all workers in a run. Verdicts are recovered from untrusted
//! free-form agent output by [`extract_verdict`], which never fails.

pub mod consensus;
pub mod entities;
pub mod extract;
pub mod label;

pub use consensus::{Consensus, calculate_consensus};
pub use entities::{ExtractionNote, Verdict};
pub use extract::{extract_verdict, extract_verdict_with_stderr};
pub use label::VerdictLabel;
