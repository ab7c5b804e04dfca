//! Synthesis port
//!
//! Hands a fixed-format report per worker to a higher-tier agent and gets
//! back a free-text narrative, or nothing. Absence triggers the
//! presentation layer's deterministic fallback narrative.

use async_trait::async_trait;
use judge_domain::{Consensus, Question, Verdict};

/// Port for the optional AI synthesis pass
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Returns the synthesized narrative, or `None` on any failure
    async fn synthesize(
        &self,
        question: &Question,
        verdicts: &[Verdict],
        consensus: &Consensus,
    ) -> Option<String>;
}
