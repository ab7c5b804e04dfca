//! Verdict label value object

use serde::{Deserialize, Serialize};

/// Closed set of judgment labels (Value Object)
///
/// `Mixed` is consensus-only: a single worker never emits it, it appears
/// when the aggregate cannot settle on a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLabel {
    /// The work/claim is validated
    Approve,
    /// Critical issues found
    Reject,
    /// Mostly sound but with caveats
    Concern,
    /// No signal either way (also the fallback for failed extraction)
    Neutral,
    /// Consensus-only: workers disagree with no clear direction
    Mixed,
}

impl VerdictLabel {
    /// String identifier, matching the wire format requested from agents
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Approve => "approve",
            VerdictLabel::Reject => "reject",
            VerdictLabel::Concern => "concern",
            VerdictLabel::Neutral => "neutral",
            VerdictLabel::Mixed => "mixed",
        }
    }

    /// Parse a worker-emitted label. `Mixed` is not accepted here since a
    /// single agent may not emit it.
    pub fn from_worker_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "approve" => Some(VerdictLabel::Approve),
            "reject" => Some(VerdictLabel::Reject),
            "concern" => Some(VerdictLabel::Concern),
            "neutral" => Some(VerdictLabel::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
