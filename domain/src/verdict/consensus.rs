//! Consensus calculation
//!
//! Folds all verdicts of one run into a single judgment. The decision order
//! is asymmetric on purpose: a rejection that is not outvoted by approvals
//! blocks an approve outcome, and approve must strictly outnumber the
//! combined concern and reject votes.

use super::entities::Verdict;
use super::label::VerdictLabel;
use serde::{Deserialize, Serialize};

/// Aggregate judgment across all verdicts of one run (immutable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    /// Final label; never `neutral` — absence of signal collapses to `mixed`
    pub final_label: VerdictLabel,
    /// Mean worker confidence, discounted by disagreement
    pub confidence: u8,
    /// Percentage of workers sharing the majority label
    pub agreement: u8,
    /// Derived human-readable summary
    pub summary: String,
    /// Deduplicated union of worker concerns
    pub all_concerns: Vec<String>,
    /// Deduplicated union of worker recommendations
    pub all_recommendations: Vec<String>,
}

impl Consensus {
    /// Whether every worker landed on the same label
    pub fn is_unanimous(&self) -> bool {
        self.agreement == 100
    }
}

/// Derive the consensus from a finished verdict collection.
///
/// An empty collection yields the degenerate `{mixed, 0, 0}` result.
pub fn calculate_consensus(verdicts: &[Verdict]) -> Consensus {
    if verdicts.is_empty() {
        return Consensus {
            final_label: VerdictLabel::Mixed,
            confidence: 0,
            agreement: 0,
            summary: "No worker verdicts available".to_string(),
            all_concerns: Vec::new(),
            all_recommendations: Vec::new(),
        };
    }

    let count = |label: VerdictLabel| verdicts.iter().filter(|v| v.label == label).count();
    let approve = count(VerdictLabel::Approve);
    let reject = count(VerdictLabel::Reject);
    let concern = count(VerdictLabel::Concern);
    let neutral = count(VerdictLabel::Neutral);

    // Decision order, first rule wins. Biased toward caution.
    let final_label = if reject > 0 && reject >= approve {
        VerdictLabel::Reject
    } else if approve > concern + reject {
        VerdictLabel::Approve
    } else if concern > 0 || reject > 0 {
        VerdictLabel::Concern
    } else {
        VerdictLabel::Mixed
    };

    let total = verdicts.len();
    let max_count = approve.max(reject).max(concern).max(neutral);
    let agreement = ((max_count as f64 / total as f64) * 100.0).round() as u8;

    let avg_confidence =
        verdicts.iter().map(|v| v.confidence as f64).sum::<f64>() / total as f64;
    let confidence = (avg_confidence * (agreement as f64 / 100.0)).round() as u8;

    let all_concerns = dedup_union(verdicts.iter().flat_map(|v| v.concerns.iter()));
    let all_recommendations = dedup_union(verdicts.iter().flat_map(|v| v.recommendations.iter()));

    let mut parts = vec![format!("{} workers analyzed.", total)];
    if agreement == 100 {
        parts.push(format!("Unanimous: {}.", final_label.as_str().to_uppercase()));
    } else {
        parts.push(format!(
            "{}% agreement: {}.",
            agreement,
            final_label.as_str().to_uppercase()
        ));
    }
    if !all_concerns.is_empty() {
        parts.push(format!("{} concern(s) raised.", all_concerns.len()));
    }

    Consensus {
        final_label,
        confidence,
        agreement,
        summary: parts.join(" "),
        all_concerns,
        all_recommendations,
    }
}

/// Deduplicated union, first occurrence kept (order not guaranteed stable
/// across runs beyond that)
fn dedup_union<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.as_str()) {
            out.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(label: VerdictLabel, confidence: u8) -> Verdict {
        Verdict::new("w", label, confidence, "")
    }

    #[test]
    fn test_empty_collection_is_mixed_degenerate() {
        let c = calculate_consensus(&[]);
        assert_eq!(c.final_label, VerdictLabel::Mixed);
        assert_eq!(c.confidence, 0);
        assert_eq!(c.agreement, 0);
    }

    #[test]
    fn test_unanimous_approve() {
        let vs = vec![
            verdict(VerdictLabel::Approve, 80),
            verdict(VerdictLabel::Approve, 90),
        ];
        let c = calculate_consensus(&vs);
        assert_eq!(c.final_label, VerdictLabel::Approve);
        assert_eq!(c.agreement, 100);
        assert!(c.is_unanimous());
        assert_eq!(c.confidence, 85);
    }

    #[test]
    fn test_reject_dominance_on_tie() {
        // reject (2) >= approve (1): rule 1 fires
        let vs = vec![
            verdict(VerdictLabel::Approve, 90),
            verdict(VerdictLabel::Reject, 60),
            verdict(VerdictLabel::Reject, 60),
        ];
        let c = calculate_consensus(&vs);
        assert_eq!(c.final_label, VerdictLabel::Reject);
        assert_eq!(c.agreement, 67);
    }

    #[test]
    fn test_single_reject_ties_single_approve() {
        // 1 reject >= 1 approve: still reject, not a majority vote
        let vs = vec![
            verdict(VerdictLabel::Approve, 90),
            verdict(VerdictLabel::Reject, 50),
        ];
        let c = calculate_consensus(&vs);
        assert_eq!(c.final_label, VerdictLabel::Reject);
    }

    #[test]
    fn test_approve_must_strictly_outnumber_others() {
        // approve (3) > concern + reject (1)
        let vs = vec![
            verdict(VerdictLabel::Approve, 80),
            verdict(VerdictLabel::Approve, 80),
            verdict(VerdictLabel::Approve, 80),
            verdict(VerdictLabel::Concern, 50),
        ];
        let c = calculate_consensus(&vs);
        assert_eq!(c.final_label, VerdictLabel::Approve);
        assert_eq!(c.agreement, 75);
    }

    #[test]
    fn test_concern_when_approve_does_not_dominate() {
        // approve (1) is not > concern + reject (1), concern > 0
        let vs = vec![
            verdict(VerdictLabel::Approve, 80),
            verdict(VerdictLabel::Concern, 50),
        ];
        let c = calculate_consensus(&vs);
        assert_eq!(c.final_label, VerdictLabel::Concern);
    }

    #[test]
    fn test_all_neutral_is_mixed() {
        let vs = vec![
            verdict(VerdictLabel::Neutral, 0),
            verdict(VerdictLabel::Neutral, 20),
        ];
        let c = calculate_consensus(&vs);
        assert_eq!(c.final_label, VerdictLabel::Mixed);
        assert_eq!(c.agreement, 100);
    }

    #[test]
    fn test_disagreement_discounts_confidence() {
        // avg 90, agreement 50% -> 45
        let vs = vec![
            verdict(VerdictLabel::Approve, 90),
            verdict(VerdictLabel::Concern, 90),
        ];
        let c = calculate_consensus(&vs);
        assert_eq!(c.agreement, 50);
        assert_eq!(c.confidence, 45);
    }

    #[test]
    fn test_agreement_formula() {
        let vs = vec![
            verdict(VerdictLabel::Approve, 50),
            verdict(VerdictLabel::Reject, 50),
            verdict(VerdictLabel::Concern, 50),
        ];
        let c = calculate_consensus(&vs);
        // max label count 1 of 3
        assert_eq!(c.agreement, 33);
    }

    #[test]
    fn test_concerns_deduplicated() {
        let a = verdict(VerdictLabel::Concern, 50)
            .with_concerns(vec!["no tests".into(), "race".into()]);
        let b = verdict(VerdictLabel::Concern, 50)
            .with_concerns(vec!["race".into(), "leak".into()])
            .with_recommendations(vec!["add lock".into(), "add lock".into()]);
        let c = calculate_consensus(&[a, b]);
        assert_eq!(c.all_concerns.len(), 3);
        assert_eq!(c.all_recommendations, vec!["add lock".to_string()]);
        assert!(c.summary.contains("3 concern(s)"));
    }
}
