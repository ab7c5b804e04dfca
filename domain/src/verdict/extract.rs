//! Verdict extraction cascade
//!
//! Agents are uncontrolled text generators: the closing JSON object we ask
//! for is a request, not a protocol. Extraction is therefore an explicit
//! ordered list of named strategies, each a pure `&str -> Option<Draft>`,
//! tried in sequence with the final strategy guaranteed to succeed. Only one
//! tier ever fires:
//!
//! 1. Structural JSON match (all five fields, in order)
//! 2. Loosest JSON match (last brace fragment mentioning `"verdict"`)
//! 3. Field-by-field regex recovery
//! 4. Signal-based text inference
//! 5. Hard failure (empty output)

use super::entities::{ExtractionNote, MAX_SUMMARY_CHARS, Verdict, truncate_chars};
use super::label::VerdictLabel;
use regex::Regex;
use std::sync::LazyLock;

/// Intermediate result of a single extraction tier
struct Draft {
    label: VerdictLabel,
    confidence: u8,
    summary: String,
    concerns: Vec<String>,
    recommendations: Vec<String>,
    note: Option<ExtractionNote>,
}

type Tier = fn(&str) -> Option<Draft>;

/// The cascade, in priority order. Names exist for tier-by-tier testing and
/// trace diagnostics.
const TIERS: &[(&str, Tier)] = &[
    ("structural-json", tier_structural_json),
    ("loose-json", tier_loose_json),
    ("field-recovery", tier_field_recovery),
    ("signal-inference", tier_signal_inference),
];

/// Full five-field JSON object, fields in the requested order, tolerating a
/// nested array in `recommendations` and a trailing comma before the brace.
static STRUCTURAL_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\s*"verdict"\s*:\s*"[^"]+"\s*,\s*"confidence"\s*:\s*\d+.*?"recommendations"\s*:\s*\[.*?\]\s*,?\s*\}"#,
    )
    .expect("structural json pattern")
});

/// Any flat brace fragment containing a `"verdict"` key
static BRACED_VERDICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[^{}]*"verdict"[^{}]*\}"#).expect("braced verdict pattern"));

/// Most permissive: any fragment up to a closing brace with a valid label
static PERMISSIVE_VERDICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[^}]*"verdict"\s*:\s*"(approve|reject|concern|neutral)"[^}]*\}"#)
        .expect("permissive verdict pattern")
});

static FIELD_VERDICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""verdict"\s*:\s*"(approve|reject|concern|neutral)""#).expect("verdict field")
});
static FIELD_CONFIDENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""confidence"\s*:\s*(\d+)"#).expect("confidence field"));
static FIELD_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""summary"\s*:\s*"([^"]*)""#).expect("summary field"));

static TRAILING_COMMA_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("trailing comma object"));
static TRAILING_COMMA_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("trailing comma array"));

/// Phrases suggesting the finding was validated
const APPROVE_SIGNALS: &[&str] = &[
    "real bug",
    "vulnerability is proven",
    "verified",
    "confirmed",
    "correct",
    "✅",
    "valid finding",
];

/// Phrases suggesting refutation / false positive
const REJECT_SIGNALS: &[&str] = &[
    "not a bug",
    "invalid",
    "false positive",
    "incorrect",
    "doesn't exist",
    "no vulnerability",
];

/// Hedging / caveat phrases
const CONCERN_SIGNALS: &[&str] = &[
    "concern",
    "issue",
    "problem",
    "discrepancy",
    "missing",
    "⚠️",
    "however",
    "but",
];

/// Section headers worth mining for an extractive summary
const SUMMARY_HEADERS: &[&str] = &["conclusion", "summary", "core issue", "bottom line", "verdict"];

/// Extract a verdict from raw worker output. Never fails.
pub fn extract_verdict(worker: &str, output: &str) -> Verdict {
    extract_verdict_with_stderr(worker, output, "")
}

/// Extract a verdict, referencing the captured diagnostic stream in the
/// bottom-tier summary when nothing at all is recoverable.
pub fn extract_verdict_with_stderr(worker: &str, output: &str, stderr: &str) -> Verdict {
    for (_name, tier) in TIERS {
        if let Some(draft) = tier(output) {
            let mut verdict = Verdict::new(worker, draft.label, draft.confidence, draft.summary)
                .with_concerns(draft.concerns)
                .with_recommendations(draft.recommendations)
                .with_raw_output(output);
            if let Some(note) = draft.note {
                verdict = verdict.with_note(note);
            }
            return verdict;
        }
    }

    // Tier 5: nothing recoverable (empty or whitespace-only output)
    let stderr_excerpt = if stderr.trim().is_empty() {
        "none".to_string()
    } else {
        truncate_chars(stderr, 200)
    };
    Verdict::new(
        worker,
        VerdictLabel::Neutral,
        0,
        format!("Failed to parse worker response. Stderr: {}", stderr_excerpt),
    )
    .with_raw_output(output)
    .with_note(ExtractionNote::ExtractionFailed)
}

/// Tier 1: structural match on the full five-field object
fn tier_structural_json(output: &str) -> Option<Draft> {
    let m = STRUCTURAL_JSON.find(output)?;
    parse_json_fragment(m.as_str())
}

/// Tier 2: last brace-delimited fragment mentioning `"verdict"`
fn tier_loose_json(output: &str) -> Option<Draft> {
    let fragment = BRACED_VERDICT
        .find_iter(output)
        .last()
        .or_else(|| PERMISSIVE_VERDICT.find(output))?;
    parse_json_fragment(fragment.as_str())
}

/// Repair common JSON damage and map the object onto a draft
fn parse_json_fragment(fragment: &str) -> Option<Draft> {
    let repaired = TRAILING_COMMA_OBJECT.replace_all(fragment, "}");
    let repaired = TRAILING_COMMA_ARRAY.replace_all(&repaired, "]");

    let value: serde_json::Value = serde_json::from_str(&repaired).ok()?;
    let obj = value.as_object()?;

    let label = obj
        .get("verdict")
        .and_then(|v| v.as_str())
        .and_then(VerdictLabel::from_worker_str)
        .unwrap_or(VerdictLabel::Neutral);
    let confidence = obj
        .get("confidence")
        .and_then(|v| v.as_u64())
        .unwrap_or(50)
        .min(100) as u8;
    let summary = obj
        .get("summary")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Some(Draft {
        label,
        confidence,
        summary,
        concerns: string_list(obj.get("concerns")),
        recommendations: string_list(obj.get("recommendations")),
        note: None,
    })
}

/// Keep only string entries of an optional JSON array
fn string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Tier 3: recover verdict/confidence/summary independently from broken JSON
fn tier_field_recovery(output: &str) -> Option<Draft> {
    let label = FIELD_VERDICT
        .captures(output)
        .and_then(|c| VerdictLabel::from_worker_str(&c[1]))?;

    let confidence = FIELD_CONFIDENCE
        .captures(output)
        .and_then(|c| c[1].parse::<u64>().ok())
        .unwrap_or(50)
        .min(100) as u8;

    let summary = FIELD_SUMMARY
        .captures(output)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "Partial parse - see raw output".to_string());

    Some(Draft {
        label,
        confidence,
        summary,
        concerns: Vec::new(),
        recommendations: Vec::new(),
        note: Some(ExtractionNote::PartialParse),
    })
}

/// Tier 4: infer a verdict from signal phrases in unstructured text
fn tier_signal_inference(output: &str) -> Option<Draft> {
    if output.trim().is_empty() {
        return None;
    }

    let lower = output.to_lowercase();
    let approve_count = count_signals(&lower, APPROVE_SIGNALS);
    let reject_count = count_signals(&lower, REJECT_SIGNALS);
    let concern_count = count_signals(&lower, CONCERN_SIGNALS);

    let summary = extract_section_summary(output)
        .unwrap_or_else(|| "Analysis completed but no JSON verdict provided.".to_string());
    let summary = truncate_chars(&summary, MAX_SUMMARY_CHARS);

    // Strong confirmation language short-circuits the counting, downgraded
    // to concern when refutation phrasing coexists.
    if lower.contains("real bug")
        || lower.contains("vulnerability is proven")
        || lower.contains("verified")
    {
        let label = if reject_count == 0 {
            VerdictLabel::Approve
        } else {
            VerdictLabel::Concern
        };
        let confidence = if approve_count > 3 { 70 } else { 50 };
        return Some(Draft {
            label,
            confidence,
            summary,
            concerns: Vec::new(),
            recommendations: Vec::new(),
            note: Some(ExtractionNote::TextInference),
        });
    }

    let (label, confidence) = if approve_count > reject_count && approve_count > concern_count {
        (VerdictLabel::Approve, signal_confidence(approve_count, 5))
    } else if reject_count > approve_count {
        (VerdictLabel::Reject, signal_confidence(reject_count, 5))
    } else if concern_count > 0 {
        (VerdictLabel::Concern, signal_confidence(concern_count, 3))
    } else {
        (VerdictLabel::Neutral, 20)
    };

    Some(Draft {
        label,
        confidence,
        summary,
        concerns: Vec::new(),
        recommendations: Vec::new(),
        note: Some(ExtractionNote::TextInference),
    })
}

/// Total non-overlapping occurrences across all phrases of a category
fn count_signals(lower: &str, signals: &[&str]) -> usize {
    signals.iter().map(|s| lower.matches(s).count()).sum()
}

/// Bounded linear confidence: 30 + n*weight, capped at 60
fn signal_confidence(count: usize, weight: usize) -> u8 {
    (30 + count * weight).min(60) as u8
}

/// Mine a conventional section header (conclusion, summary, ...) for up to
/// three following non-empty lines.
fn extract_section_summary(output: &str) -> Option<String> {
    for header in SUMMARY_HEADERS {
        let pattern = format!(r"(?im)^#{{2,3}}\s*{}\b", regex::escape(header));
        let re = Regex::new(&pattern).ok()?;
        let Some(m) = re.find(output) else { continue };

        let window = truncate_chars(&output[m.start()..], 500);
        let summary = window
            .lines()
            .skip(1)
            .take(3)
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect::<Vec<_>>()
            .join(" ");

        if !summary.is_empty() {
            return Some(summary);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Tier 1: structural JSON ====================

    #[test]
    fn test_structural_json_exact() {
        let text = r#"Investigation done.
{"verdict":"reject","confidence":80,"summary":"s","concerns":[],"recommendations":[]}"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Reject);
        assert_eq!(v.confidence, 80);
        assert_eq!(v.summary, "s");
        assert_eq!(v.extraction_note, None);
    }

    #[test]
    fn test_structural_json_trailing_comma_repaired() {
        let text = r#"{"verdict":"approve","confidence":90,"summary":"ok","concerns":[],"recommendations":[],}"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Approve);
        assert_eq!(v.confidence, 90);
        assert_eq!(v.summary, "ok");
    }

    #[test]
    fn test_structural_json_with_fields() {
        let text = r#"{"verdict": "concern", "confidence": 65, "summary": "gaps found", "concerns": ["no tests", "race condition"], "recommendations": ["add lock"]}"#;
        let v = extract_verdict("minimax", text);
        assert_eq!(v.label, VerdictLabel::Concern);
        assert_eq!(v.concerns, vec!["no tests", "race condition"]);
        assert_eq!(v.recommendations, vec!["add lock"]);
    }

    #[test]
    fn test_structural_json_nested_recommendations_tolerated() {
        let text = r#"{"verdict": "approve", "confidence": 75, "summary": "fine", "concerns": [], "recommendations": [["grouped", "items"]]}"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Approve);
        assert_eq!(v.confidence, 75);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        // Loose-tier object with only a verdict key
        let text = r#"Final answer: {"verdict": "approve"}"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Approve);
        assert_eq!(v.confidence, 50);
        assert_eq!(v.summary, "");
    }

    // ==================== Tier 2: loose JSON ====================

    #[test]
    fn test_loose_json_last_fragment_wins() {
        let text = r#"Draft: {"verdict": "approve", "confidence": 40}
Revised: {"verdict": "reject", "confidence": 85}"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Reject);
        assert_eq!(v.confidence, 85);
    }

    // ==================== Tier 3: field recovery ====================

    #[test]
    fn test_field_recovery_from_broken_json() {
        // Unclosed array makes the fragment unparseable as JSON
        let text = r#"{"verdict": "reject", "confidence": 70, "summary": "leaks fd", "concerns": [}"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Reject);
        assert_eq!(v.confidence, 70);
        assert_eq!(v.summary, "leaks fd");
        assert_eq!(v.extraction_note, Some(ExtractionNote::PartialParse));
        assert!(v.concerns.is_empty());
    }

    #[test]
    fn test_field_recovery_requires_verdict() {
        // Confidence alone is not enough; falls through to inference
        let text = r#"{"confidence": 99, "summary": "no label here"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.extraction_note, Some(ExtractionNote::TextInference));
    }

    // ==================== Tier 4: signal inference ====================

    #[test]
    fn test_inference_three_reject_occurrences() {
        let text = "This is a false positive. Another false positive. \
                    The third case is also a false positive.";
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Reject);
        assert_eq!(v.confidence, 45); // min(60, 30 + 3*5)
        assert_eq!(v.extraction_note, Some(ExtractionNote::TextInference));
    }

    #[test]
    fn test_inference_confidence_capped_at_60() {
        let text = "false positive. ".repeat(10);
        let v = extract_verdict("zai", &text);
        assert_eq!(v.label, VerdictLabel::Reject);
        assert_eq!(v.confidence, 60);
    }

    #[test]
    fn test_inference_strong_confirmation() {
        let text = "The vulnerability is proven by the repro in the session.";
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Approve);
        assert_eq!(v.confidence, 50);
    }

    #[test]
    fn test_inference_strong_confirmation_with_refutation_downgrades() {
        let text = "Verified in part, though the second claim is a false positive.";
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Concern);
    }

    #[test]
    fn test_inference_concern_phrasing() {
        let text = "There is an issue here. However, the problem is localized.";
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Concern);
    }

    #[test]
    fn test_inference_no_signal_floor() {
        let text = "The weather in the codebase is sunny today.";
        let v = extract_verdict("zai", text);
        assert_eq!(v.label, VerdictLabel::Neutral);
        assert_eq!(v.confidence, 20);
    }

    #[test]
    fn test_inference_section_summary() {
        let text = "lots of narration\n\n### Conclusion\nThe handler drops errors.\nCallers never see failures.\n";
        let v = extract_verdict("zai", text);
        assert_eq!(
            v.summary,
            "The handler drops errors. Callers never see failures."
        );
    }

    // ==================== Tier 5: hard failure ====================

    #[test]
    fn test_empty_output_is_failed_verdict() {
        let v = extract_verdict_with_stderr("zai", "", "connection refused");
        assert!(v.is_failed());
        assert_eq!(v.extraction_note, Some(ExtractionNote::ExtractionFailed));
        assert!(v.summary.contains("connection refused"));
    }

    #[test]
    fn test_whitespace_output_references_no_stderr() {
        let v = extract_verdict("zai", "   \n\t ");
        assert!(v.is_failed());
        assert!(v.summary.contains("none"));
    }

    // ==================== Totality ====================

    #[test]
    fn test_never_fails_on_hostile_input() {
        for text in [
            "",
            "{{{{",
            "}}}}",
            r#"{"verdict":"#,
            "\u{0}\u{1}\u{2}",
            "verdict verdict verdict",
            r#"{"verdict": 42}"#,
        ] {
            let v = extract_verdict("zai", text);
            assert!(v.confidence <= 100);
        }
    }

    #[test]
    fn test_raw_output_retained() {
        let text = r#"{"verdict": "approve"}"#;
        let v = extract_verdict("zai", text);
        assert_eq!(v.raw_output, text);
    }
}
