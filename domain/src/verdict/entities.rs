//! Verdict entity

use super::label::VerdictLabel;
use serde::{Deserialize, Serialize};

/// Summaries are bounded at the extraction boundary
pub(crate) const MAX_SUMMARY_CHARS: usize = 500;

/// Diagnostic tag describing how a verdict was derived
///
/// Never surfaced in normal output, only in `--debug` / verbose views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionNote {
    /// Recovered field-by-field from broken JSON
    PartialParse,
    /// Inferred from signal phrases in unstructured text
    TextInference,
    /// Nothing recoverable at all
    ExtractionFailed,
    /// Worker exceeded its deadline
    Timeout,
    /// Worker executable could not be located
    NotFound,
    /// Process-level failure (I/O error, unexpected death)
    ProcessError,
}

impl std::fmt::Display for ExtractionNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExtractionNote::PartialParse => "partial JSON parse",
            ExtractionNote::TextInference => "inferred from text analysis",
            ExtractionNote::ExtractionFailed => "extraction failed",
            ExtractionNote::Timeout => "timeout",
            ExtractionNote::NotFound => "executable not found",
            ExtractionNote::ProcessError => "process error",
        };
        write!(f, "{}", s)
    }
}

/// One worker's judgment (Entity, immutable once created)
///
/// Every extraction path yields a well-formed verdict: label drawn from the
/// closed set, confidence in `[0, 100]`. Failures become `neutral`/0 rather
/// than errors, because agent output is inherently untrusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Worker that produced this verdict
    pub worker: String,
    /// Judgment label
    pub label: VerdictLabel,
    /// Confidence 0-100
    pub confidence: u8,
    /// Free-text findings, bounded length
    pub summary: String,
    /// Issues raised (may be empty)
    pub concerns: Vec<String>,
    /// Suggested follow-ups (may be empty)
    pub recommendations: Vec<String>,
    /// Full captured output, retained for diagnostics
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub raw_output: String,
    /// How the verdict was derived; `None` for a clean structured parse
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extraction_note: Option<ExtractionNote>,
}

impl Verdict {
    /// Create a verdict, clamping confidence and bounding the summary
    pub fn new(
        worker: impl Into<String>,
        label: VerdictLabel,
        confidence: u8,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            worker: worker.into(),
            label,
            confidence: confidence.min(100),
            summary: truncate_chars(&summary.into(), MAX_SUMMARY_CHARS),
            concerns: Vec::new(),
            recommendations: Vec::new(),
            raw_output: String::new(),
            extraction_note: None,
        }
    }

    /// Attach concerns
    pub fn with_concerns(mut self, concerns: Vec<String>) -> Self {
        self.concerns = concerns;
        self
    }

    /// Attach recommendations
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Attach the full captured output
    pub fn with_raw_output(mut self, raw_output: impl Into<String>) -> Self {
        self.raw_output = raw_output.into();
        self
    }

    /// Attach the extraction diagnostic
    pub fn with_note(mut self, note: ExtractionNote) -> Self {
        self.extraction_note = Some(note);
        self
    }

    /// Verdict for a worker whose executable could not be located
    pub fn not_found(worker: impl Into<String>, detail: impl Into<String>) -> Self {
        Verdict::new(worker, VerdictLabel::Neutral, 0, detail).with_note(ExtractionNote::NotFound)
    }

    /// Verdict for a worker that exceeded its deadline
    pub fn timed_out(worker: impl Into<String>, partial_output: impl Into<String>) -> Self {
        Verdict::new(worker, VerdictLabel::Neutral, 0, "Worker timed out")
            .with_raw_output(partial_output)
            .with_note(ExtractionNote::Timeout)
    }

    /// Verdict for a process-level failure caught at the runner boundary
    pub fn process_error(worker: impl Into<String>, error: impl Into<String>) -> Self {
        Verdict::new(worker, VerdictLabel::Neutral, 0, error)
            .with_note(ExtractionNote::ProcessError)
    }

    /// Whether this verdict carries no usable signal
    pub fn is_failed(&self) -> bool {
        self.label == VerdictLabel::Neutral && self.confidence == 0
    }
}

/// Truncate to at most `max` characters, on a char boundary
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        let v = Verdict::new("zai", VerdictLabel::Approve, 200, "ok");
        assert_eq!(v.confidence, 100);
    }

    #[test]
    fn test_summary_bounded() {
        let long = "x".repeat(2000);
        let v = Verdict::new("zai", VerdictLabel::Concern, 50, long);
        assert_eq!(v.summary.chars().count(), MAX_SUMMARY_CHARS);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        // Must not split a char boundary
        let s = "⚠️".repeat(300);
        let t = truncate_chars(&s, 500);
        assert_eq!(t.chars().count(), 500);
    }

    #[test]
    fn test_failure_constructors_are_well_formed() {
        let t = Verdict::timed_out("minimax", "partial text");
        assert!(t.is_failed());
        assert_eq!(t.extraction_note, Some(ExtractionNote::Timeout));
        assert_eq!(t.raw_output, "partial text");

        let n = Verdict::not_found("ghost", "Variant 'ghost' not found");
        assert!(n.is_failed());
        assert_eq!(n.extraction_note, Some(ExtractionNote::NotFound));
    }

    #[test]
    fn test_serde_skips_empty_diagnostics() {
        let v = Verdict::new("zai", VerdictLabel::Approve, 80, "fine");
        let json = serde_json::to_string(&v).unwrap();
        assert!(!json.contains("raw_output"));
        assert!(!json.contains("extraction_note"));
    }
}
