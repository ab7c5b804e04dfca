//! Console output formatter for judge results

use colored::{ColoredString, Colorize};
use judge_application::JudgeReport;
use judge_domain::{Consensus, Question, Verdict, VerdictLabel};
use serde_json::json;

const RAW_EXCERPT_CHARS: usize = 3000;
const DEBUG_RAW_LINES: usize = 100;
const TOP_CONCERNS: usize = 3;

/// What the console view includes
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    /// Show each worker's full investigation output
    pub verbose: bool,
    /// Dump raw output for failed extractions
    pub debug: bool,
}

pub(crate) fn verdict_icon(label: VerdictLabel) -> &'static str {
    match label {
        VerdictLabel::Approve => "✓",
        VerdictLabel::Reject => "✗",
        VerdictLabel::Concern => "!",
        VerdictLabel::Mixed => "?",
        VerdictLabel::Neutral => "○",
    }
}

pub(crate) fn paint(label: VerdictLabel, text: &str) -> ColoredString {
    match label {
        VerdictLabel::Approve => text.green(),
        VerdictLabel::Reject => text.red(),
        VerdictLabel::Concern => text.yellow(),
        VerdictLabel::Mixed => text.cyan(),
        VerdictLabel::Neutral => text.bright_black(),
    }
}

/// Formats judge results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result: banner, worker analysis, synthesis
    pub fn format(
        report: &JudgeReport,
        question: &Question,
        synthesis: Option<&str>,
        options: &DisplayOptions,
    ) -> String {
        let mut output = String::new();
        let consensus = &report.consensus;

        output.push_str(&Self::banner());
        output.push('\n');

        output.push_str(&format!(
            "  {} {} {}\n",
            "Final Verdict:".bold(),
            paint(consensus.final_label, verdict_icon(consensus.final_label)),
            paint(
                consensus.final_label,
                &consensus.final_label.as_str().to_uppercase()
            )
            .bold()
        ));
        output.push_str(&format!(
            "  {}    {}%\n",
            "Confidence:".bold(),
            consensus.confidence
        ));
        output.push_str(&format!(
            "  {}     {}%\n\n",
            "Agreement:".bold(),
            consensus.agreement
        ));

        output.push_str(&Self::section("Worker Analysis"));
        for verdict in &report.verdicts {
            output.push_str(&Self::format_worker(verdict, options));
        }

        if options.verbose {
            if !consensus.all_concerns.is_empty() {
                output.push_str(&Self::section("Concerns"));
                for concern in &consensus.all_concerns {
                    output.push_str(&format!("  {} {}\n", "•".yellow(), concern));
                }
                output.push('\n');
            }
            if !consensus.all_recommendations.is_empty() {
                output.push_str(&Self::section("Recommendations"));
                for rec in &consensus.all_recommendations {
                    output.push_str(&format!("  {} {}\n", "→".cyan(), rec));
                }
                output.push('\n');
            }
        }

        match synthesis {
            Some(text) => output.push_str(&Self::panel("Synthesis", text)),
            None => output.push_str(&Self::panel(
                "Summary",
                &Self::fallback_synthesis(question, &report.verdicts, consensus),
            )),
        }
        output.push('\n');

        output
    }

    /// The single machine-readable document
    pub fn format_json(report: &JudgeReport) -> String {
        let consensus = &report.consensus;
        let doc = json!({
            "consensus": {
                "final_verdict": consensus.final_label.as_str(),
                "confidence": consensus.confidence,
                "agreement": consensus.agreement,
                "summary": consensus.summary,
                "concerns": consensus.all_concerns,
                "recommendations": consensus.all_recommendations,
            },
            "verdicts": report.verdicts.iter().map(|v| json!({
                "worker": v.worker,
                "verdict": v.label.as_str(),
                "confidence": v.confidence,
                "summary": v.summary,
                "concerns": v.concerns,
                "recommendations": v.recommendations,
            })).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_worker(verdict: &Verdict, options: &DisplayOptions) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "  {} {} — {} ({}%)\n",
            paint(verdict.label, verdict_icon(verdict.label)),
            verdict.worker.to_uppercase().bold(),
            paint(verdict.label, verdict.label.as_str()),
            verdict.confidence
        ));
        output.push_str(&format!("    {}\n", verdict.summary.dimmed()));

        if options.debug && verdict.is_failed() {
            output.push_str(&format!("\n    {}\n", "─── DEBUG: Extraction Failed ───".red()));
            if let Some(note) = verdict.extraction_note {
                output.push_str(&format!("    {}\n", format!("Note: {note}").red()));
            }
            output.push_str(&format!(
                "    {}\n",
                format!("Raw output ({} chars):", verdict.raw_output.len()).red()
            ));
            for line in verdict.raw_output.lines().take(DEBUG_RAW_LINES) {
                output.push_str(&format!("    {line}\n"));
            }
            let total_lines = verdict.raw_output.lines().count();
            if total_lines > DEBUG_RAW_LINES {
                output.push_str(&format!(
                    "    {}\n",
                    format!("... [{} more lines]", total_lines - DEBUG_RAW_LINES).dimmed()
                ));
            }
        }

        if options.verbose {
            if !verdict.raw_output.is_empty() {
                output.push_str(&format!("\n    {}\n", "─── Investigation Chain ───".cyan()));
                for line in Self::excerpt(verdict.raw_output.trim()).lines() {
                    output.push_str(&format!("    {}\n", line.dimmed()));
                }
                output.push_str(&format!("    {}\n", "───────────────────────────".cyan()));
            }
            if !verdict.concerns.is_empty() {
                output.push_str(&format!("    {}\n", "Concerns:".yellow()));
                for concern in &verdict.concerns {
                    output.push_str(&format!("      • {concern}\n"));
                }
            }
        }

        output.push('\n');
        output
    }

    /// Deterministic narrative used when AI synthesis is unavailable
    pub fn fallback_synthesis(
        _question: &Question,
        verdicts: &[Verdict],
        consensus: &Consensus,
    ) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push(format!("{}\n", "Here's my synthesis:".bold()));

        for verdict in verdicts {
            if verdict.is_failed() {
                lines.push(format!(
                    "  {} couldn't complete analysis.",
                    verdict.worker.to_uppercase().bold()
                ));
                continue;
            }
            let stance = match verdict.label {
                VerdictLabel::Approve => "validates the work",
                VerdictLabel::Reject => "found critical issues",
                VerdictLabel::Concern => "raised concerns",
                _ => "is uncertain",
            };
            lines.push(format!(
                "  {} {} ({}%):",
                verdict.worker.to_uppercase().bold(),
                stance,
                verdict.confidence
            ));
            lines.push(format!("    {}", first_sentence(&verdict.summary)));
            lines.push(String::new());
        }

        let final_upper = consensus.final_label.as_str().to_uppercase();
        if consensus.is_unanimous() {
            lines.push(format!(
                "  {} All workers {} - they agree.",
                "Consensus:".bold(),
                final_upper
            ));
        } else if consensus.agreement >= 50 {
            lines.push(format!(
                "  {} Workers disagree. Majority says {}.",
                "Split verdict:".bold(),
                final_upper
            ));
        } else {
            lines.push(format!(
                "  {} Workers have different views.",
                "No consensus:".bold()
            ));
        }
        lines.push(String::new());

        if !consensus.all_concerns.is_empty() {
            lines.push(format!("  {}", "Key issues to address:".bold()));
            for (i, concern) in consensus.all_concerns.iter().take(TOP_CONCERNS).enumerate() {
                lines.push(format!("    {}. {}", i + 1, concern));
            }
            if consensus.all_concerns.len() > TOP_CONCERNS {
                lines.push(format!(
                    "    ... and {} more (use --verbose to see all)",
                    consensus.all_concerns.len() - TOP_CONCERNS
                ));
            }
            lines.push(String::new());
        }

        lines.push(format!("  {}", "Bottom line:".bold()));
        match consensus.final_label {
            VerdictLabel::Approve => {
                lines.push(format!(
                    "    {} Workers validated your work.",
                    "You're good to go.".green()
                ));
            }
            VerdictLabel::Reject => {
                lines.push(format!(
                    "    {} Critical issues found that need addressing.",
                    "Stop and fix.".red()
                ));
                if let Some(rec) = consensus.all_recommendations.first() {
                    lines.push(format!("\n  {}", "Priority fix:".bold()));
                    lines.push(format!("    {rec}"));
                }
            }
            VerdictLabel::Concern => {
                lines.push(format!(
                    "    {} The work is mostly solid but has gaps.",
                    "Review needed.".yellow()
                ));
                if let Some(rec) = consensus.all_recommendations.first() {
                    lines.push(format!("\n  {}", "Top recommendation:".bold()));
                    lines.push(format!("    {rec}"));
                }
            }
            _ => {
                lines.push(format!(
                    "    {} Workers couldn't reach agreement - use your judgment.",
                    "Unclear.".cyan()
                ));
            }
        }

        lines.join("\n")
    }

    /// Middle-truncate very long raw output for the verbose view
    fn excerpt(raw: &str) -> String {
        let total = raw.chars().count();
        if total <= RAW_EXCERPT_CHARS {
            return raw.to_string();
        }
        let half = RAW_EXCERPT_CHARS / 2;
        let head: String = raw.chars().take(half).collect();
        let tail: String = {
            let skip = total - half;
            raw.chars().skip(skip).collect()
        };
        format!(
            "{head}\n\n... [truncated {} chars] ...\n\n{tail}",
            total - RAW_EXCERPT_CHARS
        )
    }

    fn banner() -> String {
        let top = "╔══════════════════════════════════════════════════════════╗";
        let mid = "║                      JUDGE VERDICT                       ║";
        let bottom = "╚══════════════════════════════════════════════════════════╝";
        format!("\n{}\n{}\n{}\n", top.bold(), mid.bold(), bottom.bold())
    }

    fn section(title: &str) -> String {
        let pad = 58usize.saturating_sub(title.len() + 2);
        let left = pad / 2;
        let right = pad - left;
        format!(
            "{}\n\n",
            format!("{} {} {}", "─".repeat(left), title, "─".repeat(right)).dimmed()
        )
    }

    fn panel(title: &str, text: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\n{}\n",
            format!("╭─ {} {}╮", title, "─".repeat(53usize.saturating_sub(title.len())))
                .cyan()
                .bold()
        ));
        output.push_str(text);
        output.push('\n');
        output.push_str(&format!("{}\n", format!("╰{}╯", "─".repeat(56)).cyan()));
        output
    }
}

fn first_sentence(summary: &str) -> String {
    let sentence = match summary.split_once(". ") {
        Some((first, _)) => format!("{first}."),
        None => summary.to_string(),
    };
    if sentence.chars().count() > 300 {
        let cut: String = sentence.chars().take(300).collect();
        format!("{cut}...")
    } else {
        sentence
    }
}
