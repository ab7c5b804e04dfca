//! Prompt templates
//!
//! Plain string substitution, no template engine. The investigation prompt
//! asks each worker to close with a single JSON object; that is a request,
//! not an enforced protocol — the extraction cascade exists because
//! compliance is not guaranteed.

use crate::core::question::Question;
use crate::verdict::entities::{Verdict, truncate_chars};

/// Raw output excerpt bound for synthesis worker reports
const RAW_EXCERPT_CHARS: usize = 3000;

const INVESTIGATION_TEMPLATE: &str = r#"Analyze this coding session and answer the question below.

## QUESTION
{question}

## YOUR TOOLS
You have FULL access to: Read, Grep, Glob, Bash. USE THEM to explore the codebase.

## WHAT YOU CAN DO
- **Code Quality**: Review structure, patterns, readability, maintainability
- **Deep Research**: Explore how things work, trace through the codebase
- **Architecture**: Analyze design decisions, dependencies, data flow
- **Bug Hunting**: Find issues, edge cases, potential problems
- **General Questions**: Answer anything about the code or conversation

## CONVERSATION
---
{context}
---

## HOW TO RESPOND
1. Use your tools to actually explore the codebase (don't just guess)
2. Show your investigation process
3. Give your honest assessment based on what you find

End with this JSON:
{"verdict": "approve|reject|concern|neutral", "confidence": <0-100>, "summary": "<your findings>", "concerns": ["<issue 1>", "<issue 2>"], "recommendations": ["<suggestion>"]}"#;

const SYNTHESIS_TEMPLATE: &str = r#"You are a brilliant AI synthesizer. You've just received analysis from multiple expert workers who investigated a coding session.

Your job: Create a clear, insightful synthesis that helps the human understand what was found.

## WORKER REPORTS
{worker_reports}

## ORIGINAL QUESTION/CONTEXT
{question}

## YOUR TASK
Synthesize the worker findings into a coherent narrative. Be intelligent, direct, helpful.

Structure your response as:

1. **Executive Summary** (2-3 sentences) - What's the bottom line?

2. **What the Workers Found**
   - Summarize each worker's key finding in 1-2 sentences
   - Note where they agree and disagree

3. **Critical Issues** (if any)
   - List the most important problems found
   - Prioritize by severity

4. **My Assessment**
   - Your synthesized view combining all worker insights
   - What the human should do next

5. **Confidence Level**
   - How confident are you in this synthesis? (High/Medium/Low)
   - What would increase confidence?

Keep it concise but thorough. No fluff. Be direct."#;

/// Template rendering for the two agent-facing prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// The shared investigation prompt sent to every worker
    pub fn investigation(question: &Question, context: &str) -> String {
        INVESTIGATION_TEMPLATE
            .replace("{question}", &question.focus_block())
            .replace("{context}", context)
    }

    /// The synthesis prompt wrapping all worker reports
    pub fn synthesis(question: &Question, verdicts: &[Verdict]) -> String {
        let reports = verdicts
            .iter()
            .map(Self::worker_report)
            .collect::<Vec<_>>()
            .join("\n---\n");

        let question_text = if question.is_empty() {
            "General analysis of the coding session".to_string()
        } else {
            question.content().to_string()
        };

        SYNTHESIS_TEMPLATE
            .replace("{worker_reports}", &reports)
            .replace("{question}", &question_text)
    }

    /// Fixed-format report for one worker, raw output excerpt bounded
    pub fn worker_report(verdict: &Verdict) -> String {
        let list_or_none = |items: &[String]| {
            if items.is_empty() {
                "None listed".to_string()
            } else {
                items.join(", ")
            }
        };

        let raw = if verdict.raw_output.is_empty() {
            "No raw output".to_string()
        } else {
            truncate_chars(&verdict.raw_output, RAW_EXCERPT_CHARS)
        };
        let truncated_marker = if verdict.raw_output.chars().count() > RAW_EXCERPT_CHARS {
            "\n[truncated]"
        } else {
            ""
        };

        format!(
            "### {}\nVerdict: {} (Confidence: {}%)\nSummary: {}\nConcerns: {}\nRecommendations: {}\n\nRaw Investigation Output:\n{}{}\n",
            verdict.worker.to_uppercase(),
            verdict.label.as_str().to_uppercase(),
            verdict.confidence,
            verdict.summary,
            list_or_none(&verdict.concerns),
            list_or_none(&verdict.recommendations),
            raw,
            truncated_marker,
        )
    }
}
