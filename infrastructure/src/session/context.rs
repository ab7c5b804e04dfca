//! Session transcript parsing and context extraction
//!
//! Transcripts are JSONL, one event per line. Only user and assistant
//! message events matter; meta events and malformed lines are skipped
//! rather than treated as errors, since the format is owned by another
//! tool and drifts.

use serde_json::Value;
use std::path::Path;
use tracing::debug;

const MAX_CONTEXT_MESSAGES: usize = 30;
const MAX_CONTEXT_CHARS: usize = 60_000;
const TRUNCATION_MARKER: &str = "[...earlier messages truncated]\n\n";

/// One conversational turn from a session transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl SessionMessage {
    fn speaker(&self) -> &'static str {
        if self.role == "user" { "Human" } else { "Assistant" }
    }
}

/// Parse a transcript file into its user/assistant messages
pub fn parse_session(path: &Path) -> std::io::Result<Vec<SessionMessage>> {
    let text = std::fs::read_to_string(path)?;
    let mut messages = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(event) = serde_json::from_str::<Value>(line) else {
            continue;
        };

        let role = match event.get("type").and_then(Value::as_str) {
            Some(r @ ("user" | "assistant")) => r,
            _ => continue,
        };
        if event.get("isMeta").and_then(Value::as_bool) == Some(true) {
            continue;
        }
        let Some(message) = event.get("message") else {
            continue;
        };

        messages.push(SessionMessage {
            role: role.to_string(),
            content: message_content(message),
        });
    }

    debug!(path = %path.display(), count = messages.len(), "parsed session");
    Ok(messages)
}

/// Message content is either a plain string or an array of content blocks;
/// only the text blocks are kept.
fn message_content(message: &Value) -> String {
    match message.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Format the most recent messages into the prompt context block, capped at
/// 30 messages and 60 000 characters (keeping the tail when over).
pub fn extract_context(messages: &[SessionMessage]) -> String {
    let start = messages.len().saturating_sub(MAX_CONTEXT_MESSAGES);
    let formatted: Vec<String> = messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.speaker(), m.content))
        .collect();

    let result = formatted.join("\n\n");
    if result.chars().count() <= MAX_CONTEXT_CHARS {
        return result;
    }

    let tail_start = result
        .char_indices()
        .rev()
        .nth(MAX_CONTEXT_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    format!("{}{}", TRUNCATION_MARKER, &result[tail_start..])
}
