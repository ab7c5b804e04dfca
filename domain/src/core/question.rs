//! Question value object

use serde::{Deserialize, Serialize};

/// A question to focus the analysis on (Value Object)
///
/// Represents the input query that will be embedded in every worker's
/// investigation prompt. An empty question is valid: it means "general
/// analysis of the session".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a new question
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether a focus question was actually provided
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Render the `FOCUS:` block inserted into worker prompts, or an empty
    /// string when no question was given.
    pub fn focus_block(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("\nFOCUS: {}", self.content)
        }
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}
