//! Activity classification
//!
//! Maps one line of raw agent output to a short human-readable "what is it
//! doing" label for the live display. The mapping is a prioritized table of
//! (predicate, extractor) rules; the first matching category wins, and
//! unrecognized lines yield `None` so the caller keeps showing prior state.
//!
//! Labels stay within ~55 displayed characters; file/search/command rules
//! try to pull the concrete target out of quoted or backticked spans and
//! fall back to a generic phrase for the category.

use regex::Regex;
use std::sync::LazyLock;

type Rule = fn(line: &str, lower: &str) -> Option<String>;

/// Ordered classification table; names exist for targeted tests.
const RULES: &[(&str, Rule)] = &[
    ("read-file", rule_read_file),
    ("search", rule_search),
    ("glob", rule_glob),
    ("command", rule_command),
    ("tool-result", rule_tool_result),
    ("investigate", rule_investigate),
    ("verify", rule_verify),
    ("analyze", rule_analyze),
    ("examine", rule_examine),
    ("code-fence", rule_code_fence),
    ("file-mention", rule_file_mention),
    ("line-reference", rule_line_reference),
    ("code-flow", rule_code_flow),
];

static FILE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"[`"']?([A-Za-z0-9_./-]+\.(?:go|ts|tsx|js|jsx|py|rs|md|json|yaml|toml|txt|sh|sql|html|css|c|cpp|h|hpp|java|kt|rb|php|swift|sol|move))[`"']?"#,
    )
    .expect("file path pattern")
});

static BACKTICKED_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([A-Za-z0-9_./]+\.(?:go|ts|tsx|js|jsx|py|rs|md|json|yaml|toml|sol|move))`")
        .expect("backticked file pattern")
});

static SEARCH_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:for|pattern)\s*[`"']([^`"']+)[`"']"#).expect("search term pattern")
});

static QUOTED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[`"']([^`"']+)[`"']"#).expect("quoted span pattern"));

static TOOL_RESULT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"file_path["']?\s*[:=]\s*["']?([^"'}\s,]+)"#).expect("tool result pattern")
});

static LINE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"line\s*\d+|:\d+:").expect("line reference pattern"));

/// Classify one output line. Pure; `None` means "no recognizable activity".
pub fn classify_activity(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let lower = line.to_lowercase();
    RULES.iter().find_map(|(_name, rule)| rule(line, &lower))
}

fn contains_any(lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| lower.contains(n))
}

/// Keep at most the last `n` characters (paths are most specific at the end)
fn tail_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    let (idx, _) = s.char_indices().nth(count - n).unwrap_or((0, ' '));
    &s[idx..]
}

/// Keep at most the first `n` characters
fn head_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn rule_read_file(line: &str, lower: &str) -> Option<String> {
    if !contains_any(
        lower,
        &["read tool", "reading file", "let me read", "i'll read", "reading the"],
    ) {
        return None;
    }
    Some(match FILE_PATH.captures(line) {
        Some(c) => format!("Reading {}", tail_chars(c.get(1).unwrap().as_str(), 50)),
        None => "Reading file...".to_string(),
    })
}

fn rule_search(line: &str, lower: &str) -> Option<String> {
    if !contains_any(
        lower,
        &[
            "grep tool",
            "searching for",
            "let me search",
            "i'll search",
            "i'll grep",
            "searching the",
            "grep for",
        ],
    ) {
        return None;
    }
    Some(match SEARCH_TERM.captures(line) {
        Some(c) => format!("Searching: '{}'", head_chars(c.get(1).unwrap().as_str(), 30)),
        None => "Searching codebase...".to_string(),
    })
}

fn rule_glob(_line: &str, lower: &str) -> Option<String> {
    contains_any(
        lower,
        &["glob tool", "finding files", "let me find", "looking for files", "i'll find"],
    )
    .then(|| "Finding files...".to_string())
}

fn rule_command(line: &str, lower: &str) -> Option<String> {
    if !contains_any(
        lower,
        &["bash tool", "running command", "let me run", "i'll run", "executing", "running:"],
    ) {
        return None;
    }
    if let Some(c) = QUOTED_SPAN.captures(line) {
        let cmd = c.get(1).unwrap().as_str();
        if cmd.chars().count() < 50 {
            return Some(format!("Running: {}", head_chars(cmd, 40)));
        }
    }
    Some("Running command...".to_string())
}

/// Structural tool-result fragments the agent echoes after tool use
fn rule_tool_result(line: &str, lower: &str) -> Option<String> {
    if !lower.contains("file_path") || lower.contains("result") {
        return None;
    }
    TOOL_RESULT_PATH
        .captures(line)
        .map(|c| format!("Reading {}", tail_chars(c.get(1).unwrap().as_str(), 50)))
}

fn rule_investigate(_line: &str, lower: &str) -> Option<String> {
    contains_any(
        lower,
        &["let me investigate", "investigating", "i need to check", "checking the"],
    )
    .then(|| "Investigating...".to_string())
}

fn rule_verify(_line: &str, lower: &str) -> Option<String> {
    contains_any(lower, &["let me verify", "verifying", "i'll verify"])
        .then(|| "Verifying...".to_string())
}

fn rule_analyze(_line: &str, lower: &str) -> Option<String> {
    contains_any(lower, &["analyzing", "let me analyze", "i'll analyze"])
        .then(|| "Analyzing...".to_string())
}

fn rule_examine(_line: &str, lower: &str) -> Option<String> {
    contains_any(lower, &["examining", "let me examine", "looking at"])
        .then(|| "Examining code...".to_string())
}

fn rule_code_fence(line: &str, _lower: &str) -> Option<String> {
    (line.starts_with("```") && line.contains('/')).then(|| "Showing code...".to_string())
}

fn rule_file_mention(line: &str, _lower: &str) -> Option<String> {
    BACKTICKED_FILE
        .captures(line)
        .map(|c| format!("Looking at {}", tail_chars(c.get(1).unwrap().as_str(), 50)))
}

fn rule_line_reference(_line: &str, lower: &str) -> Option<String> {
    LINE_REFERENCE
        .is_match(lower)
        .then(|| "Examining specific lines...".to_string())
}

fn rule_code_flow(line: &str, lower: &str) -> Option<String> {
    (contains_any(lower, &["function", "method", "calls", "implementation"])
        && line.chars().count() < 100)
        .then(|| "Tracing code flow...".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_line_is_silent() {
        assert_eq!(classify_activity(""), None);
        assert_eq!(classify_activity("   \t"), None);
    }

    #[test]
    fn test_read_with_path() {
        let label = classify_activity("Let me read `src/auth/session.rs` next").unwrap();
        assert_eq!(label, "Reading src/auth/session.rs");
    }

    #[test]
    fn test_read_without_path_falls_back() {
        assert_eq!(
            classify_activity("I'll read the relevant module").unwrap(),
            "Reading file..."
        );
    }

    #[test]
    fn test_search_with_term() {
        let label = classify_activity("Searching for 'validate_token' in the handlers").unwrap();
        assert_eq!(label, "Searching: 'validate_token'");
    }

    #[test]
    fn test_search_term_bounded() {
        let long = "x".repeat(80);
        let label = classify_activity(&format!("grep for '{}'", long)).unwrap();
        assert!(label.chars().count() <= 55);
    }

    #[test]
    fn test_command_with_target() {
        let label = classify_activity("I'll run `cargo test` to confirm").unwrap();
        assert_eq!(label, "Running: cargo test");
    }

    #[test]
    fn test_command_long_target_falls_back() {
        let long = "a".repeat(60);
        let label = classify_activity(&format!("Running command `{}`", long)).unwrap();
        assert_eq!(label, "Running command...");
    }

    #[test]
    fn test_tool_result_fragment() {
        let label = classify_activity(r#"file_path: "core/api/router.go","#).unwrap();
        assert_eq!(label, "Reading core/api/router.go");
    }

    #[test]
    fn test_tool_result_skips_results() {
        assert_eq!(classify_activity("file_path result: ok"), None);
    }

    #[test]
    fn test_generic_phases() {
        assert_eq!(
            classify_activity("Investigating the login path").unwrap(),
            "Investigating..."
        );
        assert_eq!(
            classify_activity("Verifying the claim now").unwrap(),
            "Verifying..."
        );
        assert_eq!(
            classify_activity("Analyzing the data flow").unwrap(),
            "Analyzing..."
        );
        assert_eq!(
            classify_activity("Looking at the dispatcher").unwrap(),
            "Examining code..."
        );
    }

    #[test]
    fn test_priority_read_beats_examine() {
        // Matches both read and examine phrasing; read comes first
        let label = classify_activity("Let me read what this is looking at").unwrap();
        assert_eq!(label, "Reading file...");
    }

    #[test]
    fn test_file_mention() {
        let label = classify_activity("The bug lives in `pkg/util/retry.go` as suspected").unwrap();
        assert_eq!(label, "Looking at pkg/util/retry.go");
    }

    #[test]
    fn test_long_path_keeps_tail() {
        let path = format!("{}/leaf.rs", "deep/".repeat(20));
        let label = classify_activity(&format!("Reading file `{}`", path)).unwrap();
        assert!(label.ends_with("leaf.rs"));
        assert!(label.chars().count() <= 58);
    }

    #[test]
    fn test_line_reference() {
        assert_eq!(
            classify_activity("See line 42 for the off-by-one").unwrap(),
            "Examining specific lines..."
        );
        assert_eq!(
            classify_activity("src/main.rs:120: unused variable").unwrap(),
            "Examining specific lines..."
        );
    }

    #[test]
    fn test_code_flow() {
        assert_eq!(
            classify_activity("This function calls the dispatcher twice").unwrap(),
            "Tracing code flow..."
        );
        // Long prose lines are not flow tracing
        let long = format!("function {}", "words ".repeat(30));
        assert_ne!(
            classify_activity(&long),
            Some("Tracing code flow...".to_string())
        );
    }

    #[test]
    fn test_unrecognized_is_none() {
        assert_eq!(classify_activity("Hello there."), None);
        assert_eq!(classify_activity("0xdeadbeef"), None);
    }

    #[test]
    fn test_code_fence_with_path() {
        assert_eq!(
            classify_activity("```rust title=src/lib.rs").unwrap(),
            "Showing code..."
        );
    }
}
