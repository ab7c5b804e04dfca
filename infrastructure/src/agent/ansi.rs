//! ANSI escape stripping
//!
//! Agents are interactive CLIs that decorate their output even in print
//! mode, and the pseudo-terminal transport makes them believe a real
//! terminal is attached. All captured text is cleaned before it reaches
//! the extractor or the live display.

use regex::Regex;
use std::sync::LazyLock;

static ANSI_ESCAPES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[mKHJ]").unwrap());

/// Remove ANSI color/erase/cursor sequences and carriage returns
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPES.replace_all(text, "").replace('\r', "")
}
