//! File configuration schema

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a `judge.toml` can set. CLI flags override these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Workers to dispatch, each `NAME` or `NAME=EXECUTABLE`; empty means
    /// auto-detect
    pub workers: Vec<String>,
    /// Synthesizer executable; "auto" resolves to `claude` when available
    pub synthesizer: String,
    /// Directory holding worker wrapper scripts not on PATH
    pub bin_dir: Option<PathBuf>,
    /// Per-worker deadline in seconds
    pub timeout_secs: u64,
    /// Stream worker output through a pseudo-terminal with a live display
    pub live: bool,
    /// Run workers one at a time
    pub sequential: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            workers: Vec::new(),
            synthesizer: "auto".to_string(),
            bin_dir: None,
            timeout_secs: 300,
            live: false,
            sequential: false,
        }
    }
}
