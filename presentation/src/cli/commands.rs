//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the judge
#[derive(Parser, Debug)]
#[command(name = "judge")]
#[command(author, version, about = "Multi-agent session analysis with consensus verdicts")]
#[command(long_about = r#"
Judge dispatches a question about your codebase (plus the most recent coding
session transcript) to several independent analysis agents, extracts a
structured verdict from each, and folds them into one consensus judgment.

What happens:
  1. Each worker investigates independently (reads files, explores code)
  2. A synthesis agent combines all findings into a narrative summary

Configuration files are loaded from (in priority order):
  1. --config <path>    Explicit config file
  2. ./judge.toml       Project-level config
  3. ~/.config/judge/config.toml   Global config

Examples:
  judge "how does auth work?"      Deep research
  judge "review code quality"      Code review
  judge --list                     List sessions
  judge --clean                    Clean up sessions
"#)]
pub struct Cli {
    /// Question to focus the analysis on (empty = general analysis)
    pub question: Vec<String>,

    /// Project path (default: current directory)
    #[arg(short, long, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Analyze a specific session by id prefix (default: most recent)
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// Comma-separated workers, each NAME or NAME=EXECUTABLE (default: auto-detect)
    #[arg(short, long, value_name = "WORKERS")]
    pub workers: Option<String>,

    /// Synthesis agent (default: auto)
    #[arg(long, value_name = "AGENT")]
    pub synthesizer: Option<String>,

    /// Per-worker timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory holding worker wrapper scripts not on PATH
    #[arg(long, value_name = "PATH")]
    pub bin_dir: Option<PathBuf>,

    /// List available sessions and exit
    #[arg(short, long)]
    pub list: bool,

    /// Delete small leftover sessions (with confirmation)
    #[arg(long)]
    pub clean: bool,

    /// Delete small leftover sessions without confirmation
    #[arg(long)]
    pub clean_all: bool,

    /// Emit the result as a single JSON document
    #[arg(long)]
    pub json: bool,

    /// Show each worker's full investigation output
    #[arg(long)]
    pub verbose: bool,

    /// Dump raw worker output for failed extractions
    #[arg(long)]
    pub debug: bool,

    /// Show live worker activity while they run
    #[arg(long)]
    pub live: bool,

    /// Run workers one at a time instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Skip the synthesis pass
    #[arg(long)]
    pub no_synthesis: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Log verbosity (-v = info, -vv = debug, -vvv = trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    /// The focus question, joined from the positional words
    pub fn question_text(&self) -> String {
        self.question.join(" ")
    }

    /// Workers from `--workers`, if given
    pub fn worker_list(&self) -> Option<Vec<String>> {
        self.workers.as_ref().map(|w| {
            w.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_words_are_joined() {
        let cli = Cli::parse_from(["judge", "how", "does", "auth", "work?"]);
        assert_eq!(cli.question_text(), "how does auth work?");
    }

    #[test]
    fn test_worker_list_splits_on_commas() {
        let cli = Cli::parse_from(["judge", "-w", "zai, minimax,"]);
        assert_eq!(
            cli.worker_list(),
            Some(vec!["zai".to_string(), "minimax".to_string()])
        );
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["judge"]);
        assert!(cli.question_text().is_empty());
        assert!(cli.worker_list().is_none());
        assert!(!cli.live);
        assert!(!cli.json);
        assert_eq!(cli.verbosity, 0);
    }
}
