//! Presentation layer for codebase-judge
//!
//! CLI argument definitions, the live worker display, and console/JSON
//! output formatting.

pub mod cli;
pub mod output;
pub mod progress;

pub use cli::commands::Cli;
pub use output::console::{ConsoleFormatter, DisplayOptions};
pub use progress::live::LiveMonitor;
pub use progress::reporter::ConsoleProgress;
