//! Execution parameters shared by the use cases

use std::time::Duration;

/// Default per-worker deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How a judge run should execute
#[derive(Debug, Clone)]
pub struct ExecutionParams {
    /// Per-worker wall-clock deadline
    pub timeout: Duration,
    /// Run workers one at a time instead of concurrently
    pub sequential: bool,
    /// Stream output through a pseudo-terminal and feed the live display
    pub live: bool,
}

impl ExecutionParams {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            sequential: false,
            live: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = ExecutionParams::default();
        assert_eq!(p.timeout, Duration::from_secs(300));
        assert!(!p.sequential);
        assert!(!p.live);
    }

    #[test]
    fn test_builders() {
        let p = ExecutionParams::default()
            .with_timeout(Duration::from_secs(30))
            .sequential(true)
            .live(true);
        assert_eq!(p.timeout, Duration::from_secs(30));
        assert!(p.sequential);
        assert!(p.live);
    }
}
