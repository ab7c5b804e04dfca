//! Worker value object representing one analysis agent

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// An independently invoked analysis agent (Value Object)
///
/// Unlike a fixed model catalog, the worker set is open: each worker is an
/// external executable the user has installed (e.g. `zai`, `minimax`,
/// `claude`). The name doubles as the executable reference unless an
/// explicit one is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Worker {
    /// Worker display name
    pub name: String,
    /// Executable to resolve and launch
    pub executable: String,
}

impl Worker {
    /// Create a worker whose executable is its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let executable = name.clone();
        Self { name, executable }
    }

    /// Override the executable reference
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }
}

impl std::fmt::Display for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl std::str::FromStr for Worker {
    type Err = DomainError;

    /// Parse `NAME` or `NAME=EXECUTABLE` (a display alias for a differently
    /// named executable). Both sides must be non-empty after trimming.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, executable) = match s.split_once('=') {
            Some((name, executable)) => (name.trim(), Some(executable.trim())),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(DomainError::InvalidWorker("empty name".to_string()));
        }
        match executable {
            Some("") => Err(DomainError::InvalidWorker(format!(
                "'{name}' has an empty executable"
            ))),
            Some(executable) => Ok(Worker::new(name).with_executable(executable)),
            None => Ok(Worker::new(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_name_is_executable_by_default() {
        let w = Worker::new("zai");
        assert_eq!(w.name, "zai");
        assert_eq!(w.executable, "zai");
    }

    #[test]
    fn test_with_executable() {
        let w = Worker::new("fast").with_executable("claude");
        assert_eq!(w.name, "fast");
        assert_eq!(w.executable, "claude");
    }

    #[test]
    fn test_from_str_trims() {
        let w: Worker = " minimax ".parse().unwrap();
        assert_eq!(w.name, "minimax");
        assert_eq!(w.executable, "minimax");
    }

    #[test]
    fn test_from_str_alias_splits_executable() {
        let w: Worker = "fast = claude".parse().unwrap();
        assert_eq!(w.name, "fast");
        assert_eq!(w.executable, "claude");
    }

    #[test]
    fn test_from_str_rejects_empty_name() {
        assert!("".parse::<Worker>().is_err());
        assert!("   ".parse::<Worker>().is_err());
        assert!("=claude".parse::<Worker>().is_err());
    }

    #[test]
    fn test_from_str_rejects_empty_executable() {
        assert!("fast=".parse::<Worker>().is_err());
    }
}
