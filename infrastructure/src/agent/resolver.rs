//! Worker executable resolution
//!
//! Workers are either commands on PATH (like `claude`) or wrapper scripts
//! in a bin directory (like `zai`). PATH wins; the bin directory is the
//! fallback. Resolution failure never launches anything.

use std::path::{Path, PathBuf};

/// Resolves worker executables against PATH and a configured bin directory
#[derive(Debug, Clone)]
pub struct ExecutableResolver {
    bin_dir: PathBuf,
}

impl ExecutableResolver {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }

    /// Default wrapper location: `~/.local/bin`
    pub fn default_bin_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("bin")
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Resolve an executable name to a launchable path
    pub fn resolve(&self, executable: &str) -> Option<PathBuf> {
        if let Ok(path) = which::which(executable) {
            return Some(path);
        }
        let candidate = self.bin_dir.join(executable);
        candidate.exists().then_some(candidate)
    }

    pub fn is_available(&self, executable: &str) -> bool {
        self.resolve(executable).is_some()
    }
}

impl Default for ExecutableResolver {
    fn default() -> Self {
        Self::new(Self::default_bin_dir())
    }
}
