//! Synthesis adapter
//!
//! Invokes a higher-tier agent in batch mode with the combined worker
//! reports. Synthesis is decoration: any failure degrades to `None` and
//! the caller falls back to the deterministic narrative.

use super::resolver::ExecutableResolver;
use super::runner::{agent_args, run_batch};
use async_trait::async_trait;
use judge_application::Synthesizer;
use judge_domain::{Consensus, PromptTemplate, Question, Verdict};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(180);

/// Batch-mode synthesis through an agent CLI
pub struct CliSynthesizer {
    resolver: ExecutableResolver,
    executable: String,
    timeout: Duration,
}

impl CliSynthesizer {
    pub fn new(resolver: ExecutableResolver, executable: impl Into<String>) -> Self {
        Self {
            resolver,
            executable: executable.into(),
            timeout: DEFAULT_SYNTHESIS_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn is_available(&self) -> bool {
        self.resolver.is_available(&self.executable)
    }
}

#[async_trait]
impl Synthesizer for CliSynthesizer {
    async fn synthesize(
        &self,
        question: &Question,
        verdicts: &[Verdict],
        _consensus: &Consensus,
    ) -> Option<String> {
        let path = self.resolver.resolve(&self.executable)?;
        let prompt = PromptTemplate::synthesis(question, verdicts);

        debug!(synthesizer = %self.executable, "running synthesis");
        let outcome = run_batch(&path, &agent_args(&prompt), self.timeout).await;

        if let Some(failure) = outcome.failure {
            warn!(synthesizer = %self.executable, "synthesis failed: {}", failure);
            return None;
        }

        let text = outcome.output.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use judge_domain::calculate_consensus;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn fake_synthesizer(dir: &Path, script: &str) -> CliSynthesizer {
        let path = dir.join("fake-synth-xyz");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        CliSynthesizer::new(ExecutableResolver::new(dir), "fake-synth-xyz")
    }

    #[tokio::test]
    async fn test_synthesis_returns_trimmed_output() {
        let dir = tempfile::tempdir().unwrap();
        let synth = fake_synthesizer(dir.path(), "echo 'All workers agree.'");
        let consensus = calculate_consensus(&[]);

        let result = synth
            .synthesize(&Question::default(), &[], &consensus)
            .await;

        assert_eq!(result, Some("All workers agree.".to_string()));
    }

    #[tokio::test]
    async fn test_empty_output_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let synth = fake_synthesizer(dir.path(), "true");
        let consensus = calculate_consensus(&[]);

        let result = synth
            .synthesize(&Question::default(), &[], &consensus)
            .await;

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_missing_executable_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let synth = CliSynthesizer::new(ExecutableResolver::new(dir.path()), "no-such-synth");
        let consensus = calculate_consensus(&[]);

        let result = synth
            .synthesize(&Question::default(), &[], &consensus)
            .await;

        assert_eq!(result, None);
    }
}
