//! Session transcript discovery
//!
//! The coding agent stores one JSONL transcript per session under
//! `~/.claude/projects/<encoded-project-path>/`, where the encoding replaces
//! every slash in the absolute project path with a dash. Transcripts named
//! `agent-*` belong to sub-agents and are never analysis candidates.

use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sessions smaller than this are noise (empty or aborted runs)
pub const MIN_SESSION_SIZE: u64 = 500;

/// Below this a session is almost certainly a judge leftover, not real work
pub const SMALL_SESSION_THRESHOLD: u64 = 10 * 1024;

/// One discovered session transcript
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// File stem, a UUID in practice
    pub id: String,
    pub path: PathBuf,
    pub modified: DateTime<Local>,
    pub size: u64,
}

impl SessionInfo {
    /// First 8 characters of the id. Ids are UUIDs in practice, but file
    /// stems are arbitrary, so truncate on a char boundary.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((i, _)) => &self.id[..i],
            None => &self.id,
        }
    }
}

/// Locates and manages session transcripts for a project
#[derive(Debug, Clone)]
pub struct SessionStore {
    projects_root: PathBuf,
}

impl SessionStore {
    /// Store rooted at the standard `~/.claude/projects` location
    pub fn new() -> Option<Self> {
        dirs::home_dir().map(|home| Self {
            projects_root: home.join(".claude").join("projects"),
        })
    }

    /// Store rooted elsewhere, for tests
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            projects_root: root.into(),
        }
    }

    /// `/mnt/c/foo` -> `-mnt-c-foo`
    pub fn encode_project_path(project: &Path) -> String {
        project.to_string_lossy().replace('/', "-")
    }

    pub fn sessions_dir(&self, project: &Path) -> PathBuf {
        self.projects_root.join(Self::encode_project_path(project))
    }

    /// List sessions for a project, newest first, skipping `agent-*` files
    /// and anything under `min_size` bytes.
    pub fn list(&self, project: &Path, min_size: u64) -> Vec<SessionInfo> {
        let dir = self.sessions_dir(project);
        let pattern = dir.join("*.jsonl");

        let mut sessions = Vec::new();
        let Ok(paths) = glob::glob(&pattern.to_string_lossy()) else {
            return sessions;
        };

        for path in paths.flatten() {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if stem.starts_with("agent-") {
                continue;
            }
            let Ok(meta) = path.metadata() else {
                continue;
            };
            if meta.len() < min_size {
                continue;
            }
            let modified = meta
                .modified()
                .map(DateTime::<Local>::from)
                .unwrap_or_else(|_| Local::now());
            sessions.push(SessionInfo {
                id: stem,
                path,
                modified,
                size: meta.len(),
            });
        }

        sessions.sort_by(|a, b| b.modified.cmp(&a.modified));
        debug!(project = %project.display(), count = sessions.len(), "listed sessions");
        sessions
    }

    /// Find a session by id prefix
    pub fn find(&self, project: &Path, prefix: &str) -> Option<SessionInfo> {
        self.list(project, MIN_SESSION_SIZE)
            .into_iter()
            .find(|s| s.id.starts_with(prefix))
    }

    /// Most recent non-trivial session
    pub fn latest(&self, project: &Path) -> Option<SessionInfo> {
        self.list(project, MIN_SESSION_SIZE).into_iter().next()
    }

    /// Split all sessions into (small, large) by the leftover threshold
    pub fn partition_by_size(&self, project: &Path) -> (Vec<SessionInfo>, Vec<SessionInfo>) {
        self.list(project, 0)
            .into_iter()
            .partition(|s| s.size < SMALL_SESSION_THRESHOLD)
    }

    /// All session ids currently present, regardless of size
    pub fn session_ids(&self, project: &Path) -> HashSet<String> {
        self.list(project, 0).into_iter().map(|s| s.id).collect()
    }

    pub fn delete(&self, session: &SessionInfo) -> std::io::Result<()> {
        std::fs::remove_file(&session.path)
    }

    /// Delete sessions that appeared since `existing` was snapshotted,
    /// preserving the one being analyzed. Workers spawn their own sessions
    /// as a side effect of running inside the project.
    pub fn remove_new_sessions(
        &self,
        project: &Path,
        existing: &HashSet<String>,
        keep_id: &str,
    ) -> usize {
        let mut deleted = 0;
        for session in self.list(project, 0) {
            if existing.contains(&session.id) || session.id == keep_id {
                continue;
            }
            match self.delete(&session) {
                Ok(()) => deleted += 1,
                Err(e) => warn!(session = %session.id, "failed to delete session: {}", e),
            }
        }
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_session(dir: &Path, name: &str, size: usize) {
        std::fs::write(dir.join(name), "x".repeat(size)).unwrap();
    }

    fn store_with_project(root: &Path, project: &Path) -> (SessionStore, PathBuf) {
        let store = SessionStore::with_root(root);
        let dir = store.sessions_dir(project);
        std::fs::create_dir_all(&dir).unwrap();
        (store, dir)
    }

    #[test]
    fn test_encode_project_path() {
        assert_eq!(
            SessionStore::encode_project_path(Path::new("/mnt/c/foo")),
            "-mnt-c-foo"
        );
    }

    #[test]
    fn test_list_skips_agent_and_tiny_files() {
        let root = tempfile::tempdir().unwrap();
        let project = Path::new("/home/dev/proj");
        let (store, dir) = store_with_project(root.path(), project);

        write_session(&dir, "aaaa1111.jsonl", 2000);
        write_session(&dir, "agent-bbbb.jsonl", 2000);
        write_session(&dir, "tiny.jsonl", 100);
        write_session(&dir, "notes.txt", 2000);

        let sessions = store.list(project, MIN_SESSION_SIZE);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "aaaa1111");
    }

    #[test]
    fn test_short_id_handles_multibyte_stems() {
        let root = tempfile::tempdir().unwrap();
        let project = Path::new("/home/dev/proj");
        let (store, dir) = store_with_project(root.path(), project);

        write_session(&dir, "aaaaaaaé.jsonl", 2000);
        write_session(&dir, "日本語セッション名.jsonl", 2000);

        for session in store.list(project, MIN_SESSION_SIZE) {
            assert!(session.short_id().chars().count() <= 8);
        }
    }

    #[test]
    fn test_find_by_prefix() {
        let root = tempfile::tempdir().unwrap();
        let project = Path::new("/home/dev/proj");
        let (store, dir) = store_with_project(root.path(), project);

        write_session(&dir, "deadbeef-1234.jsonl", 2000);

        assert!(store.find(project, "deadbeef").is_some());
        assert!(store.find(project, "cafe").is_none());
    }

    #[test]
    fn test_partition_by_size() {
        let root = tempfile::tempdir().unwrap();
        let project = Path::new("/home/dev/proj");
        let (store, dir) = store_with_project(root.path(), project);

        write_session(&dir, "small.jsonl", 2000);
        write_session(&dir, "large.jsonl", 20 * 1024);

        let (small, large) = store.partition_by_size(project);
        assert_eq!(small.len(), 1);
        assert_eq!(small[0].id, "small");
        assert_eq!(large.len(), 1);
    }

    #[test]
    fn test_remove_new_sessions_keeps_existing_and_analyzed() {
        let root = tempfile::tempdir().unwrap();
        let project = Path::new("/home/dev/proj");
        let (store, dir) = store_with_project(root.path(), project);

        write_session(&dir, "old.jsonl", 2000);
        let existing = store.session_ids(project);

        write_session(&dir, "spawned.jsonl", 600);
        write_session(&dir, "analyzed.jsonl", 600);

        let deleted = store.remove_new_sessions(project, &existing, "analyzed");
        assert_eq!(deleted, 1);
        assert!(dir.join("old.jsonl").exists());
        assert!(dir.join("analyzed.jsonl").exists());
        assert!(!dir.join("spawned.jsonl").exists());
    }

    #[test]
    fn test_missing_directory_lists_empty() {
        let root = tempfile::tempdir().unwrap();
        let store = SessionStore::with_root(root.path());
        assert!(store.list(Path::new("/nowhere"), 0).is_empty());
    }
}
