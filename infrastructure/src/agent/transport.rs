//! Capture transports
//!
//! Two ways of owning an agent child process behind one channel interface:
//! plain pipes for batch capture, and a pseudo-terminal for streaming. The
//! pseudo-terminal makes the child believe it is interactive, so it flushes
//! output as it works instead of buffering until exit.

use async_trait::async_trait;
use portable_pty::{CommandBuilder, PtySize, native_pty_system};
use std::io::Read;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;

/// Suppresses the wrapper splash banner in child processes
pub(crate) const SPLASH_ENV: (&str, &str) = ("CC_MIRROR_SPLASH", "0");

const CHUNK_SIZE: usize = 4096;

/// One poll of the child's output stream
pub(crate) enum ChunkRead {
    Data(Vec<u8>),
    /// Nothing arrived within the poll window
    Idle,
    Eof,
}

/// A spawned child process whose output is read in timed chunks
#[async_trait]
pub(crate) trait ProcessChannel: Send {
    /// Wait up to `poll` for the next chunk of output
    async fn read_chunk(&mut self, poll: Duration) -> ChunkRead;

    /// Exit code if the child has already terminated
    fn try_wait(&mut self) -> Option<i32>;

    /// Forcibly terminate the child
    fn kill(&mut self);

    /// Collected stderr, once the child is done. Empty for transports that
    /// merge the streams.
    async fn take_stderr(&mut self) -> String;
}

/// Pipe-backed transport for batch capture
pub(crate) struct PipeChannel {
    child: Child,
    stdout: ChildStdout,
    stderr_task: Option<tokio::task::JoinHandle<String>>,
}

impl PipeChannel {
    pub(crate) fn spawn(
        program: &Path,
        args: &[String],
        env: &[(&str, &str)],
    ) -> Result<Self, String> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (name, value) in env {
            cmd.env(name, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| format!("Failed to spawn {}: {}", program.display(), e))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| "stdout not captured".to_string())?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| "stderr not captured".to_string())?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        });

        Ok(Self {
            child,
            stdout,
            stderr_task: Some(stderr_task),
        })
    }
}

#[async_trait]
impl ProcessChannel for PipeChannel {
    async fn read_chunk(&mut self, poll: Duration) -> ChunkRead {
        let mut buf = [0u8; CHUNK_SIZE];
        match tokio::time::timeout(poll, self.stdout.read(&mut buf)).await {
            Ok(Ok(0)) => ChunkRead::Eof,
            Ok(Ok(n)) => ChunkRead::Data(buf[..n].to_vec()),
            Ok(Err(_)) => ChunkRead::Eof,
            Err(_) => ChunkRead::Idle,
        }
    }

    fn try_wait(&mut self) -> Option<i32> {
        self.child
            .try_wait()
            .ok()
            .flatten()
            .map(|status| status.code().unwrap_or(-1))
    }

    fn kill(&mut self) {
        let _ = self.child.start_kill();
    }

    async fn take_stderr(&mut self) -> String {
        match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        }
    }
}

/// Pseudo-terminal transport for streaming capture. stdout and stderr are
/// merged into the terminal stream; a dedicated thread pumps the blocking
/// reader into a channel the async side polls.
pub(crate) struct PtyChannel {
    child: Box<dyn portable_pty::Child + Send + Sync>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    // Keeps the master side of the pty open for the lifetime of the capture
    _master: Box<dyn portable_pty::MasterPty + Send>,
}

impl PtyChannel {
    pub(crate) fn spawn(
        program: &Path,
        args: &[String],
        env: &[(&str, &str)],
    ) -> Result<Self, String> {
        let pair = native_pty_system()
            .openpty(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| format!("openpty failed: {e}"))?;

        let mut cmd = CommandBuilder::new(program);
        for arg in args {
            cmd.arg(arg);
        }
        for (name, value) in env {
            cmd.env(name, value);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| format!("Failed to spawn {}: {}", program.display(), e))?;
        drop(pair.slave);

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| format!("Failed to open pty reader: {e}"))?;

        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let mut buf = [0u8; CHUNK_SIZE];
            loop {
                match reader.read(&mut buf) {
                    // EOF, or EIO once the child exits and the slave closes
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            child,
            rx,
            _master: pair.master,
        })
    }
}

#[async_trait]
impl ProcessChannel for PtyChannel {
    async fn read_chunk(&mut self, poll: Duration) -> ChunkRead {
        match tokio::time::timeout(poll, self.rx.recv()).await {
            Ok(Some(data)) => ChunkRead::Data(data),
            Ok(None) => ChunkRead::Eof,
            Err(_) => ChunkRead::Idle,
        }
    }

    fn try_wait(&mut self) -> Option<i32> {
        self.child
            .try_wait()
            .ok()
            .flatten()
            .map(|status| status.exit_code() as i32)
    }

    fn kill(&mut self) {
        let _ = self.child.kill();
    }

    async fn take_stderr(&mut self) -> String {
        String::new()
    }
}
