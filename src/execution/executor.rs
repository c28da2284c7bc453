//! Bounded Subprocess Execution
//!
//! Runs a resolved tool executable with a reconstructed argument vector
//! under strict bounds: a wall-clock timeout with kill escalation, a
//! per-stream output cap enforced while the process is still running, and
//! a semaphore limiting how many tool subprocesses run at once.
//!
//! A non-zero exit code is not an engine-level error; the caller reads the
//! exit code and stderr for success/failure semantics. Spawn failures and
//! timeouts surface as explicit [`ExecutionError`] values and never as
//! panics past the protocol boundary.

use crate::config::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Grace period between the first termination attempt and the hard kill
const KILL_GRACE: Duration = Duration::from_secs(5);

/// Errors surfaced by the execution engine
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("failed to spawn {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("i/o failure while capturing output: {0}")]
    Io(#[from] std::io::Error),

    #[error("executor is shutting down")]
    SlotsClosed,
}

/// Outcome of one completed tool execution
///
/// Exists only for the duration of one call; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured stdout, truncated at the output cap
    pub stdout: String,

    /// Captured stderr, truncated at the output cap
    pub stderr: String,

    /// Process exit code (`None` when terminated by signal)
    pub exit_code: Option<i32>,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Subprocess runner shared by all tool calls
#[derive(Clone)]
pub struct ToolExecutor {
    config: Arc<ServerConfig>,
    permits: Arc<Semaphore>,
}

impl ToolExecutor {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_execs));
        Self { config, permits }
    }

    /// Execute `path` with `argv`, enforcing timeout and output caps
    ///
    /// The vector is handed to process creation directly; no shell is ever
    /// involved, so metacharacters in argument values stay literal.
    pub async fn execute(
        &self,
        path: &Path,
        argv: &[String],
    ) -> Result<ExecutionResult, ExecutionError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ExecutionError::SlotsClosed)?;

        info!("Executing {} ({} args)", path.display(), argv.len());
        let started = Instant::now();

        let mut child = Command::new(path)
            .args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        // Streams are drained while the process runs; bytes past the cap are
        // read and dropped so the pipe never backs up and stalls the tool.
        let cap = self.config.max_output_bytes;
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_task = tokio::spawn(async move {
            match stdout_pipe {
                Some(pipe) => read_capped(pipe, cap).await,
                None => Ok(Vec::new()),
            }
        });
        let stderr_task = tokio::spawn(async move {
            match stderr_pipe {
                Some(pipe) => read_capped(pipe, cap).await,
                None => Ok(Vec::new()),
            }
        });

        let status = match tokio::time::timeout(self.config.exec_timeout, child.wait()).await {
            Ok(waited) => waited?,
            Err(_) => {
                warn!(
                    "Terminating {} after {:?} timeout",
                    path.display(),
                    self.config.exec_timeout
                );
                kill_with_escalation(&mut child).await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(ExecutionError::Timeout(self.config.exec_timeout));
            }
        };

        let stdout = finish_capture(stdout_task).await?;
        let stderr = finish_capture(stderr_task).await?;
        let duration = started.elapsed();

        debug!(
            "{} exited with {:?} in {:?}",
            path.display(),
            status.code(),
            duration
        );

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code: status.code(),
            duration_ms: duration.as_millis() as u64,
        })
    }
}

/// Await a capture task and convert its bytes to a lossy string
async fn finish_capture(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<String, ExecutionError> {
    let bytes = task.await.map_err(std::io::Error::other)??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a stream to EOF, retaining at most `cap` bytes
async fn read_capped<R: tokio::io::AsyncRead + Unpin>(
    mut reader: R,
    cap: usize,
) -> std::io::Result<Vec<u8>> {
    let mut retained = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if retained.len() < cap {
            let take = n.min(cap - retained.len());
            retained.extend_from_slice(&buf[..take]);
        }
    }
    Ok(retained)
}

/// Terminate a child, escalating if the first signal is not honored
async fn kill_with_escalation(child: &mut Child) {
    if child.start_kill().is_err() {
        // Already exited
        return;
    }
    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_err() {
        let _ = child.kill().await;
    }
}
