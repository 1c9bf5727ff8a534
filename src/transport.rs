//! Interpreter subprocess plumbing.
//!
//! One read is one process: the harness script goes in on stdin, stdin is
//! closed, and the JSON document comes back on stdout. Stdout and stderr are
//! drained by separate tasks for the whole lifetime of the child so neither
//! pipe can fill up and stall it.

use std::future::{self, Future};
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::ReaderSettings;
use crate::errors::{ConfigError, Result};

/// Cooperative cancellation for an in-flight configuration read.
///
/// Clones share state; cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut receiver = self.state.subscribe();
        // the sender lives as long as `self`, so this cannot fail
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Something that can evaluate a harness script and hand back its output
pub trait ScriptInterpreter: Send + Sync {
    /// Run `script` with `working_directory` as the current directory and
    /// return the trimmed standard output.
    fn interpret(
        &self,
        script: &str,
        working_directory: &Path,
        cancel: Option<&CancelToken>,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Runs harness scripts through an external interpreter process (Node.js by default)
#[derive(Debug, Clone)]
pub struct NodeInterpreter {
    program: String,
    args: Vec<String>,
    warning_marker: String,
    timeout: Option<Duration>,
}

impl NodeInterpreter {
    pub fn new() -> Self {
        Self::from_settings(&ReaderSettings::default())
    }

    pub fn from_settings(settings: &ReaderSettings) -> Self {
        Self {
            program: settings.interpreter.clone(),
            args: settings.interpreter_args.clone(),
            warning_marker: settings.warning_marker.clone(),
            timeout: settings.timeout(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_warning_marker(mut self, marker: impl Into<String>) -> Self {
        self.warning_marker = marker.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for NodeInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the child produced once it exited and both pipes hit EOF
struct Transcript {
    status: ExitStatus,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

enum Outcome {
    Finished(Result<Transcript>),
    TimedOut(Duration),
    Cancelled,
}

impl ScriptInterpreter for NodeInterpreter {
    async fn interpret(
        &self,
        script: &str,
        working_directory: &Path,
        cancel: Option<&CancelToken>,
    ) -> Result<String> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ConfigError::Cancelled);
        }

        debug!(
            "Starting {} in {} ({} byte script)",
            self.program,
            working_directory.display(),
            script.len()
        );

        // one deadline covers writing, waiting and draining
        let deadline = self.timeout.map(|timeout| (Instant::now() + timeout, timeout));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(working_directory)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ConfigError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let mut stdout_task = tokio::spawn(collect_lines(stdout));
        let mut stderr_task = tokio::spawn(collect_lines(stderr));

        let exchange = async {
            if let Err(e) = write_script(stdin, script).await {
                // the interpreter may exit before reading everything; its stderr says why
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(ConfigError::from(e));
                }
                debug!("Interpreter closed stdin early: {}", e);
            }

            let status = child.wait().await?;
            // anything the child left running may still hold the pipes open
            let stdout = (&mut stdout_task).await.map_err(io::Error::other)??;
            let stderr = (&mut stderr_task).await.map_err(io::Error::other)??;

            Ok::<_, ConfigError>(Transcript { status, stdout, stderr })
        };

        let outcome = tokio::select! {
            transcript = exchange => Outcome::Finished(transcript),
            elapsed = expire(deadline) => Outcome::TimedOut(elapsed),
            _ = wait_cancelled(cancel) => Outcome::Cancelled,
        };

        let transcript = match outcome {
            Outcome::Finished(Ok(transcript)) => transcript,
            Outcome::Finished(Err(e)) => {
                terminate(&mut child, &stdout_task, &stderr_task).await;
                return Err(e);
            }
            Outcome::TimedOut(elapsed) => {
                warn!("{} did not finish within {:?}, killing it", self.program, elapsed);
                terminate(&mut child, &stdout_task, &stderr_task).await;
                return Err(ConfigError::Timeout(elapsed));
            }
            Outcome::Cancelled => {
                debug!("Configuration read cancelled, killing {}", self.program);
                terminate(&mut child, &stdout_task, &stderr_task).await;
                return Err(ConfigError::Cancelled);
            }
        };

        let failures = failure_lines(&transcript.stderr, &self.warning_marker);
        if !failures.is_empty() {
            return Err(ConfigError::ScriptFailed(failures.join("\n").trim().to_string()));
        }

        if !transcript.status.success() {
            warn!("{} exited with {} without reporting an error", self.program, transcript.status);
        }

        Ok(transcript.stdout.join("\n").trim().to_string())
    }
}

/// Stderr lines that mark the run as failed; warning lines and blank lines are skipped
pub fn failure_lines<'a>(lines: &'a [String], warning_marker: &str) -> Vec<&'a str> {
    let marker = warning_marker.to_lowercase();

    lines
        .iter()
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| {
            let is_warning = !marker.is_empty() && line.to_lowercase().contains(&marker);
            if is_warning {
                debug!("Ignoring interpreter warning: {}", line);
            }
            !is_warning
        })
        .collect()
}

fn missing_pipe(name: &str) -> ConfigError {
    ConfigError::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        format!("interpreter {} was not captured", name),
    ))
}

async fn write_script(mut stdin: ChildStdin, script: &str) -> io::Result<()> {
    stdin.write_all(script.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.shutdown().await?;
    // dropping closes the pipe, signalling end of input
    drop(stdin);
    Ok(())
}

async fn collect_lines<R>(reader: R) -> io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut collected = Vec::new();

    while let Some(line) = lines.next_line().await? {
        if !line.is_empty() {
            collected.push(line);
        }
    }

    Ok(collected)
}

async fn expire(deadline: Option<(Instant, Duration)>) -> Duration {
    match deadline {
        Some((at, timeout)) => {
            tokio::time::sleep_until(at).await;
            timeout
        }
        None => future::pending().await,
    }
}

async fn wait_cancelled(cancel: Option<&CancelToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => future::pending().await,
    }
}

async fn terminate<T>(
    child: &mut tokio::process::Child,
    stdout_task: &tokio::task::JoinHandle<T>,
    stderr_task: &tokio::task::JoinHandle<T>,
) {
    // the child may already be gone when only its pipes outlived it
    if let Err(e) = child.kill().await {
        debug!("Failed to kill interpreter: {}", e);
    }
    stdout_task.abort();
    stderr_task.abort();
}
