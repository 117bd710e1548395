//! Managed Python subprocess runner for pickled artifacts.
//!
//! Scripts run as `python -c <script>` with their input on stdin. Every run is
//! bounded by the configured timeout; an overdue or abandoned child is killed
//! and reaped before the error is returned.

use crate::config::PythonConfig;
use crate::error::YieldError;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished script.
#[derive(Debug)]
pub struct ScriptOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ScriptOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct PythonRunner {
    python: PathBuf,
    timeout: Duration,
}

impl PythonRunner {
    pub fn new(python: PathBuf, timeout: Duration) -> Self {
        Self { python, timeout }
    }

    pub fn from_config(config: &PythonConfig) -> Self {
        Self::new(config.python_command(), config.timeout())
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `script`, feeding `input` on stdin, and wait at most the timeout.
    ///
    /// A non-zero exit is returned as output, not as an error; callers decide
    /// what each exit code means.
    pub fn run(&self, script: &str, input: &[u8]) -> Result<ScriptOutput, YieldError> {
        tracing::debug!(
            python = %self.python.display(),
            script_len = script.len(),
            timeout_secs = self.timeout.as_secs_f64(),
            "Running Python script"
        );

        let mut child = Command::new(&self.python)
            .args(["-c", script])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| YieldError::model(format!("Failed to spawn Python: {e}")))?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let mut writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_vec();
            // Dropping stdin at the end of the thread closes the pipe.
            thread::spawn(move || stdin.write_all(&input))
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    reap(&mut child);
                    return Err(YieldError::model(format!("Python did not finish: {e}")));
                }
            }
            if let Some(e) = finished_with_error(&mut writer) {
                reap(&mut child);
                return Err(send_error(e));
            }
            if Instant::now() >= deadline {
                reap(&mut child);
                tracing::warn!(
                    python = %self.python.display(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Python script timed out"
                );
                return Err(YieldError::model(format!(
                    "Python timed out after {:.1}s",
                    self.timeout.as_secs_f64()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };

        // The child has exited, so the pipe is closed and the writer returns.
        if let Some(handle) = writer.take() {
            if let Err(e) = join_writer(handle) {
                return Err(send_error(e));
            }
        }

        Ok(ScriptOutput {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn join_writer(handle: JoinHandle<io::Result<()>>) -> io::Result<()> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")))
}

fn finished_with_error(writer: &mut Option<JoinHandle<io::Result<()>>>) -> Option<io::Error> {
    if !writer.as_ref().is_some_and(JoinHandle::is_finished) {
        return None;
    }
    join_writer(writer.take()?).err()
}

fn send_error(e: io::Error) -> YieldError {
    YieldError::model(format!("Failed to send input to Python: {e}"))
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
