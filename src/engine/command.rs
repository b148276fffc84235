//! Synchronous invocation of the external analysis tool, streaming its stdout
//! into a destination file.
//!
//! On any failure the partially written destination is removed so a later
//! validity check can never mistake it for a finished artifact.

use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::utils::config::{CHILD_POLL_INTERVAL_MS, STDERR_CAPTURE_CAP};

/// Structured failure of one external invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start {exec}: {source}")]
    Spawn {
        exec: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{exec} exited with {status}: {stderr}")]
    NonZero {
        exec: String,
        status: ExitStatus,
        /// Captured stderr, truncated to [`STDERR_CAPTURE_CAP`] bytes.
        stderr: String,
    },

    #[error("{exec} killed after exceeding timeout of {timeout:?}")]
    Timeout { exec: String, timeout: Duration },

    #[error("cannot write output to {dest}: {source}")]
    Output {
        dest: String,
        #[source]
        source: std::io::Error,
    },
}

/// Run `exec` with `args`, streaming stdout into a freshly created `dest`.
/// Blocks until the child exits (or `timeout` expires, in which case the child
/// is killed). stderr is captured bounded for error reporting.
pub fn run_to_file(
    exec: &Path,
    args: &[String],
    dest: &Path,
    timeout: Option<Duration>,
) -> Result<(), CommandError> {
    let exec_name = exec.display().to_string();
    debug!("running {} {:?} -> {}", exec_name, args, dest.display());

    let out = File::create(dest).map_err(|source| CommandError::Output {
        dest: dest.display().to_string(),
        source,
    })?;

    let spawned = Command::new(exec)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(out))
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(source) => {
            let _ = std::fs::remove_file(dest);
            return Err(CommandError::Spawn {
                exec: exec_name,
                source,
            });
        }
    };

    // Drain stderr on its own thread so the child never blocks on a full pipe.
    let stderr_pipe = child.stderr.take();
    let stderr_reader = std::thread::spawn(move || read_stderr_capped(stderr_pipe));

    let waited = wait_with_timeout(&mut child, timeout);
    let stderr = stderr_reader.join().unwrap_or_default();

    match waited {
        Ok(Some(status)) if status.success() => Ok(()),
        Ok(Some(status)) => {
            let _ = std::fs::remove_file(dest);
            Err(CommandError::NonZero {
                exec: exec_name,
                status,
                stderr,
            })
        }
        Ok(None) => {
            let _ = std::fs::remove_file(dest);
            Err(CommandError::Timeout {
                exec: exec_name,
                // Ok(None) only happens when a timeout was configured.
                timeout: timeout.unwrap_or_default(),
            })
        }
        Err(source) => {
            let _ = std::fs::remove_file(dest);
            Err(CommandError::Spawn {
                exec: exec_name,
                source,
            })
        }
    }
}

/// Wait for the child; `Ok(None)` means the timeout expired and the child was
/// killed and reaped.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child.wait().map(Some);
    };
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(CHILD_POLL_INTERVAL_MS));
    }
}

/// Read the whole stderr stream but keep at most [`STDERR_CAPTURE_CAP`] bytes.
/// The stream must be consumed to EOF even past the cap, otherwise a noisy
/// child would deadlock on a full pipe.
fn read_stderr_capped(stderr: Option<ChildStderr>) -> String {
    let Some(mut stderr) = stderr else {
        return String::new();
    };
    let mut captured: Vec<u8> = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];
    loop {
        match stderr.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if captured.len() < STDERR_CAPTURE_CAP {
                    let take = n.min(STDERR_CAPTURE_CAP - captured.len());
                    captured.extend_from_slice(&chunk[..take]);
                    if take < n {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
            Err(_) => break,
        }
    }
    let mut text = String::from_utf8_lossy(&captured).into_owned();
    if truncated {
        text.push_str(" [stderr truncated]");
    }
    text
}
