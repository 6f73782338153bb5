//! External command execution with a hard timeout.
//!
//! Every adapter shells out through a [`CommandRunner`].  The production
//! [`SystemRunner`] captures stdout/stderr on reader threads and bounds the
//! child with `wait-timeout`; a child that outlives its budget is killed
//! and reaped before [`CommandError::TimedOut`] is returned.

use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;
use wait_timeout::ChildExt;

use crate::error::CommandError;

/// How long to wait for pipe readers after the child has exited.  A child
/// that forked a daemon may leave the pipes open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Captured result of a finished command.  Any exit status is `Ok`; use
/// [`CommandOutput::into_success`] to turn a non-zero status into an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the child was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn into_success(self, program: &str) -> Result<Self, CommandError> {
        if self.success() {
            Ok(self)
        } else {
            Err(CommandError::Failed {
                program: program.to_owned(),
                status: self.status,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs one external program to completion.
pub trait CommandRunner {
    fn run(
        &mut self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;

    /// Run and require exit status 0.
    fn run_ok(
        &mut self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        self.run(program, args, timeout)?.into_success(program)
    }
}

// ───────────────────────────────────────────────────────────────
// System runner
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &mut self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        debug!("exec {program} {}", args.join(" "));
        let spawn_err = |reason: String| CommandError::Spawn {
            program: program.to_owned(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_err(e.to_string()))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                reap(&mut child);
                return Err(CommandError::TimedOut {
                    program: program.to_owned(),
                    after: timeout,
                });
            }
            Err(e) => {
                reap(&mut child);
                return Err(spawn_err(format!("wait failed: {e}")));
            }
        };

        Ok(CommandOutput {
            status: status.code(),
            stdout: stdout.recv_timeout(DRAIN_GRACE).unwrap_or_default(),
            stderr: stderr.recv_timeout(DRAIN_GRACE).unwrap_or_default(),
        })
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Read a pipe to the end on a helper thread so a chatty child can never
/// block on a full pipe while we wait for it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match pipe {
        Some(mut pipe) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

// ───────────────────────────────────────────────────────────────
// PATH lookup
// ───────────────────────────────────────────────────────────────

/// Whether `name` resolves to an executable file on `PATH`.
pub fn program_available(name: &str) -> bool {
    find_program(name, env::var_os("PATH").as_deref()).is_some()
}

fn find_program(name: &str, path: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let path = path?;
    env::split_paths(path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ───────────────────────────────────────────────────────────────
// Scripted runner (unit tests)
// ───────────────────────────────────────────────────────────────
