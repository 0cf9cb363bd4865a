//! Subprocess seam for external command invocation.
//!
//! Every effect in this crate goes through [`CommandRunner::run`]. Production
//! code uses [`SystemRunner`]; tests substitute a mock or a scripted fake to
//! verify which commands would be issued without touching a real project.

use std::process::Command;

use tracing::debug;

use crate::error::{GcloudError, Result};

/// The gcloud binary name.
pub const GCLOUD: &str = "gcloud";

/// Captured result of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Convenience constructor for tests and fakes.
    #[must_use]
    pub fn new(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Executes external commands, blocking until they exit.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and capture its output.
    ///
    /// A non-zero exit is not an error at this layer; callers decide whether
    /// the status is fatal. `Err` means the process could not be run at all.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!(program, ?args, "running external command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| GcloudError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
