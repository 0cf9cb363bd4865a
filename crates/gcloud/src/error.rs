//! Error type for gcloud CLI interactions.

use thiserror::Error;

/// Errors that can occur while invoking the gcloud CLI.
#[derive(Error, Debug)]
pub enum GcloudError {
    /// The external command could not be spawned (binary missing, broken
    /// PATH, permission problem).
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited with a non-zero status.
    #[error("command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    /// A JSON document printed by gcloud could not be parsed.
    #[error("failed to parse gcloud output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GcloudError>;
