//! `.env` loading for deploys.
//!
//! The application configures itself from a flat `KEY=VALUE` file (see
//! `.env.example`). Only the keys the deploy needs are read; everything else
//! is ignored without comment, so the same file can carry application-only
//! settings.

use std::path::Path;

use anyhow::{Context, Result};

use crate::provision::DEFAULT_REGION;

pub const PROJECT_KEY: &str = "GCP_PROJECT";
pub const BUCKET_KEY: &str = "GCS_BUCKET";
pub const REGION_KEY: &str = "DEFAULT_REGION";

/// The deploy-relevant subset of the environment file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeployEnv {
    pub project: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
}

impl DeployEnv {
    /// Deploy region, falling back to the fixed default.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }
}

/// Load the environment file at `path`.
///
/// # Errors
/// Fails if the file cannot be read; an absent file must abort the deploy
/// before any remote call.
pub fn load(path: &Path) -> Result<DeployEnv> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("environment file not found: {}", path.display()))?;
    Ok(parse(&contents))
}

/// Parse environment file contents.
///
/// Blank lines and `#` comments are skipped. Each remaining line is split on
/// the first `=`; values lose one layer of surrounding `"` or `'` quotes.
/// Unrecognized keys are silently ignored.
#[must_use]
pub fn parse(contents: &str) -> DeployEnv {
    let mut env = DeployEnv::default();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = strip_quotes(value.trim()).to_string();

        match key.trim() {
            PROJECT_KEY => env.project = Some(value),
            BUCKET_KEY => env.bucket = Some(value),
            REGION_KEY => env.region = Some(value),
            _ => {}
        }
    }

    env
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
