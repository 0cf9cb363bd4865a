//! Video Analysis App provisioning library.
//!
//! Backs the `vida` binary: Google Cloud provisioning steps, `.env`
//! loading for deploys, LLM prompt template rendering, and the console UI.
//! Exposed as a library so the full setup flow can be exercised in tests
//! against a fake command runner.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

pub mod commands;
pub mod env_file;
pub mod prompts;
pub mod provision;
pub mod ui;
pub mod validator;
