//! Typed client over the `gcloud` CLI.
//!
//! All provisioning and deployment effects of the Video Analysis App tooling
//! are mediated through the `gcloud` command-line tool. This crate wraps that
//! surface in typed request objects and a small client, with the actual
//! subprocess invocation isolated behind the [`CommandRunner`] trait so tests
//! can substitute a fake.
//!
//! Calls are synchronous and blocking: each command is awaited to completion
//! before the next one is issued, and no timeouts are applied.

pub mod client;
pub mod error;
pub mod models;
pub mod runner;

pub use client::GcloudClient;
pub use error::GcloudError;
pub use models::{
    CreateBucketRequest, CreateDatabaseRequest, CreateServiceAccountRequest, DatabaseType,
    DeployRequest, FirestoreDatabase, IamBinding, IamPolicy,
};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
