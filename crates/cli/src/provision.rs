//! Google Cloud provisioning steps for the Video Analysis App.
//!
//! Each step is idempotent: existence is queried from the provider before
//! any mutation, so re-running `vida setup` against a fully provisioned
//! project issues no create or grant calls. All state lives in the provider;
//! nothing is tracked locally between runs.
//!
//! Failures are terminal at the point of occurrence. There is no retry and
//! no rollback of already-applied changes; the printed progress is the only
//! record of which steps completed.

use anyhow::{Context, Result};
use tracing::{debug, info};
use vida_gcloud::{
    CreateBucketRequest, CreateDatabaseRequest, CreateServiceAccountRequest, DatabaseType,
    GcloudClient,
};

use crate::ui;

/// Region used for buckets, the Firestore database, and deploys.
pub const DEFAULT_REGION: &str = "us-central1";

/// Default service account name (local part of the email).
pub const DEFAULT_SERVICE_ACCOUNT: &str = "video-analysis-app";

/// Default Cloud Run service name.
pub const DEFAULT_SERVICE_NAME: &str = "video-analysis-app";

/// Default service account display name.
pub const DEFAULT_DISPLAY_NAME: &str = "Video Analysis App Service Account";

/// APIs the application needs, enabled in one batched call.
pub const REQUIRED_APIS: [&str; 9] = [
    "run.googleapis.com",
    "cloudbuild.googleapis.com",
    "artifactregistry.googleapis.com",
    "storage.googleapis.com",
    "firestore.googleapis.com",
    "aiplatform.googleapis.com",
    "iam.googleapis.com",
    "logging.googleapis.com",
    "monitoring.googleapis.com",
];

/// Project-level roles the service account needs.
pub const SERVICE_ACCOUNT_ROLES: [&str; 7] = [
    "roles/storage.objectAdmin",
    "roles/datastore.user",
    "roles/aiplatform.user",
    "roles/run.invoker",
    "roles/logging.logWriter",
    "roles/monitoring.metricWriter",
    "roles/monitoring.viewer",
];

/// Role granted on a created bucket (bucket-scoped, not project-wide).
pub const BUCKET_ROLE: &str = "roles/storage.objectAdmin";

/// Everything the setup flow needs, threaded explicitly through each step.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub project: String,
    /// Local part of the service account email.
    pub service_account: String,
    pub display_name: String,
}

impl SetupConfig {
    #[must_use]
    pub fn new(project: String, service_account: String, display_name: String) -> Self {
        Self {
            project,
            service_account,
            display_name,
        }
    }

    /// Derived service account email.
    #[must_use]
    pub fn service_account_email(&self) -> String {
        format!(
            "{}@{}.iam.gserviceaccount.com",
            self.service_account, self.project
        )
    }

    /// The email as an IAM policy member string.
    #[must_use]
    pub fn member(&self) -> String {
        format!("serviceAccount:{}", self.service_account_email())
    }
}

/// What the role-binding step did, for the summary.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RoleBindingOutcome {
    pub granted: usize,
    pub skipped: usize,
}

/// Enable all required APIs in one call.
pub fn enable_apis(client: &GcloudClient, config: &SetupConfig) -> Result<()> {
    info!(project = %config.project, count = REQUIRED_APIS.len(), "enabling APIs");
    client
        .enable_services(&config.project, &REQUIRED_APIS)
        .context("failed to enable required APIs")?;
    ui::print_success(&format!("{} APIs enabled", REQUIRED_APIS.len()));
    Ok(())
}

/// Create the service account if it does not exist yet.
///
/// Returns whether a create call was issued.
pub fn ensure_service_account(client: &GcloudClient, config: &SetupConfig) -> Result<bool> {
    let email = config.service_account_email();

    let exists = client
        .service_account_exists(&config.project, &email)
        .context("failed to check for the service account")?;

    if exists {
        info!(%email, "service account already exists");
        ui::print_success(&format!("Service account {email} already exists"));
        return Ok(false);
    }

    info!(%email, "creating service account");

    client
        .create_service_account(&CreateServiceAccountRequest {
            project: config.project.clone(),
            name: config.service_account.clone(),
            display_name: config.display_name.clone(),
        })
        .context("failed to create the service account")?;

    ui::print_success(&format!("Service account {email} created"));
    Ok(true)
}

/// Grant every role in [`SERVICE_ACCOUNT_ROLES`] that is not already bound.
///
/// The policy is queried per role; a present (member, role) pair is skipped.
/// The first failed grant aborts the remaining iterations.
pub fn bind_roles(client: &GcloudClient, config: &SetupConfig) -> Result<RoleBindingOutcome> {
    let member = config.member();
    let mut outcome = RoleBindingOutcome::default();

    for role in SERVICE_ACCOUNT_ROLES {
        let bound = client
            .project_has_binding(&config.project, &member, role)
            .with_context(|| format!("failed to read the IAM policy while checking {role}"))?;

        if bound {
            debug!(role, "binding already present");
            ui::print_info(&format!("{role} already assigned"));
            outcome.skipped += 1;
            continue;
        }

        info!(role, member = %member, "granting role");
        client
            .add_project_binding(&config.project, &member, role)
            .with_context(|| format!("failed to grant {role}"))?;
        ui::print_success(&format!("{role} granted"));
        outcome.granted += 1;
    }

    Ok(outcome)
}

/// Create a bucket and grant the service account access to it.
///
/// If the grant fails after the bucket was created, the bucket is left in
/// place and the error is fatal.
pub fn create_bucket(client: &GcloudClient, config: &SetupConfig, name: &str) -> Result<()> {
    info!(bucket = name, "creating bucket");
    client
        .create_bucket(&CreateBucketRequest {
            project: config.project.clone(),
            name: name.to_string(),
            location: DEFAULT_REGION.to_string(),
            uniform_access: true,
        })
        .with_context(|| format!("failed to create bucket gs://{name}"))?;
    ui::print_success(&format!("Bucket gs://{name} created"));

    client
        .add_bucket_binding(name, &config.member(), BUCKET_ROLE)
        .with_context(|| format!("failed to grant {BUCKET_ROLE} on gs://{name}"))?;
    ui::print_success(&format!("{BUCKET_ROLE} granted on gs://{name}"));

    Ok(())
}

/// Create the default Firestore database if the project has none.
///
/// Returns whether a create call was issued.
pub fn ensure_database(client: &GcloudClient, config: &SetupConfig) -> Result<bool> {
    let exists = client
        .default_database_exists(&config.project)
        .context("failed to list Firestore databases")?;

    if exists {
        info!(project = %config.project, "Firestore database already exists");
        ui::print_success("Firestore database already exists");
        return Ok(false);
    }

    info!(project = %config.project, "creating Firestore database");
    client
        .create_database(&CreateDatabaseRequest {
            project: config.project.clone(),
            location: DEFAULT_REGION.to_string(),
            database_type: DatabaseType::FirestoreNative,
        })
        .context("failed to create the Firestore database")?;

    ui::print_success("Firestore database created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_derived_from_name_and_project() {
        let config = SetupConfig::new(
            "demo-proj".into(),
            DEFAULT_SERVICE_ACCOUNT.into(),
            DEFAULT_DISPLAY_NAME.into(),
        );
        assert_eq!(
            config.service_account_email(),
            "video-analysis-app@demo-proj.iam.gserviceaccount.com"
        );
        assert_eq!(
            config.member(),
            "serviceAccount:video-analysis-app@demo-proj.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn role_list_has_no_duplicates() {
        let mut roles: Vec<&str> = SERVICE_ACCOUNT_ROLES.to_vec();
        roles.sort_unstable();
        roles.dedup();
        assert_eq!(roles.len(), SERVICE_ACCOUNT_ROLES.len());
    }
}
