//! The gcloud CLI client.

use tracing::{debug, info};

use crate::error::{GcloudError, Result};
use crate::models::{
    CreateBucketRequest, CreateDatabaseRequest, CreateServiceAccountRequest, DeployRequest,
    FirestoreDatabase, IamPolicy,
};
use crate::runner::{CommandOutput, CommandRunner, SystemRunner, GCLOUD};

/// Client for the gcloud CLI.
///
/// Holds the [`CommandRunner`] through which every call is issued. All
/// methods block until the underlying command exits; any non-zero exit is
/// fatal to the caller except where noted (existence checks, benign
/// "already exists" races).
pub struct GcloudClient {
    runner: Box<dyn CommandRunner>,
}

impl Default for GcloudClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GcloudClient {
    /// Client backed by the real gcloud binary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemRunner))
    }

    /// Client backed by an arbitrary runner (fakes in tests).
    #[must_use]
    pub fn with_runner(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Issue a gcloud call whose failure is fatal.
    fn gcloud(&self, args: Vec<String>) -> Result<CommandOutput> {
        let output = self.runner.run(GCLOUD, &args)?;
        if output.success() {
            Ok(output)
        } else {
            Err(GcloudError::CommandFailed {
                command: format!("{GCLOUD} {}", args.join(" ")),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    /// Issue a gcloud call and hand the raw output back to the caller.
    fn gcloud_raw(&self, args: Vec<String>) -> Result<CommandOutput> {
        self.runner.run(GCLOUD, &args)
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// Enable a set of APIs on the project in one batched call.
    ///
    /// Re-enabling an already-enabled API is a provider-side no-op.
    pub fn enable_services(&self, project: &str, services: &[&str]) -> Result<()> {
        info!(project, count = services.len(), "enabling APIs");

        let mut args: Vec<String> = vec!["services".into(), "enable".into()];
        args.extend(services.iter().map(|s| (*s).to_string()));
        args.push("--project".into());
        args.push(project.to_string());

        self.gcloud(args)?;
        Ok(())
    }

    // ========================================================================
    // Service accounts
    // ========================================================================

    /// Whether a service account with the given email exists.
    ///
    /// # Errors
    /// Returns an error only if the command could not be run; a non-zero
    /// exit from `describe` means the account is absent.
    pub fn service_account_exists(&self, project: &str, email: &str) -> Result<bool> {
        let output = self.gcloud_raw(vec![
            "iam".into(),
            "service-accounts".into(),
            "describe".into(),
            email.to_string(),
            "--project".into(),
            project.to_string(),
        ])?;
        Ok(output.success())
    }

    /// Create a service account.
    ///
    /// A concurrent invocation may win the check-then-act race; the
    /// provider's "already exists" rejection is treated as success.
    pub fn create_service_account(&self, req: &CreateServiceAccountRequest) -> Result<()> {
        info!(project = %req.project, name = %req.name, "creating service account");

        let args = req.args();
        let output = self.gcloud_raw(args.clone())?;
        if output.success() {
            return Ok(());
        }
        if output.stderr.contains("already exists") {
            debug!(name = %req.name, "service account already exists, treating as success");
            return Ok(());
        }
        Err(GcloudError::CommandFailed {
            command: format!("{GCLOUD} {}", args.join(" ")),
            stderr: output.stderr.trim().to_string(),
        })
    }

    // ========================================================================
    // IAM role bindings
    // ========================================================================

    /// Whether `member` holds `role` on the project, per the current policy.
    pub fn project_has_binding(&self, project: &str, member: &str, role: &str) -> Result<bool> {
        let output = self.gcloud(vec![
            "projects".into(),
            "get-iam-policy".into(),
            project.to_string(),
            "--format=json".into(),
        ])?;
        let policy: IamPolicy = serde_json::from_str(&output.stdout)?;
        Ok(policy.has_binding(member, role))
    }

    /// Grant `role` to `member` on the project.
    pub fn add_project_binding(&self, project: &str, member: &str, role: &str) -> Result<()> {
        info!(project, member, role, "adding project IAM binding");

        self.gcloud(vec![
            "projects".into(),
            "add-iam-policy-binding".into(),
            project.to_string(),
            "--member".into(),
            member.to_string(),
            "--role".into(),
            role.to_string(),
            "--quiet".into(),
        ])?;
        Ok(())
    }

    // ========================================================================
    // Storage
    // ========================================================================

    /// Create a storage bucket.
    pub fn create_bucket(&self, req: &CreateBucketRequest) -> Result<()> {
        info!(project = %req.project, bucket = %req.name, "creating bucket");
        self.gcloud(req.args())?;
        Ok(())
    }

    /// Grant `role` to `member` on one bucket (not project-wide).
    pub fn add_bucket_binding(&self, bucket: &str, member: &str, role: &str) -> Result<()> {
        info!(bucket, member, role, "adding bucket IAM binding");

        self.gcloud(vec![
            "storage".into(),
            "buckets".into(),
            "add-iam-policy-binding".into(),
            format!("gs://{bucket}"),
            "--member".into(),
            member.to_string(),
            "--role".into(),
            role.to_string(),
        ])?;
        Ok(())
    }

    // ========================================================================
    // Firestore
    // ========================================================================

    /// Whether the project already has its `(default)` database.
    pub fn default_database_exists(&self, project: &str) -> Result<bool> {
        let output = self.gcloud(vec![
            "firestore".into(),
            "databases".into(),
            "list".into(),
            "--project".into(),
            project.to_string(),
            "--format=json".into(),
        ])?;
        let databases: Vec<FirestoreDatabase> = serde_json::from_str(&output.stdout)?;
        Ok(databases.iter().any(FirestoreDatabase::is_default))
    }

    /// Create the project's default Firestore database.
    pub fn create_database(&self, req: &CreateDatabaseRequest) -> Result<()> {
        info!(project = %req.project, location = %req.location, "creating Firestore database");
        self.gcloud(req.args())?;
        Ok(())
    }

    // ========================================================================
    // Cloud Run
    // ========================================================================

    /// Deploy a Cloud Run service from source.
    pub fn deploy_service(&self, req: &DeployRequest) -> Result<()> {
        info!(
            project = %req.project,
            service = %req.service,
            region = %req.region,
            "deploying Cloud Run service"
        );
        self.gcloud(req.args())?;
        Ok(())
    }
}
