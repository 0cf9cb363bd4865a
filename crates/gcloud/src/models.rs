//! Request and response models for the gcloud CLI surface.
//!
//! Mutations are expressed as typed request objects that know how to render
//! their own argv; responses are the JSON documents gcloud prints with
//! `--format=json`.

use serde::Deserialize;

// ============================================================================
// IAM policy document
// ============================================================================

/// A project or bucket IAM policy, as printed by `get-iam-policy`.
#[derive(Debug, Clone, Deserialize)]
pub struct IamPolicy {
    #[serde(default)]
    pub bindings: Vec<IamBinding>,
}

/// One role-to-members binding inside an IAM policy.
#[derive(Debug, Clone, Deserialize)]
pub struct IamBinding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl IamPolicy {
    /// Whether `member` already holds `role` in this policy.
    #[must_use]
    pub fn has_binding(&self, member: &str, role: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.role == role && b.members.iter().any(|m| m == member))
    }
}

// ============================================================================
// Firestore
// ============================================================================

/// One entry from `gcloud firestore databases list --format=json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDatabase {
    /// Fully qualified name, e.g.
    /// `projects/demo-proj/databases/(default)`.
    pub name: String,
}

impl FirestoreDatabase {
    /// Whether this is the project's `(default)` database.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name.ends_with("/databases/(default)")
    }
}

/// Firestore engine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// Native mode, used by the Video Analysis App.
    FirestoreNative,
    /// Datastore compatibility mode.
    DatastoreMode,
}

impl DatabaseType {
    #[must_use]
    pub fn as_flag_value(self) -> &'static str {
        match self {
            Self::FirestoreNative => "firestore-native",
            Self::DatastoreMode => "datastore-mode",
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Request to create a service account.
#[derive(Debug, Clone)]
pub struct CreateServiceAccountRequest {
    pub project: String,
    /// Local part of the account email.
    pub name: String,
    pub display_name: String,
}

impl CreateServiceAccountRequest {
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        vec![
            "iam".into(),
            "service-accounts".into(),
            "create".into(),
            self.name.clone(),
            "--project".into(),
            self.project.clone(),
            "--display-name".into(),
            self.display_name.clone(),
        ]
    }
}

/// Request to create a storage bucket.
#[derive(Debug, Clone)]
pub struct CreateBucketRequest {
    pub project: String,
    /// Bucket name without the `gs://` prefix.
    pub name: String,
    pub location: String,
    /// Manage permissions at the bucket level only, not per object.
    pub uniform_access: bool,
}

impl CreateBucketRequest {
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "storage".into(),
            "buckets".into(),
            "create".into(),
            format!("gs://{}", self.name),
            "--project".into(),
            self.project.clone(),
            "--location".into(),
            self.location.clone(),
        ];
        if self.uniform_access {
            args.push("--uniform-bucket-level-access".into());
        }
        args
    }
}

/// Request to create the project's default Firestore database.
#[derive(Debug, Clone)]
pub struct CreateDatabaseRequest {
    pub project: String,
    pub location: String,
    pub database_type: DatabaseType,
}

impl CreateDatabaseRequest {
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        vec![
            "firestore".into(),
            "databases".into(),
            "create".into(),
            "--project".into(),
            self.project.clone(),
            "--location".into(),
            self.location.clone(),
            "--type".into(),
            self.database_type.as_flag_value().into(),
        ]
    }
}

/// Request to deploy a Cloud Run service from source.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub project: String,
    pub service: String,
    /// Source directory to build and deploy.
    pub source: String,
    pub region: String,
    /// Memory limit, e.g. `2Gi`.
    pub memory: String,
    /// Request timeout in seconds.
    pub timeout_secs: u32,
    /// Allow unauthenticated (public) access.
    pub allow_unauthenticated: bool,
    /// Environment variables for the deployed service, in order.
    pub env_vars: Vec<(String, String)>,
}

impl DeployRequest {
    /// Render `env_vars` as the comma-separated `--set-env-vars` value.
    #[must_use]
    pub fn env_vars_arg(&self) -> String {
        self.env_vars
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "run".into(),
            "deploy".into(),
            self.service.clone(),
            "--project".into(),
            self.project.clone(),
            "--source".into(),
            self.source.clone(),
            "--region".into(),
            self.region.clone(),
            "--memory".into(),
            self.memory.clone(),
            "--timeout".into(),
            self.timeout_secs.to_string(),
        ];
        if self.allow_unauthenticated {
            args.push("--allow-unauthenticated".into());
        }
        if !self.env_vars.is_empty() {
            args.push("--set-env-vars".into());
            args.push(self.env_vars_arg());
        }
        args.push("--quiet".into());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_binding_lookup_matches_member_and_role() {
        let json = r#"{
            "bindings": [
                {
                    "role": "roles/datastore.user",
                    "members": [
                        "serviceAccount:video-analysis-app@demo-proj.iam.gserviceaccount.com",
                        "user:someone@example.com"
                    ]
                },
                {
                    "role": "roles/run.invoker",
                    "members": ["allUsers"]
                }
            ],
            "etag": "BwYp0ab=",
            "version": 1
        }"#;

        let policy: IamPolicy = serde_json::from_str(json).unwrap();
        let member = "serviceAccount:video-analysis-app@demo-proj.iam.gserviceaccount.com";

        assert!(policy.has_binding(member, "roles/datastore.user"));
        assert!(!policy.has_binding(member, "roles/run.invoker"));
        assert!(!policy.has_binding(member, "roles/storage.objectAdmin"));
    }

    #[test]
    fn policy_without_bindings_parses() {
        let policy: IamPolicy = serde_json::from_str(r#"{"etag": "BwYp0ab="}"#).unwrap();
        assert!(!policy.has_binding("serviceAccount:x@y.iam.gserviceaccount.com", "roles/x"));
    }

    #[test]
    fn default_database_detection() {
        let default = FirestoreDatabase {
            name: "projects/demo-proj/databases/(default)".into(),
        };
        let named = FirestoreDatabase {
            name: "projects/demo-proj/databases/analytics".into(),
        };
        assert!(default.is_default());
        assert!(!named.is_default());
    }

    #[test]
    fn deploy_args_embed_env_vars_in_order() {
        let req = DeployRequest {
            project: "demo-proj".into(),
            service: "video-analysis-app".into(),
            source: ".".into(),
            region: "us-central1".into(),
            memory: "2Gi".into(),
            timeout_secs: 3600,
            allow_unauthenticated: true,
            env_vars: vec![
                ("GOOGLE_CLOUD_PROJECT".into(), "demo-proj".into()),
                ("BUCKET_NAME".into(), "my-bucket".into()),
            ],
        };

        assert_eq!(
            req.env_vars_arg(),
            "GOOGLE_CLOUD_PROJECT=demo-proj,BUCKET_NAME=my-bucket"
        );

        let args = req.args();
        assert_eq!(args[0..3], ["run", "deploy", "video-analysis-app"]);
        assert!(args.contains(&"--memory".to_string()));
        assert!(args.contains(&"2Gi".to_string()));
        assert!(args.contains(&"3600".to_string()));
        assert!(args.contains(&"--allow-unauthenticated".to_string()));
        assert!(args.contains(&"GOOGLE_CLOUD_PROJECT=demo-proj,BUCKET_NAME=my-bucket".to_string()));
    }

    #[test]
    fn bucket_args_include_uniform_access_flag() {
        let req = CreateBucketRequest {
            project: "demo-proj".into(),
            name: "my-bucket".into(),
            location: "us-central1".into(),
            uniform_access: true,
        };
        let args = req.args();
        assert!(args.contains(&"gs://my-bucket".to_string()));
        assert!(args.contains(&"--uniform-bucket-level-access".to_string()));
    }
}
