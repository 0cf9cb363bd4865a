//! Setup-flow scenarios against a scripted gcloud fake.
//!
//! These tests drive the real provisioning steps with a fake command runner,
//! asserting which gcloud invocations would (and would not) be issued.

use std::sync::{Arc, Mutex};

use vida_cli::commands::setup::SetupCommand;
use vida_cli::provision::{self, SetupConfig, REQUIRED_APIS, SERVICE_ACCOUNT_ROLES};
use vida_gcloud::{CommandOutput, CommandRunner, GcloudClient, GcloudError};

const MEMBER: &str = "serviceAccount:video-analysis-app@demo-proj.iam.gserviceaccount.com";

/// Scripted stand-in for the gcloud binary.
///
/// Existence checks are answered from the configured state; every argv is
/// recorded so tests can assert which mutations were issued. Clones share
/// the call log.
#[derive(Default, Clone)]
struct FakeGcloud {
    account_exists: bool,
    bound_roles: Vec<&'static str>,
    database_exists: bool,
    /// Role whose grant should fail, simulating a denied policy update.
    fail_grant_for: Option<&'static str>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeGcloud {
    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn client(&self) -> GcloudClient {
        GcloudClient::with_runner(Box::new(self.clone()))
    }

    fn policy_json(&self) -> String {
        let bindings: Vec<String> = self
            .bound_roles
            .iter()
            .map(|role| format!(r#"{{"role": "{role}", "members": ["{MEMBER}"]}}"#))
            .collect();
        format!(r#"{{"bindings": [{}]}}"#, bindings.join(","))
    }
}

impl CommandRunner for FakeGcloud {
    fn run(&self, _program: &str, args: &[String]) -> Result<CommandOutput, GcloudError> {
        self.calls.lock().unwrap().push(args.to_vec());

        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = match argv.as_slice() {
            ["iam", "service-accounts", "describe", ..] => {
                if self.account_exists {
                    CommandOutput::new(0, "{}", "")
                } else {
                    CommandOutput::new(1, "", "NOT_FOUND: Unknown service account")
                }
            }
            ["projects", "get-iam-policy", ..] => CommandOutput::new(0, self.policy_json(), ""),
            ["projects", "add-iam-policy-binding", ..] => match self.fail_grant_for {
                Some(role) if args.contains(&role.to_string()) => {
                    CommandOutput::new(1, "", "ERROR: Policy update access denied")
                }
                _ => CommandOutput::new(0, "", ""),
            },
            ["firestore", "databases", "list", ..] => {
                if self.database_exists {
                    CommandOutput::new(
                        0,
                        r#"[{"name": "projects/demo-proj/databases/(default)"}]"#,
                        "",
                    )
                } else {
                    CommandOutput::new(0, "[]", "")
                }
            }
            _ => CommandOutput::new(0, "", ""),
        };
        Ok(output)
    }
}

fn config() -> SetupConfig {
    SetupConfig::new(
        "demo-proj".into(),
        "video-analysis-app".into(),
        "Video Analysis App Service Account".into(),
    )
}

/// Count recorded invocations whose argv starts with the given words.
fn count_calls(calls: &[Vec<String>], prefix: &[&str]) -> usize {
    calls
        .iter()
        .filter(|argv| {
            argv.len() >= prefix.len()
                && argv[..prefix.len()]
                    .iter()
                    .zip(prefix)
                    .all(|(a, p)| a == p)
        })
        .count()
}

#[test]
fn fresh_project_provisions_everything() {
    let fake = FakeGcloud::default();
    let client = fake.client();

    let config = config();
    provision::enable_apis(&client, &config).unwrap();
    let created = provision::ensure_service_account(&client, &config).unwrap();
    let outcome = provision::bind_roles(&client, &config).unwrap();
    let db_created = provision::ensure_database(&client, &config).unwrap();

    assert!(created);
    assert!(db_created);
    assert_eq!(outcome.granted, SERVICE_ACCOUNT_ROLES.len());
    assert_eq!(outcome.skipped, 0);

    let calls = fake.calls();

    // One batched enable call carrying all nine APIs
    assert_eq!(count_calls(&calls, &["services", "enable"]), 1);
    let enable = calls
        .iter()
        .find(|argv| argv.first().is_some_and(|a| a == "services"))
        .unwrap();
    for api in REQUIRED_APIS {
        assert!(enable.contains(&api.to_string()), "missing {api}");
    }

    assert_eq!(count_calls(&calls, &["iam", "service-accounts", "create"]), 1);
    assert_eq!(
        count_calls(&calls, &["projects", "add-iam-policy-binding"]),
        SERVICE_ACCOUNT_ROLES.len()
    );
    assert_eq!(count_calls(&calls, &["firestore", "databases", "create"]), 1);
}

#[test]
fn second_run_changes_nothing() {
    let fake = FakeGcloud {
        account_exists: true,
        bound_roles: SERVICE_ACCOUNT_ROLES.to_vec(),
        database_exists: true,
        ..FakeGcloud::default()
    };
    let client = fake.client();

    let config = config();
    provision::enable_apis(&client, &config).unwrap();
    let created = provision::ensure_service_account(&client, &config).unwrap();
    let outcome = provision::bind_roles(&client, &config).unwrap();
    let db_created = provision::ensure_database(&client, &config).unwrap();

    assert!(!created);
    assert!(!db_created);
    assert_eq!(outcome.granted, 0);
    assert_eq!(outcome.skipped, SERVICE_ACCOUNT_ROLES.len());

    let calls = fake.calls();
    assert_eq!(count_calls(&calls, &["iam", "service-accounts", "create"]), 0);
    assert_eq!(count_calls(&calls, &["projects", "add-iam-policy-binding"]), 0);
    assert_eq!(count_calls(&calls, &["firestore", "databases", "create"]), 0);

    // The policy is still queried once per role
    assert_eq!(
        count_calls(&calls, &["projects", "get-iam-policy"]),
        SERVICE_ACCOUNT_ROLES.len()
    );
}

#[test]
fn failed_grant_aborts_remaining_roles() {
    let fail_role = SERVICE_ACCOUNT_ROLES[1];
    let fake = FakeGcloud {
        fail_grant_for: Some(fail_role),
        ..FakeGcloud::default()
    };
    let client = fake.client();

    let err = provision::bind_roles(&client, &config()).unwrap_err();
    assert!(err.to_string().contains(fail_role));

    let calls = fake.calls();
    // First role granted, second failed, later roles never reached
    assert_eq!(count_calls(&calls, &["projects", "add-iam-policy-binding"]), 2);
    assert_eq!(count_calls(&calls, &["projects", "get-iam-policy"]), 2);
}

#[test]
fn non_interactive_run_skips_optional_resources() {
    let fake = FakeGcloud::default();
    let cmd = SetupCommand {
        project: "demo-proj".into(),
        service_account: "video-analysis-app".into(),
        display_name: "Video Analysis App Service Account".into(),
        non_interactive: true,
    };
    cmd.run_with(&fake.client()).unwrap();

    let calls = fake.calls();
    // The required steps still run
    assert_eq!(count_calls(&calls, &["services", "enable"]), 1);
    assert_eq!(count_calls(&calls, &["iam", "service-accounts", "create"]), 1);
    assert_eq!(
        count_calls(&calls, &["projects", "add-iam-policy-binding"]),
        SERVICE_ACCOUNT_ROLES.len()
    );

    // No optional resources are touched: no bucket or database calls at all
    assert_eq!(count_calls(&calls, &["storage"]), 0);
    assert_eq!(count_calls(&calls, &["firestore"]), 0);
}

#[test]
fn bucket_creation_grants_bucket_scoped_access() {
    let fake = FakeGcloud::default();
    let client = fake.client();

    provision::create_bucket(&client, &config(), "my-bucket").unwrap();

    let calls = fake.calls();
    let create = calls
        .iter()
        .find(|argv| count_calls(std::slice::from_ref(argv), &["storage", "buckets", "create"]) == 1)
        .unwrap();
    assert!(create.contains(&"gs://my-bucket".to_string()));
    assert!(create.contains(&"--uniform-bucket-level-access".to_string()));

    let binding = calls
        .iter()
        .find(|argv| argv.contains(&"add-iam-policy-binding".to_string()) && argv[0] == "storage")
        .unwrap();
    assert!(binding.contains(&"gs://my-bucket".to_string()));
    assert!(binding.contains(&"roles/storage.objectAdmin".to_string()));
    assert!(binding.contains(&MEMBER.to_string()));

    // Bucket access is never granted project-wide here
    assert_eq!(count_calls(&calls, &["projects", "add-iam-policy-binding"]), 0);
}
