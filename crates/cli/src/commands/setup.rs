//! `vida setup` — provision Google Cloud resources for the app.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use tracing::info;
use vida_gcloud::GcloudClient;

use crate::provision::{
    self, SetupConfig, DEFAULT_DISPLAY_NAME, DEFAULT_REGION, DEFAULT_SERVICE_ACCOUNT,
};
use crate::ui;
use crate::validator::PrerequisitesValidator;

/// Provision APIs, the service account, roles, and optional resources
#[derive(Debug, Args)]
pub struct SetupCommand {
    /// Google Cloud project to provision
    #[arg(short, long, value_name = "PROJECT_ID")]
    pub project: String,

    /// Service account name (local part of the email)
    #[arg(short = 's', long, value_name = "NAME", default_value = DEFAULT_SERVICE_ACCOUNT)]
    pub service_account: String,

    /// Service account display name
    #[arg(short = 'd', long, value_name = "NAME", default_value = DEFAULT_DISPLAY_NAME)]
    pub display_name: String,

    /// Skip interactive prompts; no optional resources are created
    #[arg(long)]
    pub non_interactive: bool,
}

impl SetupCommand {
    pub fn run(&self) -> Result<()> {
        ui::print_banner();
        ui::print_section("Provisioning the Video Analysis App");

        ui::print_step(1, 5, "Checking prerequisites");
        PrerequisitesValidator::new().validate()?;

        self.run_with(&GcloudClient::new())
    }

    /// The provisioning flow itself, against any client.
    ///
    /// Split from [`run`](Self::run) so tests can drive the full flow with a
    /// fake command runner.
    pub fn run_with(&self, client: &GcloudClient) -> Result<()> {
        let config = SetupConfig::new(
            self.project.clone(),
            self.service_account.clone(),
            self.display_name.clone(),
        );
        info!(project = %config.project, "starting setup");

        ui::print_step(2, 5, "Enabling APIs");
        provision::enable_apis(client, &config)?;

        ui::print_step(3, 5, "Provisioning the service account");
        provision::ensure_service_account(client, &config)?;

        ui::print_step(4, 5, "Binding IAM roles");
        provision::bind_roles(client, &config)?;

        ui::print_step(5, 5, "Optional resources");
        let bucket = self.maybe_create_bucket(client, &config)?;
        self.maybe_create_database(client, &config)?;

        info!(project = %config.project, "setup finished");
        print_summary(&config, bucket.as_deref());
        Ok(())
    }

    /// Offer to create a storage bucket; returns its name if one was made.
    fn maybe_create_bucket(
        &self,
        client: &GcloudClient,
        config: &SetupConfig,
    ) -> Result<Option<String>> {
        if self.non_interactive {
            ui::print_info("Skipping bucket creation (non-interactive)");
            return Ok(None);
        }

        let theme = ColorfulTheme::default();
        let create = Confirm::with_theme(&theme)
            .with_prompt("Create a storage bucket for uploaded videos?")
            .default(true)
            .interact()
            .context("failed to read the bucket prompt")?;

        if !create {
            return Ok(None);
        }

        let name: String = Input::with_theme(&theme)
            .with_prompt("Bucket name")
            .default(format!("{}-videos", config.project))
            .interact_text()
            .context("failed to read the bucket name")?;

        provision::create_bucket(client, config, &name)?;
        Ok(Some(name))
    }

    /// Offer to create the default Firestore database.
    fn maybe_create_database(&self, client: &GcloudClient, config: &SetupConfig) -> Result<()> {
        if self.non_interactive {
            ui::print_info("Skipping database creation (non-interactive)");
            return Ok(());
        }

        let create = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Create the Firestore database?")
            .default(true)
            .interact()
            .context("failed to read the database prompt")?;

        if create {
            provision::ensure_database(client, config)?;
        }
        Ok(())
    }
}

/// Environment values for the summary, in print order.
///
/// The bucket line is present only when a bucket was created in this run.
fn summary_env_lines(config: &SetupConfig, bucket: Option<&str>) -> Vec<(&'static str, String)> {
    let mut lines = vec![("GCP_PROJECT", config.project.clone())];
    if let Some(bucket) = bucket {
        lines.push(("GCS_BUCKET", bucket.to_string()));
    }
    lines.push(("DEFAULT_REGION", DEFAULT_REGION.to_string()));
    lines.push(("SERVICE_ACCOUNT", config.service_account_email()));
    lines
}

/// Print next-step instructions.
fn print_summary(config: &SetupConfig, bucket: Option<&str>) {
    ui::print_section("Next steps");

    println!("{}", "Environment (.env):".bold());
    for (key, value) in summary_env_lines(config, bucket) {
        ui::print_kv(key, &value);
    }
    println!();

    ui::print_numbered_step(1, "Copy the values above into .env (see .env.example)");
    ui::print_numbered_step(2, "Deploy the application: vida deploy");
    println!();
    ui::print_success("Setup complete!");
}
