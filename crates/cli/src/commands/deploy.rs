//! `vida deploy` — deploy the web application to Cloud Run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use vida_gcloud::{DeployRequest, GcloudClient};

use crate::env_file;
use crate::provision::DEFAULT_SERVICE_NAME;
use crate::ui;

/// Cloud Run memory limit for the app (video frames are held in memory).
const DEPLOY_MEMORY: &str = "2Gi";

/// Request timeout in seconds; long-running video analyses need the maximum.
const DEPLOY_TIMEOUT_SECS: u32 = 3600;

/// Deploy the application to Cloud Run using values from the env file
#[derive(Debug, Args)]
pub struct DeployCommand {
    /// Environment file to read deployment settings from
    #[arg(long, value_name = "FILE", default_value = ".env")]
    pub env_file: PathBuf,

    /// Cloud Run service name
    #[arg(long, value_name = "NAME", default_value = DEFAULT_SERVICE_NAME)]
    pub service: String,

    /// Source directory to build and deploy
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub source: String,
}

impl DeployCommand {
    pub fn run(&self) -> Result<()> {
        ui::print_section("Deploying the Video Analysis App");

        // The env file must be readable before any remote call is attempted.
        let env = env_file::load(&self.env_file)?;
        let project = env
            .project
            .clone()
            .with_context(|| format!("GCP_PROJECT is not set in {}", self.env_file.display()))?;

        let request = self.build_request(&project, &env);

        ui::print_kv("Project", &project);
        ui::print_kv("Region", env.region());
        if let Some(bucket) = &env.bucket {
            ui::print_kv("Bucket", bucket);
        }
        println!();

        ui::print_info(&format!(
            "Deploying {} from {} (this builds remotely and can take several minutes)",
            self.service, self.source
        ));

        info!(service = %self.service, project = %project, region = %env.region(), "deploying to Cloud Run");
        GcloudClient::new()
            .deploy_service(&request)
            .context("deploy failed")?;

        info!(service = %self.service, "deploy finished");
        ui::print_success(&format!("{} deployed", self.service));
        Ok(())
    }

    /// Assemble the Cloud Run request from the parsed env file.
    fn build_request(&self, project: &str, env: &env_file::DeployEnv) -> DeployRequest {
        let mut env_vars = vec![("GOOGLE_CLOUD_PROJECT".to_string(), project.to_string())];
        if let Some(bucket) = &env.bucket {
            env_vars.push(("BUCKET_NAME".to_string(), bucket.clone()));
        }

        DeployRequest {
            project: project.to_string(),
            service: self.service.clone(),
            source: self.source.clone(),
            region: env.region().to_string(),
            memory: DEPLOY_MEMORY.to_string(),
            timeout_secs: DEPLOY_TIMEOUT_SECS,
            allow_unauthenticated: true,
            env_vars,
        }
    }
}
