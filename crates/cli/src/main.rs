//! Video Analysis App provisioning CLI.
//!
//! Provisions Google Cloud infrastructure for the Video Analysis App
//! (APIs, service account, IAM roles, optional bucket and Firestore
//! database) and deploys the containerized web service to Cloud Run.
//! All provisioning steps are idempotent - re-running setup against an
//! already provisioned project changes nothing and reports each resource
//! as present.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vida_cli::commands::deploy::DeployCommand;
use vida_cli::commands::prompt::{self, PromptSubcommand};
use vida_cli::commands::setup::SetupCommand;
use vida_cli::ui;

/// Video Analysis App - cloud provisioning and deployment.
#[derive(Debug, Parser)]
#[command(
    name = "vida",
    version,
    about = "Provision and deploy the Video Analysis App on Google Cloud",
    long_about = "Provision Google Cloud infrastructure for the Video Analysis App\n\
                  and deploy it to Cloud Run.\n\n\
                  Setup is idempotent - re-running the same command against an\n\
                  already provisioned project makes no changes."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Enable APIs, create the service account, bind roles, and optionally
    /// create the bucket and Firestore database.
    Setup(SetupCommand),

    /// Deploy the web application to Cloud Run using values from .env.
    Deploy(DeployCommand),

    /// Render one of the LLM prompt templates to stdout.
    Prompt {
        #[command(subcommand)]
        subcommand: PromptSubcommand,
    },
}

fn main() {
    // The provisioning surface exits 1 on usage errors; clap defaults to 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(i32::from(err.use_stderr()));
        }
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn,vida_cli=info,vida_gcloud=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain
        ui::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Setup(cmd) => cmd.run(),
        Commands::Deploy(cmd) => cmd.run(),
        Commands::Prompt { subcommand } => prompt::run(&subcommand),
    }
}
