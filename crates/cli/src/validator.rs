//! Prerequisite checks for the vida CLI.

use anyhow::Result;
use colored::Colorize;

use crate::ui;

/// Validates local tooling before any remote call is attempted.
pub struct PrerequisitesValidator {
    requirements: Vec<Requirement>,
}

struct Requirement {
    name: String,
    binary: &'static str,
    install_instructions: String,
    critical: bool,
}

impl PrerequisitesValidator {
    #[must_use]
    pub fn new() -> Self {
        let requirements = vec![
            Requirement {
                name: "gcloud".to_string(),
                binary: "gcloud",
                install_instructions: "Install the Google Cloud CLI from https://cloud.google.com/sdk/docs/install".to_string(),
                critical: true,
            },
            Requirement {
                name: "Docker".to_string(),
                binary: "docker",
                install_instructions:
                    "Install Docker from https://docker.com (only needed for local image builds)"
                        .to_string(),
                critical: false,
            },
        ];

        Self { requirements }
    }

    /// Check every requirement, printing a per-tool result line.
    ///
    /// # Errors
    /// Fails if any critical tool is missing.
    pub fn validate(&self) -> Result<()> {
        println!();
        let mut failures = Vec::new();

        for requirement in &self.requirements {
            if which::which(requirement.binary).is_ok() {
                ui::print_check_result(&requirement.name, true, None);
            } else {
                ui::print_check_result(&requirement.name, false, None);
                failures.push(requirement);
            }
        }

        println!();

        if failures.is_empty() {
            ui::print_success("All prerequisites met!");
        } else {
            ui::print_warning("Some prerequisites are not met:");
            println!();
            for failure in &failures {
                if failure.critical {
                    println!(
                        "  {} {} - {}",
                        "✗".red(),
                        failure.name.red(),
                        failure.install_instructions.bright_black()
                    );
                } else {
                    println!(
                        "  {} {} - {}",
                        "⚠".yellow(),
                        failure.name.yellow(),
                        failure.install_instructions.bright_black()
                    );
                }
            }
            println!();

            if failures.iter().any(|f| f.critical) {
                return Err(anyhow::anyhow!(
                    "Critical prerequisites not met. Please install the required tools and try again."
                ));
            }
        }

        Ok(())
    }
}

impl Default for PrerequisitesValidator {
    fn default() -> Self {
        Self::new()
    }
}
