//! `vida prompt` — render the LLM prompt templates.
//!
//! Useful for inspecting exactly what the application sends to Vertex AI and
//! for trying template edits against real analysis output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;

use crate::prompts::PromptManager;

#[derive(Debug, Subcommand)]
pub enum PromptSubcommand {
    /// Render the friction-log analysis prompt for a video
    VideoAnalysis {
        /// Storage URL of the session recording, e.g. gs://bucket/video.mp4
        #[arg(long, value_name = "URL")]
        video_url: String,

        /// Directory of template overrides (falls back to embedded templates)
        #[arg(long, value_name = "DIR")]
        templates: Option<PathBuf>,
    },

    /// Render the user story prompt from an analysis JSON file
    UserStory {
        /// Friction-log analysis JSON produced by the video analysis stage
        #[arg(long, value_name = "FILE")]
        analysis: PathBuf,

        /// Directory of template overrides (falls back to embedded templates)
        #[arg(long, value_name = "DIR")]
        templates: Option<PathBuf>,
    },

    /// Render the task backlog prompt from a user story JSON file
    TaskBacklog {
        /// User story JSON produced by the user story stage
        #[arg(long, value_name = "FILE")]
        story: PathBuf,

        /// Directory of template overrides (falls back to embedded templates)
        #[arg(long, value_name = "DIR")]
        templates: Option<PathBuf>,
    },
}

pub fn run(subcommand: &PromptSubcommand) -> Result<()> {
    let rendered = match subcommand {
        PromptSubcommand::VideoAnalysis {
            video_url,
            templates,
        } => manager(templates.as_deref())?.render(
            "video_analysis",
            &json!({ "video_url": video_url }),
        )?,
        PromptSubcommand::UserStory {
            analysis,
            templates,
        } => {
            let analysis = read_json(analysis)?;
            manager(templates.as_deref())?
                .render("user_story", &json!({ "video_analysis": analysis }))?
        }
        PromptSubcommand::TaskBacklog { story, templates } => {
            let story = read_json(story)?;
            manager(templates.as_deref())?.render("task_backlog", &json!({ "user_story": story }))?
        }
    };

    println!("{rendered}");
    Ok(())
}

fn manager(templates: Option<&std::path::Path>) -> Result<PromptManager> {
    match templates {
        Some(dir) => PromptManager::from_dir(dir),
        None => PromptManager::new(),
    }
}

/// Read a file and re-serialize it, validating that it is JSON.
fn read_json(path: &PathBuf) -> Result<String> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    serde_json::to_string_pretty(&value).context("failed to re-serialize JSON")
}
