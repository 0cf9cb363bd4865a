//! Prompt template management.
//!
//! The web application sends these prompts to Vertex AI to turn a UX session
//! recording into a friction log, user stories, and a task backlog. The
//! templates are embedded at build time from `prompts/`; a directory override
//! lets operators customize them without rebuilding.

use std::path::Path;

use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// The three analysis stages, in pipeline order.
pub const TEMPLATE_NAMES: [&str; 3] = ["video_analysis", "user_story", "task_backlog"];

/// Manages Handlebars prompt templates.
pub struct PromptManager {
    handlebars: Handlebars<'static>,
}

impl PromptManager {
    /// Create a new prompt manager with embedded templates.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        // Prompts are plain text; JSON fed into them must not be HTML-escaped
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_template_string("video_analysis", VIDEO_ANALYSIS_TEMPLATE)?;
        handlebars.register_template_string("user_story", USER_STORY_TEMPLATE)?;
        handlebars.register_template_string("task_backlog", TASK_BACKLOG_TEMPLATE)?;

        Ok(Self { handlebars })
    }

    /// Create a prompt manager loading templates from a directory.
    ///
    /// Missing files fall back to the embedded template.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut manager = Self::new()?;

        for name in TEMPLATE_NAMES {
            let path = dir.join(format!("{name}.hbs"));
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                manager.handlebars.register_template_string(name, &content)?;
            }
        }

        Ok(manager)
    }

    /// Render a template with the given data.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        let result = self.handlebars.render(template, data)?;
        Ok(result)
    }
}

/// Friction-log analysis prompt.
const VIDEO_ANALYSIS_TEMPLATE: &str = include_str!("../../../prompts/video_analysis.hbs");

/// User story generation prompt.
const USER_STORY_TEMPLATE: &str = include_str!("../../../prompts/user_story.hbs");

/// Task backlog generation prompt.
const TASK_BACKLOG_TEMPLATE: &str = include_str!("../../../prompts/task_backlog.hbs");
