//! Stage names and kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Percent reported once every stage has completed.
pub const COMPLETE_PERCENT: u8 = 100;

/// What a stage produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Produces free-form text.
    Text,
    /// Produces an image (or nothing).
    Image,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// The stages of the post pipeline, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Finds recent, relevant developments on the topic.
    NewsFinder,
    /// Picks one development and outlines the post.
    ContentPlanner,
    /// Drafts the post.
    Copywriter,
    /// Reviews the draft; approves it or rewrites it.
    Editor,
    /// Describes an image that fits the final post.
    ImagePromptWriter,
    /// Renders the image.
    ImageGenerator,
}

impl StageName {
    /// All stages in run order.
    pub const ALL: [Self; 6] = [
        Self::NewsFinder,
        Self::ContentPlanner,
        Self::Copywriter,
        Self::Editor,
        Self::ImagePromptWriter,
        Self::ImageGenerator,
    ];

    /// Stable machine key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NewsFinder => "news_finder",
            Self::ContentPlanner => "content_planner",
            Self::Copywriter => "copywriter",
            Self::Editor => "editor",
            Self::ImagePromptWriter => "image_prompt_writer",
            Self::ImageGenerator => "image_generator",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NewsFinder => "News Finder",
            Self::ContentPlanner => "Content Planner",
            Self::Copywriter => "Copywriter",
            Self::Editor => "Editor",
            Self::ImagePromptWriter => "Image Prompt Writer",
            Self::ImageGenerator => "Image Generator",
        }
    }

    /// Progress percent reported just before the stage starts.
    #[must_use]
    pub const fn progress_percent(self) -> u8 {
        match self {
            Self::NewsFinder => 5,
            Self::ContentPlanner => 25,
            Self::Copywriter => 45,
            Self::Editor => 65,
            Self::ImagePromptWriter => 85,
            Self::ImageGenerator => 95,
        }
    }

    /// Status line shown while the stage runs.
    #[must_use]
    pub const fn activity(self) -> &'static str {
        match self {
            Self::NewsFinder => "Searching for relevant news",
            Self::ContentPlanner => "Picking the best theme and planning the post",
            Self::Copywriter => "Writing the post",
            Self::Editor => "Reviewing and polishing the post",
            Self::ImagePromptWriter => "Describing an image for the post",
            Self::ImageGenerator => "Generating the image",
        }
    }

    /// Position in the run (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// What the stage produces.
    #[must_use]
    pub const fn kind(self) -> StageKind {
        match self {
            Self::ImageGenerator => StageKind::Image,
            _ => StageKind::Text,
        }
    }

    /// Parses a stage key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.key() == key)
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
