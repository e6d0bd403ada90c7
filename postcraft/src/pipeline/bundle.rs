//! Presentation bundle for a finished run.

use crate::context::RunContext;
use crate::core::GeneratedImage;
use crate::text::trailing_hashtags;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Everything a front end shows once a post is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBundle {
    /// Run identifier.
    pub run_id: Uuid,
    /// The topic the post is about.
    pub topic: String,
    /// News Finder output.
    pub found_items: String,
    /// Content Planner output.
    pub outline: String,
    /// Copywriter output.
    pub draft: String,
    /// Raw Editor output: the approval sentence or a rewrite.
    pub review: String,
    /// The publishable post.
    pub final_text: String,
    /// Image Prompt Writer output.
    pub image_description: String,
    /// The generated image, bytes included; `None` when none was produced.
    pub image: Option<GeneratedImage>,
    /// Where the image was saved, if it was.
    pub image_path: Option<PathBuf>,
    /// Whether an image was produced.
    pub has_image: bool,
    /// Hashtags closing the final post.
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl PostBundle {
    /// Builds a bundle from a run, or `None` if the run is incomplete.
    #[must_use]
    pub fn from_run(run: &RunContext) -> Option<Self> {
        if !run.is_complete() {
            return None;
        }
        let final_text = run.final_text()?.to_string();
        let image = run.image().cloned();

        Some(Self {
            run_id: run.run_id(),
            topic: run.topic().to_string(),
            found_items: run.found_items()?.to_string(),
            outline: run.outline()?.to_string(),
            draft: run.draft()?.to_string(),
            review: run.review()?.to_string(),
            hashtags: trailing_hashtags(&final_text),
            final_text,
            image_description: run.image_description()?.to_string(),
            image_path: image.as_ref().and_then(|i| i.path.clone()),
            has_image: image.is_some(),
            image,
        })
    }
}
