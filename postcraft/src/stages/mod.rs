//! Stage trait and the stage catalogue.
//!
//! Stages are the units the runner executes in order. Each one reads the
//! topic and earlier outputs from the run context and returns its own output;
//! only the runner writes to the context.

mod agents;
mod image;
mod text;

pub use agents::{
    agent_for, AgentSpec, BRAND, CONTENT_PLANNER, COPYWRITER, EDITOR, IMAGE_PROMPT_WRITER,
    NEWS_FINDER, READY_TO_PUBLISH, TEXT_AGENTS,
};
pub use image::ImageGenerator;
pub use text::{
    compose_input, content_planner_input, copywriter_input, editor_input, image_prompt_input,
    news_finder_input, TextStage,
};

use crate::config::{ApiKey, PostcraftConfig};
use crate::context::RunContext;
use crate::core::{StageName, StageOutput};
use crate::errors::GenerationError;
use crate::model::GenerationBackend;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// What a stage can see while it runs.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Outputs recorded so far, read-only.
    pub run: &'a RunContext,
    /// The remote generation capability.
    pub backend: &'a dyn GenerationBackend,
    /// The session credential, if any.
    pub credential: Option<&'a ApiKey>,
}

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the stage name.
    fn name(&self) -> StageName;

    /// Executes the stage.
    async fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, GenerationError>;
}

/// Returns true if an Editor answer is the "no changes needed" sentinel.
#[must_use]
pub fn is_ready_to_publish(review: &str) -> bool {
    review.trim() == READY_TO_PUBLISH
}

/// The six stages in run order, configured from `config`.
#[must_use]
pub fn default_stages(config: &PostcraftConfig) -> Vec<Arc<dyn Stage>> {
    let mut stages: Vec<Arc<dyn Stage>> = TEXT_AGENTS
        .iter()
        .map(|agent| Arc::new(TextStage::new(*agent, config.text_model.clone())) as Arc<dyn Stage>)
        .collect();
    stages.push(Arc::new(
        ImageGenerator::new(config.image_model.clone())
            .with_output_path(config.image_output_path.clone()),
    ));
    stages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stages_in_order() {
        let stages = default_stages(&PostcraftConfig::default());
        let names: Vec<StageName> = stages.iter().map(|s| s.name()).collect();
        assert_eq!(names, StageName::ALL.to_vec());
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(is_ready_to_publish(READY_TO_PUBLISH));
        assert!(is_ready_to_publish(&format!("  {READY_TO_PUBLISH}\n")));
        assert!(!is_ready_to_publish("The draft is great, but ..."));
    }
}
