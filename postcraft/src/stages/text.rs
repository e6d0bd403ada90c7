//! Text-generation stages.

use super::agents::AgentSpec;
use super::{Stage, StageContext};
use crate::context::{Conversation, RunContext};
use crate::core::{StageName, StageOutput, Topic};
use crate::errors::GenerationError;
use crate::model::GenerationBackend;
use async_trait::async_trait;

/// A stage that forwards its agent instruction plus upstream context to the
/// text model.
#[derive(Debug, Clone)]
pub struct TextStage {
    agent: AgentSpec,
    model: String,
}

impl TextStage {
    /// Creates a text stage for an agent.
    #[must_use]
    pub fn new(agent: AgentSpec, model: impl Into<String>) -> Self {
        Self {
            agent,
            model: model.into(),
        }
    }

    /// Returns the agent definition.
    #[must_use]
    pub fn agent(&self) -> &AgentSpec {
        &self.agent
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs the agent on a prepared input in a fresh conversation.
    ///
    /// # Errors
    ///
    /// Returns the backend error or `EmptyResponse`.
    pub async fn run(
        &self,
        backend: &dyn GenerationBackend,
        input: &str,
    ) -> Result<String, GenerationError> {
        Conversation::open(self.agent.name, self.agent.instruction, self.agent.capability)
            .send(backend, &self.model, input)
            .await
    }
}

#[async_trait]
impl Stage for TextStage {
    fn name(&self) -> StageName {
        self.agent.stage
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, GenerationError> {
        let input = compose_input(self.agent.stage, ctx.run)?;
        let text = self.run(ctx.backend, &input).await?;
        Ok(StageOutput::Text(text))
    }
}

/// News Finder input.
#[must_use]
pub fn news_finder_input(topic: &Topic, date_label: &str) -> String {
    format!("Topic: {topic}\nToday's date: {date_label}")
}

/// Content Planner input.
#[must_use]
pub fn content_planner_input(topic: &Topic, found_items: &str) -> String {
    format!("Topic: {topic}\nFound items: {found_items}")
}

/// Copywriter input.
#[must_use]
pub fn copywriter_input(topic: &Topic, outline: &str) -> String {
    format!("Topic: {topic}\nPost plan: {outline}")
}

/// Editor input.
#[must_use]
pub fn editor_input(topic: &Topic, draft: &str) -> String {
    format!("Topic: {topic}\nDraft: {draft}")
}

/// Image Prompt Writer input.
#[must_use]
pub fn image_prompt_input(final_text: &str) -> String {
    format!("Reviewed post: {final_text}")
}

/// Builds a stage's input from the topic and earlier outputs.
///
/// # Errors
///
/// Returns `MissingUpstream` naming the stage whose output is absent.
pub fn compose_input(stage: StageName, run: &RunContext) -> Result<String, GenerationError> {
    let upstream = |from: StageName| {
        run.text(from)
            .ok_or(GenerationError::MissingUpstream(from))
    };

    let topic = run.topic();
    let input = match stage {
        StageName::NewsFinder => news_finder_input(topic, &run.run_date_label()),
        StageName::ContentPlanner => {
            content_planner_input(topic, upstream(StageName::NewsFinder)?)
        }
        StageName::Copywriter => copywriter_input(topic, upstream(StageName::ContentPlanner)?),
        StageName::Editor => editor_input(topic, upstream(StageName::Copywriter)?),
        StageName::ImagePromptWriter => {
            upstream(StageName::Editor)?;
            let final_text = run
                .final_text()
                .ok_or(GenerationError::MissingUpstream(StageName::Copywriter))?;
            image_prompt_input(final_text)
        }
        StageName::ImageGenerator => upstream(StageName::ImagePromptWriter)?.to_string(),
    };
    Ok(input)
}
