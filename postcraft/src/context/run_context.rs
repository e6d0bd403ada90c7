//! Accumulator for one pipeline run.

use crate::core::{GeneratedImage, StageName, StageOutput, StageResult, Topic};
use crate::errors::OutputConflictError;
use crate::stages::is_ready_to_publish;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used in prompts (`dd/mm/yyyy`).
pub const PROMPT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Every stage output of one run, in the order the stages completed.
///
/// Append-only: each stage may be recorded once. The stage runner is the only
/// writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    run_id: Uuid,
    topic: Topic,
    run_date: NaiveDate,
    results: Vec<StageResult>,
}

impl RunContext {
    /// Creates an empty context for a run.
    #[must_use]
    pub fn new(topic: Topic, run_date: NaiveDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            topic,
            run_date,
            results: Vec::new(),
        }
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the topic.
    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Returns the run date.
    #[must_use]
    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    /// The run date formatted for prompts.
    #[must_use]
    pub fn run_date_label(&self) -> String {
        self.run_date.format(PROMPT_DATE_FORMAT).to_string()
    }

    /// Records a stage result.
    ///
    /// # Errors
    ///
    /// Returns `OutputConflictError` if the stage was already recorded.
    pub fn record(&mut self, result: StageResult) -> Result<(), OutputConflictError> {
        if self.contains(result.stage) {
            return Err(OutputConflictError::new(result.stage.key()));
        }
        self.results.push(result);
        Ok(())
    }

    /// Checks if a stage has been recorded.
    #[must_use]
    pub fn contains(&self, stage: StageName) -> bool {
        self.results.iter().any(|r| r.stage == stage)
    }

    /// Gets the result for a stage.
    #[must_use]
    pub fn get(&self, stage: StageName) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage == stage)
    }

    /// Gets the text output of a stage.
    #[must_use]
    pub fn text(&self, stage: StageName) -> Option<&str> {
        self.get(stage).and_then(|r| r.output.as_text())
    }

    /// All results in write order.
    #[must_use]
    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    /// Recorded stage names in write order.
    #[must_use]
    pub fn stages(&self) -> Vec<StageName> {
        self.results.iter().map(|r| r.stage).collect()
    }

    /// Returns the number of recorded stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns true once every stage has been recorded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        StageName::ALL.iter().all(|s| self.contains(*s))
    }

    /// The News Finder output.
    #[must_use]
    pub fn found_items(&self) -> Option<&str> {
        self.text(StageName::NewsFinder)
    }

    /// The Content Planner output.
    #[must_use]
    pub fn outline(&self) -> Option<&str> {
        self.text(StageName::ContentPlanner)
    }

    /// The Copywriter output.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        self.text(StageName::Copywriter)
    }

    /// The raw Editor output: the sentinel or a rewritten draft.
    #[must_use]
    pub fn review(&self) -> Option<&str> {
        self.text(StageName::Editor)
    }

    /// The post to publish: the draft when the Editor approved it, otherwise
    /// the Editor's rewrite.
    #[must_use]
    pub fn final_text(&self) -> Option<&str> {
        let review = self.review()?;
        if is_ready_to_publish(review) {
            self.draft()
        } else {
            Some(review)
        }
    }

    /// The Image Prompt Writer output.
    #[must_use]
    pub fn image_description(&self) -> Option<&str> {
        self.text(StageName::ImagePromptWriter)
    }

    /// The generated image, if the image stage produced one.
    #[must_use]
    pub fn image(&self) -> Option<&GeneratedImage> {
        self.get(StageName::ImageGenerator)
            .and_then(|r| r.output.as_image())
    }

    /// Returns a stage output, for callers that only need the payload.
    #[must_use]
    pub fn output(&self, stage: StageName) -> Option<&StageOutput> {
        self.get(stage).map(|r| &r.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::READY_TO_PUBLISH;
    use chrono::Utc;

    fn ctx() -> RunContext {
        RunContext::new(
            Topic::new("games").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
        )
    }

    fn text(stage: StageName, value: &str) -> StageResult {
        StageResult::completed(stage, StageOutput::Text(value.to_string()), Utc::now())
    }

    #[test]
    fn test_date_label() {
        assert_eq!(ctx().run_date_label(), "07/03/2026");
    }

    #[test]
    fn test_record_is_append_only() {
        let mut ctx = ctx();
        ctx.record(text(StageName::NewsFinder, "news")).unwrap();

        let err = ctx.record(text(StageName::NewsFinder, "other")).unwrap_err();
        assert_eq!(err.stage, "news_finder");
        assert_eq!(ctx.found_items(), Some("news"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_write_order_preserved() {
        let mut ctx = ctx();
        ctx.record(text(StageName::NewsFinder, "a")).unwrap();
        ctx.record(text(StageName::ContentPlanner, "b")).unwrap();

        assert_eq!(
            ctx.stages(),
            vec![StageName::NewsFinder, StageName::ContentPlanner]
        );
        assert!(!ctx.is_complete());
    }

    #[test]
    fn test_final_text_uses_draft_when_approved() {
        let mut ctx = ctx();
        ctx.record(text(StageName::Copywriter, "my draft")).unwrap();
        ctx.record(text(StageName::Editor, &format!("{READY_TO_PUBLISH}\n")))
            .unwrap();

        assert_eq!(ctx.final_text(), Some("my draft"));
    }

    #[test]
    fn test_final_text_uses_rewrite() {
        let mut ctx = ctx();
        ctx.record(text(StageName::Copywriter, "my draft")).unwrap();
        ctx.record(text(StageName::Editor, "better draft")).unwrap();

        assert_eq!(ctx.final_text(), Some("better draft"));
    }

    #[test]
    fn test_missing_image_is_none() {
        let mut ctx = ctx();
        ctx.record(StageResult::completed(
            StageName::ImageGenerator,
            StageOutput::Image(None),
            Utc::now(),
        ))
        .unwrap();

        assert!(ctx.image().is_none());
        assert!(ctx.contains(StageName::ImageGenerator));
    }
}
