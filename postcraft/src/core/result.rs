//! Per-stage results.

use super::{GeneratedImage, StageName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a stage produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StageOutput {
    /// Free-form text from a text stage.
    Text(String),
    /// Output of the image stage; `None` when the service returned no image.
    Image(Option<GeneratedImage>),
}

impl StageOutput {
    /// Returns the text, if this is a text output.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    /// Returns the image, if one was produced.
    #[must_use]
    pub fn as_image(&self) -> Option<&GeneratedImage> {
        match self {
            Self::Image(image) => image.as_ref(),
            Self::Text(_) => None,
        }
    }

    /// Length of the output in bytes, for logging.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Image(image) => image.as_ref().map_or(0, GeneratedImage::byte_count),
        }
    }

    /// Returns true if the output carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A completed stage and when it ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    /// Which stage produced this.
    pub stage: StageName,
    /// The output.
    pub output: StageOutput,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
}

impl StageResult {
    /// Creates a result that ended now.
    #[must_use]
    pub fn completed(stage: StageName, output: StageOutput, started_at: DateTime<Utc>) -> Self {
        Self {
            stage,
            output,
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output_accessors() {
        let output = StageOutput::Text("hello".to_string());
        assert_eq!(output.as_text(), Some("hello"));
        assert!(output.as_image().is_none());
        assert_eq!(output.len(), 5);
    }

    #[test]
    fn test_empty_image_output() {
        let output = StageOutput::Image(None);
        assert!(output.is_empty());
        assert!(output.as_text().is_none());
    }

    #[test]
    fn test_stage_result_duration() {
        let started = Utc::now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let result = StageResult::completed(
            StageName::Editor,
            StageOutput::Text("ok".to_string()),
            started,
        );

        assert!(result.duration_ms() >= 10.0);
        assert_eq!(result.stage, StageName::Editor);
    }
}
