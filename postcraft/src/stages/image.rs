//! The image-generation stage.

use super::{Stage, StageContext};
use crate::config::ApiKey;
use crate::context::RunContext;
use crate::core::{GeneratedImage, StageName, StageOutput};
use crate::errors::{ConfigError, GenerationError};
use crate::model::{GenerateContentRequest, GenerationBackend, Modality};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

/// Renders the image description into an image.
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    model: String,
    output_path: Option<PathBuf>,
}

impl ImageGenerator {
    /// Creates an image stage that keeps the image in memory.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            output_path: None,
        }
    }

    /// Persists each generated image to `path`, overwriting the previous one.
    #[must_use]
    pub fn with_output_path(mut self, path: Option<PathBuf>) -> Self {
        self.output_path = path;
        self
    }

    /// Returns the output path, if any.
    #[must_use]
    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }

    /// Requests an image for `description`.
    ///
    /// Returns `Ok(None)` when the response carries no inline payload.
    ///
    /// The backend attaches its own credential to the request; `credential`
    /// only gates the call so a missing key is reported as configuration
    /// rather than as a remote failure.
    ///
    /// # Errors
    ///
    /// Returns `Config(MissingApiKey)` without calling the backend when no
    /// credential is available, the backend error, `InvalidPayload` for a bad
    /// base64 payload, or `Persist` if saving fails.
    pub async fn run(
        &self,
        backend: &dyn GenerationBackend,
        description: &str,
        credential: Option<&ApiKey>,
    ) -> Result<Option<GeneratedImage>, GenerationError> {
        if credential.is_none() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let request = GenerateContentRequest::user_prompt(description)
            .with_modalities(vec![Modality::Text, Modality::Image]);
        let response = backend.generate(&self.model, &request).await?;

        let Some(blob) = response.first_inline_data() else {
            warn!(model = %self.model, "image response contained no inline payload");
            return Ok(None);
        };

        let mut image = GeneratedImage::new(blob.decode()?, blob.mime_type.clone());
        if let Some(path) = &self.output_path {
            image
                .save(path)
                .map_err(|source| GenerationError::Persist {
                    path: path.clone(),
                    source,
                })?;
            info!(path = %path.display(), bytes = image.byte_count(), "image saved");
        }
        Ok(Some(image))
    }
}

#[async_trait]
impl Stage for ImageGenerator {
    fn name(&self) -> StageName {
        StageName::ImageGenerator
    }

    async fn execute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, GenerationError> {
        let description = image_description(ctx.run)?;
        let image = self.run(ctx.backend, description, ctx.credential).await?;
        Ok(StageOutput::Image(image))
    }
}

fn image_description(run: &RunContext) -> Result<&str, GenerationError> {
    run.image_description()
        .ok_or(GenerationError::MissingUpstream(StageName::ImagePromptWriter))
}
