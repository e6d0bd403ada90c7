//! Deterministic test doubles.
//!
//! [`StubBackend`] stands in for the remote generation service. It recognises
//! which stage a request comes from by its system instruction (or by the
//! image modality), answers from a fixed script, and records every call.

use crate::core::StageName;
use crate::errors::GenerationError;
use crate::model::{
    Blob, GenerateContentRequest, GenerationBackend, GenerationResponse, Modality, Part,
};
use crate::stages::TEXT_AGENTS;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// One `generate` call seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The model requested.
    pub model: String,
    /// The request sent.
    pub request: GenerateContentRequest,
    /// The stage the request was attributed to.
    pub stage: Option<StageName>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Fail { code: u16, description: String },
}

/// A scripted, in-memory generation backend.
#[derive(Debug, Default)]
pub struct StubBackend {
    default_text: Option<String>,
    responses: HashMap<StageName, Scripted>,
    delays: HashMap<StageName, Duration>,
    image: Option<Blob>,
    models: Vec<String>,
    rejection: Option<u16>,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<RecordedCall>>,
    model_listings: Mutex<usize>,
}

impl StubBackend {
    /// Creates a stub that answers every text stage with `"<Stage> output"`
    /// and returns no image.
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: vec![
                "models/gemini-2.0-flash".to_string(),
                "models/gemini-2.0-flash-preview-image-generation".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Answers every unscripted request with `text`.
    #[must_use]
    pub fn with_default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = Some(text.into());
        self
    }

    /// Answers requests from `stage` with `text`.
    #[must_use]
    pub fn with_response(mut self, stage: StageName, text: impl Into<String>) -> Self {
        self.responses.insert(stage, Scripted::Text(text.into()));
        self
    }

    /// Fails requests from `stage` with an error status.
    #[must_use]
    pub fn fail_for(mut self, stage: StageName, code: u16, description: impl Into<String>) -> Self {
        self.responses.insert(
            stage,
            Scripted::Fail {
                code,
                description: description.into(),
            },
        );
        self
    }

    /// Fails the `n`th `generate` call (1-based) with a server error.
    #[must_use]
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Delays responses to `stage`.
    #[must_use]
    pub fn with_delay(mut self, stage: StageName, delay: Duration) -> Self {
        self.delays.insert(stage, delay);
        self
    }

    /// Returns an inline image for image requests.
    #[must_use]
    pub fn with_image(mut self, bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        self.image = Some(Blob::from_bytes(mime_type, &bytes));
        self
    }

    /// Sets the models returned by `list_models`.
    #[must_use]
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Makes `list_models` fail as if the key were refused.
    #[must_use]
    pub fn rejecting_key(mut self, code: u16) -> Self {
        self.rejection = Some(code);
        self
    }

    /// Returns all recorded `generate` calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of `generate` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the stages called, in order.
    #[must_use]
    pub fn called_stages(&self) -> Vec<StageName> {
        self.calls.lock().iter().filter_map(|c| c.stage).collect()
    }

    /// Returns how often `list_models` was called.
    #[must_use]
    pub fn model_listings(&self) -> usize {
        *self.model_listings.lock()
    }

    /// Forgets recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
        *self.model_listings.lock() = 0;
    }

    fn text_for(&self, stage: Option<StageName>) -> String {
        if let Some(text) = &self.default_text {
            return text.clone();
        }
        stage.map_or_else(
            || "stub output".to_string(),
            |s| format!("{} output", s.label()),
        )
    }
}

/// Attributes a request to a stage.
#[must_use]
pub fn stage_of(request: &GenerateContentRequest) -> Option<StageName> {
    let wants_image = request
        .generation_config
        .as_ref()
        .is_some_and(|c| c.response_modalities.contains(&Modality::Image));
    if wants_image {
        return Some(StageName::ImageGenerator);
    }
    let instruction = request.instruction_text()?;
    TEXT_AGENTS
        .iter()
        .find(|agent| agent.instruction == instruction)
        .map(|agent| agent.stage)
}

#[async_trait]
impl GenerationBackend for StubBackend {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let stage = stage_of(request);
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(RecordedCall {
                model: model.to_string(),
                request: request.clone(),
                stage,
            });
            calls.len()
        };

        if self.fail_on_call == Some(call_number) {
            return Err(GenerationError::BadResponse {
                code: 500,
                description: Some("Internal error encountered.".to_string()),
            });
        }

        if let Some(delay) = stage.and_then(|s| self.delays.get(&s)) {
            tokio::time::sleep(*delay).await;
        }

        match stage.and_then(|s| self.responses.get(&s)) {
            Some(Scripted::Fail { code, description }) => Err(GenerationError::BadResponse {
                code: *code,
                description: Some(description.clone()),
            }),
            Some(Scripted::Text(text)) => Ok(GenerationResponse::from_text(text.clone())),
            None => match (&self.image, stage) {
                (Some(blob), Some(StageName::ImageGenerator)) => {
                    Ok(GenerationResponse::from_parts(vec![
                        Part::text("Here is your image."),
                        Part::InlineData {
                            inline_data: blob.clone(),
                        },
                    ]))
                }
                _ => Ok(GenerationResponse::from_text(self.text_for(stage))),
            },
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        *self.model_listings.lock() += 1;
        match self.rejection {
            Some(code) => Err(GenerationError::BadResponse {
                code,
                description: Some("API key not valid. Please pass a valid API key.".to_string()),
            }),
            None => Ok(self.models.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Conversation;
    use crate::stages::{EDITOR, NEWS_FINDER};

    #[tokio::test]
    async fn test_scripted_response_by_stage() {
        let backend = StubBackend::new().with_response(StageName::Editor, "looks good");
        let request = Conversation::open(EDITOR.name, EDITOR.instruction, EDITOR.capability)
            .request_for("Draft: x");

        let response = backend.generate("m", &request).await.unwrap();

        assert_eq!(response.text(), "looks good\n");
        assert_eq!(backend.called_stages(), vec![StageName::Editor]);
    }

    #[tokio::test]
    async fn test_default_text_names_stage() {
        let backend = StubBackend::new();
        let request =
            Conversation::open(NEWS_FINDER.name, NEWS_FINDER.instruction, NEWS_FINDER.capability)
                .request_for("Topic: x");

        let response = backend.generate("m", &request).await.unwrap();
        assert_eq!(response.text(), "News Finder output\n");
    }

    #[tokio::test]
    async fn test_failure_and_rejection() {
        let backend = StubBackend::new()
            .fail_for(StageName::Editor, 500, "boom")
            .rejecting_key(400);
        let request = Conversation::open(EDITOR.name, EDITOR.instruction, EDITOR.capability)
            .request_for("Draft: x");

        assert!(matches!(
            backend.generate("m", &request).await,
            Err(GenerationError::BadResponse { code: 500, .. })
        ));
        assert!(backend.list_models().await.is_err());
        assert_eq!(backend.model_listings(), 1);
    }
}
