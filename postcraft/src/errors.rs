//! Error types for postcraft.
//!
//! Failures are split the way they reach the user: configuration problems are
//! detected before a run starts, stage failures abort a run and name the stage
//! that caused them, and remote-capability errors describe what went wrong on
//! the wire.

use crate::core::StageName;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for postcraft operations.
#[derive(Debug, Error)]
pub enum PostcraftError {
    /// Configuration or credential problem, detected before any stage ran.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A stage failed and the run was aborted.
    #[error("{0}")]
    Stage(#[from] StageFailure),

    /// A stage output was written twice into the same run context.
    #[error("{0}")]
    OutputConflict(#[from] OutputConflictError),

    /// A run is already in flight for this session.
    #[error("A post is already being generated in this session")]
    RunInProgress,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and credential errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No API key was supplied.
    #[error("API key not found: set GOOGLE_API_KEY or pass --api-key")]
    MissingApiKey,

    /// The API key is malformed.
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// The remote service refused the API key during validation.
    #[error("API key rejected by the generation service (status {code}){}", fmt_description(.description))]
    Rejected {
        /// HTTP status code.
        code: u16,
        /// Response body, if any.
        description: Option<String>,
    },

    /// A configuration value could not be parsed.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// The topic is empty or whitespace-only.
    #[error("Topic cannot be empty")]
    EmptyTopic,
}

fn fmt_description(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Errors produced by the remote generation capability.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request never got a response.
    #[error("Request to the generation service failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Generation service returned status {code}{}", fmt_description(.description))]
    BadResponse {
        /// HTTP status code.
        code: u16,
        /// Response body, if any.
        description: Option<String>,
    },

    /// The response body could not be decoded.
    #[error("Could not decode the generation response: {0}")]
    Decode(String),

    /// The response contained no usable text.
    #[error("The generation service returned an empty response")]
    EmptyResponse,

    /// An inline payload was not valid base64.
    #[error("Inline payload is not valid base64: {0}")]
    InvalidPayload(String),

    /// A stage ran before the output it reads from was recorded.
    #[error("Missing upstream output from {}", .0.label())]
    MissingUpstream(StageName),

    /// The call exceeded the per-stage time budget.
    #[error("Timed out after {seconds}s")]
    Timeout {
        /// The timeout that elapsed.
        seconds: f64,
    },

    /// Credentials were missing or malformed; no request was sent.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The generated image could not be written to disk.
    #[error("Could not save image to {}: {source}", .path.display())]
    Persist {
        /// Destination path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A stage failed; the run was aborted at this stage.
#[derive(Debug, Error)]
#[error("Stage '{}' failed: {source}", .stage.label())]
pub struct StageFailure {
    /// The stage that failed.
    pub stage: StageName,
    /// What went wrong.
    #[source]
    pub source: GenerationError,
}

impl StageFailure {
    /// Creates a new stage failure.
    #[must_use]
    pub fn new(stage: StageName, source: GenerationError) -> Self {
        Self { stage, source }
    }

    /// Returns true if the failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.source, GenerationError::Timeout { .. })
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("stage".to_string(), serde_json::json!(self.stage.key()));
        map.insert("label".to_string(), serde_json::json!(self.stage.label()));
        map.insert("error".to_string(), serde_json::json!(self.source.to_string()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when a stage output is recorded twice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Output conflict for stage '{stage}': output already recorded")]
pub struct OutputConflictError {
    /// The stage key.
    pub stage: String,
}

impl OutputConflictError {
    /// Creates a new output conflict error.
    #[must_use]
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
        }
    }
}
