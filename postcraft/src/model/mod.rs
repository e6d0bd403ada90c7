//! The remote generation capability.
//!
//! This module provides:
//! - Wire types for text and image generation requests
//! - The `GenerationBackend` trait the stages call through
//! - An HTTP implementation backed by `reqwest`

mod client;
mod types;

pub use client::GeminiClient;
pub use types::{
    Blob, Candidate, Content, GenerateContentRequest, GenerationConfig, GenerationResponse,
    GoogleSearch, Modality, Part, Role, Tool, ToolCapability, UsageMetadata,
};

use crate::errors::GenerationError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for the service that generates text and images.
///
/// Implementations must not retry on their own: a failed call is reported
/// once and the pipeline decides what to do with it.
#[async_trait]
pub trait GenerationBackend: Send + Sync + Debug {
    /// Runs one `generateContent` call against `model`.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Lists available model names. Used to validate credentials.
    async fn list_models(&self) -> Result<Vec<String>, GenerationError>;
}
