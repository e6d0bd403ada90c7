//! HTTP client for the generation service.

use super::{GenerateContentRequest, GenerationBackend, GenerationResponse};
use crate::config::{ApiKey, PostcraftConfig};
use crate::errors::{ConfigError, GenerationError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

/// `reqwest`-backed client for the Gemini REST API.
///
/// The API key is attached to every request as a default header.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidApiKey` if the key cannot be used as a header value, or
    /// `InvalidValue` if the HTTP client cannot be built.
    pub fn new(config: &PostcraftConfig, api_key: &ApiKey) -> Result<Self, ConfigError> {
        let key = HeaderValue::from_str(api_key.expose())
            .map_err(|e| ConfigError::InvalidApiKey(e.to_string()))?;
        let headers = HeaderMap::from_iter([(HeaderName::from_static(API_KEY_HEADER), key)]);

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "http_client".to_string(),
                value: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.base_url),
        })
    }

    /// Returns the base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}models/{model}:generateContent", self.base_url)
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

async fn check_response(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let description = response.text().await.ok().filter(|d| !d.is_empty());
        Err(GenerationError::BadResponse {
            code: status.as_u16(),
            description,
        })
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let url = self.generate_url(model);
        let start = Instant::now();

        let response = self.http.post(&url).json(request).send().await?;
        let response = check_response(response).await?;
        let body = response.bytes().await?;
        let parsed: GenerationResponse = serde_json::from_slice(&body)?;

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            candidates = parsed.candidates.len(),
            "generateContent completed"
        );
        Ok(parsed)
    }

    async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}models", self.base_url);
        let response = self.http.get(&url).send().await?;
        let response = check_response(response).await?;
        let body = response.bytes().await?;
        let parsed: ListModelsResponse = serde_json::from_slice(&body)?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}
