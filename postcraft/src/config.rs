//! Configuration for the post pipeline.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables checked for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Settings shared by every stage of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostcraftConfig {
    /// Base URL of the generation service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used by the text stages.
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model used by the image stage.
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Per-stage timeout in seconds.
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_seconds: f64,
    /// Where the generated image is written; `None` keeps it in memory only.
    #[serde(default = "default_image_output_path")]
    pub image_output_path: Option<PathBuf>,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/".to_string()
}

fn default_text_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.0-flash-preview-image-generation".to_string()
}

fn default_stage_timeout() -> f64 {
    120.0
}

#[allow(clippy::unnecessary_wraps)]
fn default_image_output_path() -> Option<PathBuf> {
    Some(PathBuf::from("generated_image.png"))
}

fn default_user_agent() -> String {
    format!("postcraft/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for PostcraftConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            stage_timeout_seconds: default_stage_timeout(),
            image_output_path: default_image_output_path(),
            user_agent: default_user_agent(),
        }
    }
}

impl PostcraftConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from defaults overlaid with `POSTCRAFT_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("POSTCRAFT_BASE_URL") {
            config.base_url = url;
        }
        if let Some(model) = lookup("POSTCRAFT_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = lookup("POSTCRAFT_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(raw) = lookup("POSTCRAFT_STAGE_TIMEOUT") {
            let seconds = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|s| s.is_finite() && *s > 0.0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "POSTCRAFT_STAGE_TIMEOUT".to_string(),
                    value: raw.clone(),
                })?;
            config.stage_timeout_seconds = seconds;
        }
        if let Some(path) = lookup("POSTCRAFT_IMAGE_PATH") {
            config.image_output_path = if path.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }

        Ok(config)
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the per-stage timeout.
    #[must_use]
    pub fn with_stage_timeout(mut self, seconds: f64) -> Self {
        self.stage_timeout_seconds = seconds;
        self
    }

    /// Sets or clears the image output path.
    #[must_use]
    pub fn with_image_output_path(mut self, path: Option<PathBuf>) -> Self {
        self.image_output_path = path;
        self
    }

    /// Gets the stage timeout as a Duration.
    ///
    /// Values that are not a positive finite number fall back to the default.
    #[must_use]
    pub fn stage_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.stage_timeout_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_stage_timeout()))
    }
}

/// The credential for the generation service.
///
/// Never printed: `Debug` and `Display` redact the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validates and wraps a key.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` for a blank key and `InvalidApiKey` when the key
    /// cannot be sent as an HTTP header.
    pub fn new(key: impl AsRef<str>) -> Result<Self, ConfigError> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if key.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidApiKey(
                "key must not contain whitespace".to_string(),
            ));
        }
        if reqwest::header::HeaderValue::from_str(key).is_err() {
            return Err(ConfigError::InvalidApiKey(
                "key contains characters that cannot be sent in a header".to_string(),
            ));
        }
        Ok(Self(key.to_string()))
    }

    /// Reads the key from `GOOGLE_API_KEY` or `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` if neither is set, or the validation error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` if no variable is set, or the validation error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()))
            .map_or(Err(ConfigError::MissingApiKey), Self::new)
    }

    /// Uses `explicit` when it is non-blank, otherwise falls back to
    /// [`from_lookup`](Self::from_lookup).
    ///
    /// A blank `explicit` value (e.g. an empty `GOOGLE_API_KEY` picked up by a
    /// CLI flag) does not shadow `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` if no usable key is found, or the validation
    /// error.
    pub fn resolve<F>(explicit: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match explicit.filter(|k| !k.trim().is_empty()) {
            Some(key) => Self::new(key),
            None => Self::from_lookup(lookup),
        }
    }

    /// Returns the raw key for building request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
