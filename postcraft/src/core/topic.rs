//! The user-supplied topic.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty topic string, immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Creates a topic, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyTopic` if nothing is left after trimming.
    pub fn new(topic: impl AsRef<str>) -> Result<Self, ConfigError> {
        let trimmed = topic.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the topic text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
