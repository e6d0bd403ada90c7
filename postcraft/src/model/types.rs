//! Wire types for the `generateContent` REST call.
//!
//! Only the subset the pipeline needs is modelled: text and inline-data
//! parts, the web-search tool, and response modalities. Unknown parts in a
//! response are kept as raw JSON rather than failing the decode.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user.
    User,
    /// Message from the model.
    Model,
}

/// Binary data with a MIME type, base64-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The MIME type of the data.
    pub mime_type: String,
    /// Base64-encoded data.
    pub data: String,
}

impl Blob {
    /// Creates a blob from raw bytes.
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decodes the payload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, GenerationError> {
        STANDARD
            .decode(self.data.trim())
            .map_err(|e| GenerationError::InvalidPayload(e.to_string()))
    }
}

/// One fragment of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Inline binary content.
    InlineData {
        /// The blob.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Any part type the pipeline does not use.
    Other(serde_json::Value),
}

impl Part {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A message: parts plus an optional role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Parts of the content.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Role of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Content {
    /// Creates a single-part text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
            role: None,
        }
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// Tools the remote model may use while generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    /// Plain generation.
    #[default]
    None,
    /// The model may search the web.
    WebSearch,
}

impl ToolCapability {
    /// Request tools for this capability.
    #[must_use]
    pub fn tools(self) -> Vec<Tool> {
        match self {
            Self::None => Vec::new(),
            Self::WebSearch => vec![Tool::google_search()],
        }
    }
}

/// A tool declaration on the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Enables grounding with web search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    /// The web-search tool.
    #[must_use]
    pub fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
        }
    }
}

/// Empty marker object for the web-search tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSearch {}

/// Output modalities a request may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    /// Text output.
    Text,
    /// Image output.
    Image,
}

/// Generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested output modalities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<Modality>,
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The agent's role instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Conversation turns.
    pub contents: Vec<Content>,
    /// Tools available to the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Generation settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Creates a request with a single user turn.
    #[must_use]
    pub fn user_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text(prompt).with_role(Role::User)],
            ..Self::default()
        }
    }

    /// Sets the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::text(instruction));
        self
    }

    /// Attaches the tools for a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: ToolCapability) -> Self {
        self.tools = capability.tools();
        self
    }

    /// Requests specific output modalities.
    #[must_use]
    pub fn with_modalities(mut self, modalities: Vec<Modality>) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_modalities: modalities,
        });
        self
    }

    /// Text of the last user turn.
    #[must_use]
    pub fn prompt_text(&self) -> String {
        self.contents
            .last()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| match p {
                        Part::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    /// Text of the system instruction.
    #[must_use]
    pub fn instruction_text(&self) -> Option<&str> {
        self.system_instruction
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
    }

    /// Whether web search was requested.
    #[must_use]
    pub fn has_web_search(&self) -> bool {
        self.tools.iter().any(|t| t.google_search.is_some())
    }
}

/// One candidate answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Generated tokens.
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Total tokens.
    #[serde(default)]
    pub total_token_count: u32,
}

/// Response of a `generateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Candidate answers.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token usage, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerationResponse {
    /// Builds a single-candidate response from parts.
    #[must_use]
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts,
                    role: Some(Role::Model),
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            usage_metadata: None,
        }
    }

    /// Builds a single-candidate text response.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_parts(vec![Part::text(text)])
    }

    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map_or(&[], |c| c.parts.as_slice())
    }

    /// Concatenates every text part of the first candidate, each followed by
    /// a newline.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in self.first_parts() {
            if let Part::Text { text } = part {
                out.push_str(text);
                out.push('\n');
            }
        }
        out
    }

    /// The first inline payload of the first candidate.
    #[must_use]
    pub fn first_inline_data(&self) -> Option<&Blob> {
        self.first_parts().iter().find_map(|p| match p {
            Part::InlineData { inline_data } => Some(inline_data),
            _ => None,
        })
    }
}
