// converse-core/src/models/payload.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The conversation payload read from disk. Fields the tool does not inspect are
/// carried verbatim so the request matches the file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<ContentBlock>,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_config: Option<InferenceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_model_request_fields: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Text of the first content block, if that block is a text block.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().and_then(|b| b.text.as_deref())
    }
}

/// A message or system block. Only `text` is read; `image`, `toolUse`,
/// `toolResult`, `cachePoint` and friends are kept in `other`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            other: Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ToolConfig {
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// `toolChoice` and anything else the service accepts.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ToolConfig {
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.other.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Tool {
    #[serde(rename = "toolSpec", default, skip_serializing_if = "Option::is_none")]
    pub tool_spec: Option<ToolSpec>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A callable tool. The input schema is never inspected locally.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Generation parameters. Unset values are left to the service.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

impl InferenceConfig {
    pub fn is_empty(&self) -> bool {
        self.max_tokens.is_none()
            && self.temperature.is_none()
            && self.top_p.is_none()
            && self.stop_sequences.is_none()
    }

    /// Settings sent when the payload leaves `inferenceConfig` out or empty.
    pub fn fallback() -> Self {
        Self {
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            temperature: Some(DEFAULT_TEMPERATURE),
            ..Default::default()
        }
    }
}

impl Payload {
    pub fn tools(&self) -> &[Tool] {
        self.tool_config
            .as_ref()
            .map(|tc| tc.tools.as_slice())
            .unwrap_or(&[])
    }

    /// The inference settings that will actually be sent.
    pub fn effective_inference_config(&self) -> InferenceConfig {
        match &self.inference_config {
            Some(config) if !config.is_empty() => config.clone(),
            _ => InferenceConfig::fallback(),
        }
    }
}
