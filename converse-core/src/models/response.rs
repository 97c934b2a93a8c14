// converse-core/src/models/response.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConverseResponse {
    #[serde(default)]
    pub output: Option<ConverseOutput>,
    #[serde(default)]
    pub stop_reason: Option<StopReason>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    #[serde(default)]
    pub metrics: Option<ConverseMetrics>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConverseOutput {
    #[serde(default)]
    pub message: Option<OutputMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OutputMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Vec<ResponseContentBlock>,
}

/// One block of the generated turn. At most one of the known fields is set;
/// block types this tool does not print land in `other`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<ToolUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<ReasoningContent>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A request from the model to invoke a named tool.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    #[serde(default)]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub input: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningContent {
    #[serde(default)]
    pub reasoning_text: Option<ReasoningText>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ReasoningText {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_write_input_tokens: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConverseMetrics {
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

/// Why generation stopped. Unrecognised tags are kept as-is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    GuardrailIntervened,
    ContentFiltered,
    Other(String),
}

impl From<String> for StopReason {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "guardrail_intervened" => StopReason::GuardrailIntervened,
            "content_filtered" => StopReason::ContentFiltered,
            _ => StopReason::Other(tag),
        }
    }
}

impl From<StopReason> for String {
    fn from(reason: StopReason) -> Self {
        reason.as_str().to_string()
    }
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::ToolUse => "tool_use",
            StopReason::MaxTokens => "max_tokens",
            StopReason::StopSequence => "stop_sequence",
            StopReason::GuardrailIntervened => "guardrail_intervened",
            StopReason::ContentFiltered => "content_filtered",
            StopReason::Other(tag) => tag,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConverseResponse {
    pub fn content(&self) -> &[ResponseContentBlock] {
        self.output
            .as_ref()
            .and_then(|o| o.message.as_ref())
            .map(|m| m.content.as_slice())
            .unwrap_or(&[])
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.content().iter().filter_map(|b| b.tool_use.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_and_tool_use() {
        let body = r#"{
            "output": {"message": {"role": "assistant", "content": [
                {"text": "Checking the weather."},
                {"toolUse": {"toolUseId": "tooluse_1", "name": "get_weather", "input": {"city": "Paris"}}},
                {"image": {"format": "png"}}
            ]}},
            "stopReason": "tool_use",
            "usage": {"inputTokens": 10, "outputTokens": 5, "totalTokens": 15},
            "metrics": {"latencyMs": 812}
        }"#;
        let response: ConverseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.content().len(), 3);
        assert_eq!(response.content()[0].text.as_deref(), Some("Checking the weather."));
        let tool = response.tool_uses().next().unwrap();
        assert_eq!(tool.name.as_deref(), Some("get_weather"));
        assert_eq!(tool.input["city"], "Paris");
        assert!(response.content()[2].other.contains_key("image"));
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.usage.unwrap().total_tokens, 15);
        assert_eq!(response.metrics.unwrap().latency_ms, Some(812));
    }

    #[test]
    fn test_unknown_stop_reason_is_kept() {
        let response: ConverseResponse =
            serde_json::from_str(r#"{"stopReason": "model_context_window_exceeded"}"#).unwrap();
        let reason = response.stop_reason.unwrap();
        assert_eq!(reason, StopReason::Other("model_context_window_exceeded".to_string()));
        assert_eq!(reason.to_string(), "model_context_window_exceeded");
    }

    #[test]
    fn test_missing_sections_default() {
        let response: ConverseResponse = serde_json::from_str("{}").unwrap();
        assert!(response.content().is_empty());
        assert!(response.stop_reason.is_none());
        assert!(response.usage.is_none());
    }
}
