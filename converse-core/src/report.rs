// converse-core/src/report.rs

//! Plain-text rendering of a payload summary and a Converse response.

use crate::models::payload::Payload;
use crate::models::response::ConverseResponse;
use crate::utils::{format_with_grouping, truncate_string};
use std::io::{self, Write};
use std::path::Path;

const MESSAGE_PREVIEW_CHARS: usize = 100;
const SYSTEM_PREVIEW_CHARS: usize = 150;
const TOOL_DESCRIPTION_CHARS: usize = 80;

/// Writes counts, settings and short previews of the loaded payload.
pub fn write_payload_summary<W: Write>(w: &mut W, path: &Path, payload: &Payload) -> io::Result<()> {
    let inference = payload.effective_inference_config();
    let or_default = |v: Option<String>| v.unwrap_or_else(|| "default".to_string());

    writeln!(w, "Loaded payload from: {}", path.display())?;
    writeln!(w, "Payload Summary:")?;
    writeln!(w, "   - System prompts: {}", payload.system.len())?;
    writeln!(w, "   - Messages: {}", payload.messages.len())?;
    writeln!(w, "   - Tools available: {}", payload.tools().len())?;
    writeln!(w, "   - Max tokens: {}", or_default(inference.max_tokens.map(|v| v.to_string())))?;
    writeln!(w, "   - Temperature: {}", or_default(inference.temperature.map(|v| v.to_string())))?;

    writeln!(w, "\nConversation History:")?;
    for (i, message) in payload.messages.iter().enumerate() {
        let text = message.first_text().unwrap_or("");
        writeln!(
            w,
            "   {}. {}: {}",
            i + 1,
            message.role.as_str().to_uppercase(),
            truncate_string(text, MESSAGE_PREVIEW_CHARS)
        )?;
    }

    if let Some(first) = payload.system.first() {
        let text = first.text.as_deref().unwrap_or("");
        writeln!(w, "\nSystem Prompt Preview:")?;
        writeln!(w, "   {}", truncate_string(text, SYSTEM_PREVIEW_CHARS))?;
    }

    let tools = payload.tools();
    if !tools.is_empty() {
        writeln!(w, "\nAvailable Tools:")?;
        for tool in tools {
            let spec = tool.tool_spec.as_ref();
            let name = spec.and_then(|s| s.name.as_deref()).unwrap_or("Unknown");
            let description = spec
                .and_then(|s| s.description.as_deref())
                .unwrap_or("No description");
            writeln!(
                w,
                "   - {}: {}",
                name,
                truncate_string(description, TOOL_DESCRIPTION_CHARS)
            )?;
        }
    }
    Ok(())
}

/// Writes the generated turn: text blocks, tool-use requests, reasoning, token
/// usage, a tool-call note, the stop reason and latency.
pub fn write_response<W: Write>(w: &mut W, response: &ConverseResponse) -> io::Result<()> {
    let content = response.content();

    for block in content {
        if let Some(text) = &block.text {
            writeln!(w, "{}", text)?;
        } else if let Some(tool_use) = &block.tool_use {
            let input = serde_json::to_string_pretty(&tool_use.input)
                .unwrap_or_else(|_| tool_use.input.to_string());
            writeln!(w, "\nTool Call: {}", tool_use.name.as_deref().unwrap_or("Unknown"))?;
            writeln!(w, "   Tool ID: {}", tool_use.tool_use_id.as_deref().unwrap_or("N/A"))?;
            writeln!(w, "   Input: {}", input)?;
        } else if let Some(reasoning) = block
            .reasoning_content
            .as_ref()
            .and_then(|r| r.reasoning_text.as_ref())
        {
            writeln!(w, "\nReasoning:")?;
            for line in reasoning.text.lines() {
                writeln!(w, "   {}", line)?;
            }
        }
    }

    let usage = response.usage.clone().unwrap_or_default();
    writeln!(w, "\nToken Usage:")?;
    writeln!(w, "   - Input tokens: {}", format_with_grouping(usage.input_tokens))?;
    writeln!(w, "   - Output tokens: {}", format_with_grouping(usage.output_tokens))?;
    writeln!(w, "   - Total tokens: {}", format_with_grouping(usage.total_tokens))?;
    if let Some(n) = usage.cache_read_input_tokens.filter(|n| *n > 0) {
        writeln!(w, "   - Cache read tokens: {}", format_with_grouping(n))?;
    }
    if let Some(n) = usage.cache_write_input_tokens.filter(|n| *n > 0) {
        writeln!(w, "   - Cache write tokens: {}", format_with_grouping(n))?;
    }

    let tool_calls = response.tool_uses().count();
    if tool_calls > 0 {
        writeln!(w, "\nNote: the model made {} tool call(s).", tool_calls)?;
        writeln!(w, "   To continue the conversation:")?;
        writeln!(w, "   1. Execute each tool with the provided input")?;
        writeln!(w, "   2. Add the tool results to the conversation")?;
        writeln!(w, "   3. Send the updated payload again")?;
    }

    let stop_reason = response
        .stop_reason
        .as_ref()
        .map(|r| r.as_str())
        .unwrap_or("unknown");
    writeln!(w, "\nStop Reason: {}", stop_reason)?;

    if let Some(latency) = response.metrics.as_ref().and_then(|m| m.latency_ms) {
        writeln!(w, "Latency: {} ms", format_with_grouping(latency))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::parse_payload;

    fn render(response: &str) -> String {
        let response: ConverseResponse = serde_json::from_str(response).unwrap();
        let mut out = Vec::new();
        write_response(&mut out, &response).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_and_usage() {
        let out = render(
            r#"{
                "output": {"message": {"role": "assistant", "content": [{"text": "Hello there"}]}},
                "stopReason": "end_turn",
                "usage": {"inputTokens": 10, "outputTokens": 5, "totalTokens": 15}
            }"#,
        );
        assert!(out.starts_with("Hello there\n"));
        assert!(out.contains("   - Input tokens: 10\n"));
        assert!(out.contains("   - Output tokens: 5\n"));
        assert!(out.contains("   - Total tokens: 15\n"));
        assert!(out.contains("Stop Reason: end_turn"));
        assert!(!out.contains("Cache read"));
        assert!(!out.contains("tool call"));
    }

    #[test]
    fn test_large_counts_are_grouped() {
        let out = render(
            r#"{
                "output": {"message": {"content": [{"text": "x"}]}},
                "usage": {"inputTokens": 1200, "outputTokens": 300, "totalTokens": 1500,
                          "cacheReadInputTokens": 20480, "cacheWriteInputTokens": 0},
                "metrics": {"latencyMs": 2345}
            }"#,
        );
        assert!(out.contains("   - Input tokens: 1,200\n"));
        assert!(out.contains("   - Total tokens: 1,500\n"));
        assert!(out.contains("   - Cache read tokens: 20,480\n"));
        assert!(!out.contains("Cache write"));
        assert!(out.contains("Latency: 2,345 ms"));
    }

    #[test]
    fn test_tool_use_prints_name_and_arguments() {
        let out = render(
            r#"{
                "output": {"message": {"content": [
                    {"text": "Let me look that up."},
                    {"toolUse": {"toolUseId": "tooluse_abc", "name": "get_weather",
                                 "input": {"city": "Paris", "units": "celsius"}}}
                ]}},
                "stopReason": "tool_use",
                "usage": {"inputTokens": 1, "outputTokens": 1, "totalTokens": 2}
            }"#,
        );
        assert!(out.contains("Tool Call: get_weather"));
        assert!(out.contains("Tool ID: tooluse_abc"));
        assert!(out.contains("\"city\": \"Paris\""));
        assert!(out.contains("\"units\": \"celsius\""));
        assert!(out.contains("the model made 1 tool call(s)"));
        assert!(out.contains("Stop Reason: tool_use"));
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let out = render(r#"{"output": {"message": {"content": [{"toolUse": {"input": {}}}]}}}"#);
        assert!(out.contains("Tool Call: Unknown"));
        assert!(out.contains("Tool ID: N/A"));
        assert!(out.contains("   - Total tokens: 0\n"));
        assert!(out.contains("Stop Reason: unknown"));
    }

    #[test]
    fn test_reasoning_block() {
        let out = render(
            r#"{"output": {"message": {"content": [
                {"reasoningContent": {"reasoningText": {"text": "step one\nstep two", "signature": "sig"}}},
                {"text": "Answer"}
            ]}}}"#,
        );
        assert!(out.contains("Reasoning:\n   step one\n   step two\n"));
        assert!(out.contains("Answer\n"));
    }

    #[test]
    fn test_payload_summary() {
        let long = "a".repeat(120);
        let text = format!(
            r#"{{
                "system": [{{"text": "You are a helpful assistant."}}],
                "messages": [{{"role": "user", "content": [{{"text": "{}"}}]}}],
                "toolConfig": {{"tools": [{{"toolSpec": {{"name": "calc", "description": "Adds numbers"}}}}]}},
                "inferenceConfig": {{"maxTokens": 1024}}
            }}"#,
            long
        );
        let payload = parse_payload(&text, Path::new("p.json")).unwrap();
        let mut out = Vec::new();
        write_payload_summary(&mut out, Path::new("p.json"), &payload).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Loaded payload from: p.json"));
        assert!(out.contains("   - System prompts: 1\n"));
        assert!(out.contains("   - Messages: 1\n"));
        assert!(out.contains("   - Tools available: 1\n"));
        assert!(out.contains("   - Max tokens: 1024\n"));
        assert!(out.contains("   - Temperature: default\n"));
        assert!(out.contains(&format!("   1. USER: {}...\n", "a".repeat(100))));
        assert!(out.contains("   You are a helpful assistant.\n"));
        assert!(out.contains("   - calc: Adds numbers\n"));
    }

    #[test]
    fn test_payload_summary_without_inference_config() {
        let payload = parse_payload(
            r#"{"messages": [{"role": "assistant", "content": [{"image": {}}]}]}"#,
            Path::new("p.json"),
        )
        .unwrap();
        let mut out = Vec::new();
        write_payload_summary(&mut out, Path::new("p.json"), &payload).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("   - Tools available: 0\n"));
        assert!(out.contains("   - Max tokens: 4096\n"));
        assert!(out.contains("   - Temperature: 0.7\n"));
        assert!(out.contains("   1. ASSISTANT: \n"));
        assert!(!out.contains("System Prompt Preview"));
        assert!(!out.contains("Available Tools"));
    }
}
