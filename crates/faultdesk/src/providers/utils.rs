use serde_json::{json, Value};

use crate::errors::{ProviderError, ProviderResult};
use crate::models::chunk::{StreamChunk, Usage};
use crate::models::message::Message;

/// Convert internal Message format to the OpenAI chat message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": message.content,
            })
        })
        .collect()
}

/// Read the token usage block of an OpenAI compatible payload
pub fn get_usage(usage: &Value) -> Usage {
    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

fn api_error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .unwrap_or("An error occurred during streaming")
        .to_string()
}

/// Convert one OpenAI compatible `chat.completion.chunk` event into a StreamChunk
pub fn openai_chunk_to_stream_chunk(data: &str) -> ProviderResult<StreamChunk> {
    let event: Value = serde_json::from_str(data)
        .map_err(|e| ProviderError::Protocol(format!("Invalid chunk: {}, data: {}", e, data)))?;

    if let Some(error) = event.get("error") {
        return Err(ProviderError::Protocol(format!(
            "API error: {}",
            api_error_message(error)
        )));
    }

    let delta = &event["choices"][0]["delta"];
    let text_field = |name: &str| delta.get(name).and_then(|v| v.as_str()).map(String::from);

    Ok(StreamChunk {
        reasoning: text_field("reasoning_content"),
        content: text_field("content"),
        usage: event
            .get("usage")
            .filter(|usage| usage.is_object())
            .map(get_usage),
    })
}
