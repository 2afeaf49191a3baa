use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{ChunkStream, Provider, StreamOptions};
use super::configs::DashScopeProviderConfig;
use super::utils::{messages_to_openai_spec, openai_chunk_to_stream_chunk};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::Message;

pub const DASHSCOPE_HOST: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DASHSCOPE_MODEL: &str = "qwen-turbo";

/// Qwen models skip their reasoning phase when a user turn starts with this
pub const NO_THINK_DIRECTIVE: &str = "/no_think";

const DONE_MARKER: &str = "[DONE]";

pub struct DashScopeProvider {
    client: Client,
    config: DashScopeProviderConfig,
}

impl DashScopeProvider {
    pub fn new(config: DashScopeProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn build_payload(&self, system: &str, messages: &[Message], options: &StreamOptions) -> Value {
        let system_message = json!({
            "role": "system",
            "content": system
        });

        let replayed = suppress_thinking(messages, options.think);
        let mut messages_array = vec![system_message];
        messages_array.extend(messages_to_openai_spec(&replayed));

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_array,
            "stream": true,
            "stream_options": {"include_usage": true},
            "enable_thinking": options.think,
        });

        if options.think {
            if let Some(budget) = options.thinking_budget {
                payload["thinking_budget"] = json!(budget);
            }
        }
        if options.enable_search {
            payload["enable_search"] = json!(true);
        }

        payload
    }

    async fn post(&self, payload: Value) -> ProviderResult<Response> {
        let url = format!(
            "{}/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::Transport(format!(
                "Request failed with status {}: {}",
                status, body
            )))
        }
    }
}

/// Replay the conversation, asking the model to skip reasoning on the latest
/// user turn when thinking is off. No other message is touched.
pub fn suppress_thinking(messages: &[Message], think: bool) -> Vec<Message> {
    let mut replayed = messages.to_vec();
    if !think {
        if let Some(last) = replayed.last_mut().filter(|m| m.is_user()) {
            last.content = format!("{} {}", NO_THINK_DIRECTIVE, last.content);
        }
    }
    replayed
}

#[async_trait]
impl Provider for DashScopeProvider {
    async fn stream(
        &self,
        system: &str,
        messages: &[Message],
        options: &StreamOptions,
    ) -> ProviderResult<ChunkStream> {
        let payload = self.build_payload(system, messages, options);
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            think = options.think,
            "Opening DashScope stream"
        );

        let response = self.post(payload).await?;
        let mut events = response.bytes_stream().eventsource();

        let chunks = async_stream::stream! {
            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(EventStreamError::Transport(e)) => {
                        yield Err(ProviderError::from(e));
                        return;
                    }
                    Err(e) => {
                        yield Err(ProviderError::Protocol(format!("SSE stream error: {}", e)));
                        return;
                    }
                };

                if event.data == DONE_MARKER {
                    return;
                }

                match openai_chunk_to_stream_chunk(&event.data) {
                    Ok(chunk) => yield Ok(chunk),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            yield Err(ProviderError::Protocol(
                "SSE stream closed before response completed".to_string(),
            ));
        };

        Ok(chunks.boxed())
    }
}
