use chrono::NaiveDateTime;
use futures::StreamExt;
use std::sync::Arc;

use crate::assembler::{AssembledResponse, Renderer, ResponseAssembler};
use crate::catalog::PartsCatalog;
use crate::errors::AgentResult;
use crate::models::message::Message;
use crate::prompt::build_instructions;
use crate::providers::base::{Provider, StreamOptions};

/// Capabilities the model may invoke on its own while answering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSet {
    pub web_search: bool,
}

/// Everything that shapes one turn. Rebuilt for every turn since the
/// instructions carry the current time.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub instructions: String,
    pub think: bool,
    pub thinking_budget: Option<u32>,
    pub tools: ToolSet,
}

impl AgentConfig {
    pub fn for_catalog(
        now: NaiveDateTime,
        catalog: &PartsCatalog,
        think: bool,
        thinking_budget: Option<u32>,
        tools: ToolSet,
    ) -> AgentResult<Self> {
        Ok(Self {
            instructions: build_instructions(now, &catalog.names())?,
            think,
            thinking_budget,
            tools,
        })
    }

    fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            think: self.think,
            thinking_budget: self.thinking_budget,
            enable_search: self.tools.web_search,
        }
    }
}

/// Agent pairs a provider with the configuration of the current turn
pub struct Agent {
    provider: Arc<dyn Provider>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(provider: Arc<dyn Provider>, config: AgentConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Stream a reply to the conversation, rendering it as it arrives.
    ///
    /// On error nothing is finalized: whatever was rendered so far stays as is.
    pub async fn reply<R: Renderer>(
        &self,
        conversation: &[Message],
        renderer: R,
    ) -> AgentResult<AssembledResponse> {
        let options = self.config.stream_options();
        let mut stream = self
            .provider
            .stream(&self.config.instructions, conversation, &options)
            .await?;

        let mut assembler = ResponseAssembler::new(self.config.think, renderer);
        let mut usage = None;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if chunk.usage.is_some() {
                usage = chunk.usage.clone();
            }
            assembler.push(&chunk);
        }

        let response = assembler.finish();
        tracing::debug!(
            answer_len = response.answer.len(),
            reasoning_len = response.reasoning.len(),
            usage = ?usage,
            "Reply complete"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{NullRenderer, Panel};
    use crate::errors::{AgentError, ProviderError};
    use crate::models::chunk::{StreamChunk, Usage};
    use crate::providers::mock::{MockProvider, MockTurn};
    use chrono::NaiveDate;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn catalog() -> PartsCatalog {
        let parts = json!({"AC Adapter": {}, "Battery": {}});
        PartsCatalog::new(parts.as_object().cloned().unwrap())
    }

    fn agent(provider: &MockProvider, think: bool) -> Agent {
        let config =
            AgentConfig::for_catalog(now(), &catalog(), think, Some(1024), ToolSet::default())
                .unwrap();
        Agent::new(Arc::new(provider.clone()), config)
    }

    #[derive(Default)]
    struct Panels {
        answer: Vec<String>,
        thinking: Vec<String>,
    }

    impl Renderer for Panels {
        fn render(&mut self, panel: Panel, content: &str) {
            match panel {
                Panel::Answer => self.answer.push(content.to_string()),
                Panel::Thinking => self.thinking.push(content.to_string()),
            }
        }
    }

    #[test]
    fn test_config_embeds_catalog() {
        let config = AgentConfig::for_catalog(
            now(),
            &catalog(),
            false,
            None,
            ToolSet { web_search: true },
        )
        .unwrap();

        assert!(config.instructions.contains("AC Adapter、Battery"));
        assert!(config.instructions.contains("2025-03-14 10:00:00"));
        assert_eq!(
            config.stream_options(),
            StreamOptions {
                think: false,
                thinking_budget: None,
                enable_search: true,
            }
        );
    }

    #[tokio::test]
    async fn test_reply_assembles_answer() -> AgentResult<()> {
        let provider = MockProvider::new(vec![MockTurn::chunks(vec![
            StreamChunk::text("Trou"),
            StreamChunk::text("bleshoot: ..."),
        ])]);
        let agent = agent(&provider, false);
        let conversation = vec![Message::user("charging port broken")];

        let mut panels = Panels::default();
        let response = agent.reply(&conversation, &mut panels).await?;

        assert_eq!(response.answer, "Troubleshoot: ...");
        assert_eq!(response.reasoning, "");
        assert!(panels.thinking.is_empty());
        assert_eq!(panels.answer.last().map(String::as_str), Some("Troubleshoot: ..."));

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages, conversation);
        assert!(!requests[0].options.think);
        assert_eq!(requests[0].options.thinking_budget, Some(1024));
        assert!(requests[0].system.contains("AC Adapter、Battery"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reply_tracks_usage_and_reasoning() -> AgentResult<()> {
        let provider = MockProvider::new(vec![MockTurn::chunks(vec![
            StreamChunk::reasoning("port"),
            StreamChunk::text("{}"),
            StreamChunk {
                usage: Some(Usage::new(Some(1), Some(2), Some(3))),
                ..Default::default()
            },
        ])]);
        let agent = agent(&provider, true);

        let mut panels = Panels::default();
        let response = agent.reply(&[Message::user("q")], &mut panels).await?;

        assert_eq!(response.reasoning, "port");
        assert_eq!(panels.thinking, vec!["port▌".to_string(), "port".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_reply_with_no_chunks_is_empty() -> AgentResult<()> {
        let provider = MockProvider::new(vec![MockTurn::chunks(vec![])]);
        let response = agent(&provider, false)
            .reply(&[Message::user("q")], NullRenderer)
            .await?;
        assert_eq!(response.answer, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_reply_propagates_open_failure() {
        let provider = MockProvider::new(vec![MockTurn::Fail(ProviderError::Transport(
            "connection refused".to_string(),
        ))]);
        let result = agent(&provider, false)
            .reply(&[Message::user("q")], NullRenderer)
            .await;

        assert_eq!(
            result,
            Err(AgentError::Provider(ProviderError::Transport(
                "connection refused".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_reply_midstream_failure_keeps_partial_render() {
        let provider = MockProvider::new(vec![MockTurn::Stream(vec![
            Ok(StreamChunk::text("Trou")),
            Err(ProviderError::Protocol("bad chunk".to_string())),
        ])]);
        let mut panels = Panels::default();
        let result = agent(&provider, false)
            .reply(&[Message::user("q")], &mut panels)
            .await;

        assert!(matches!(
            result,
            Err(AgentError::Provider(ProviderError::Protocol(_)))
        ));
        assert_eq!(panels.answer, vec!["Trou▌".to_string()]);
    }
}
