use crate::{markdown, state::AppState};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use faultdesk::{
    agent::{Agent, AgentConfig},
    assembler::{Panel, Renderer},
    prompt::analyze_request,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

#[derive(Debug, Deserialize)]
struct ReplyRequest {
    text: String,
    /// Falls back to the configured default when absent
    #[serde(default)]
    think: Option<bool>,
    /// Wrap the text as a transcript to analyze
    #[serde(default)]
    analyze: bool,
}

// Server-sent event stream of JSON encoded reply events
pub struct SseResponse {
    rx: UnboundedReceiverStream<String>,
}

impl SseResponse {
    fn new(rx: UnboundedReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> axum::response::Response {
        let body = axum::body::Body::from_stream(self);

        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ReplyEvent<'a> {
    User {
        content: &'a str,
        html: String,
    },
    Heading {
        panel: Panel,
        title: &'a str,
    },
    /// `html` carries the markdown rendering of answer content
    Panel {
        panel: Panel,
        content: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        html: Option<String>,
    },
    Error { message: &'a str },
    Done,
}

struct EventFormatter;

impl EventFormatter {
    fn format(event: &ReplyEvent<'_>) -> String {
        let encoded = serde_json::to_string(event).unwrap_or_else(|_| String::from("{}"));
        format!("data: {}\n\n", encoded)
    }
}

/// Forwards panel updates to the response stream. A closed stream means the
/// browser went away; the turn still completes and updates are dropped.
struct ChannelRenderer {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelRenderer {
    fn send(&self, event: ReplyEvent<'_>) {
        let _ = self.tx.send(EventFormatter::format(&event));
    }
}

impl Renderer for ChannelRenderer {
    fn render(&mut self, panel: Panel, content: &str) {
        let html = match panel {
            Panel::Answer => Some(markdown::to_html(content)),
            Panel::Thinking => None,
        };
        self.send(ReplyEvent::Panel {
            panel,
            content,
            html,
        });
    }

    fn heading(&mut self, panel: Panel, title: &str) {
        self.send(ReplyEvent::Heading { panel, title });
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ReplyRequest>,
) -> Result<SseResponse, StatusCode> {
    if request.text.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let think = request.think.unwrap_or(state.turn.think_default);
    let analyze = request.analyze;
    let user_text = if analyze {
        analyze_request(&request.text)
    } else {
        request.text
    };

    // Create channel for streaming
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx);

    // The turn runs to completion even if the client disconnects
    tokio::spawn(async move {
        let renderer = ChannelRenderer { tx };
        let mut session = state.session.lock().await;

        let config = AgentConfig::for_catalog(
            chrono::Local::now().naive_local(),
            session.catalog(),
            think,
            state.turn.thinking_budget,
            state.turn.tools.clone(),
        );
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to build instructions: {}", e);
                renderer.send(ReplyEvent::Error {
                    message: &e.to_string(),
                });
                renderer.send(ReplyEvent::Done);
                return;
            }
        };

        tracing::debug!(think, analyze, "Starting turn");
        renderer.send(ReplyEvent::User {
            content: &user_text,
            html: markdown::to_html(&user_text),
        });

        let agent = Agent::new(state.provider.clone(), config);
        let tx = renderer.tx.clone();
        if let Err(e) = session.run_turn(&agent, user_text, renderer).await {
            let message = e.to_string();
            let _ = tx.send(EventFormatter::format(&ReplyEvent::Error { message: &message }));
        }
        let _ = tx.send(EventFormatter::format(&ReplyEvent::Done));
    });

    Ok(SseResponse::new(stream))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/reply", post(handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppState, TurnSettings};
    use axum::{body::Body, http::Request};
    use faultdesk::{
        catalog::PartsCatalog,
        errors::ProviderError,
        models::{chunk::StreamChunk, role::Role},
        providers::mock::{MockProvider, MockTurn},
        session::SessionContext,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state(provider: &MockProvider, think_default: bool) -> AppState {
        let parts = json!({"Charging Port Board": {}, "Power Adapter": {}});
        let catalog = PartsCatalog::new(parts.as_object().cloned().unwrap());
        AppState::new(
            Arc::new(provider.clone()),
            TurnSettings {
                think_default,
                ..Default::default()
            },
            SessionContext::new(catalog),
        )
    }

    async fn post_reply(state: AppState, body: Value) -> (StatusCode, Vec<Value>) {
        let request = Request::builder()
            .method("POST")
            .uri("/reply")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = routes(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        let events = text
            .split("\n\n")
            .filter_map(|frame| frame.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect();
        (status, events)
    }

    fn event_types(events: &[Value]) -> Vec<&str> {
        events.iter().map(|e| e["type"].as_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_reply_streams_panels_and_records_turn() {
        let provider = MockProvider::new(vec![MockTurn::chunks(vec![
            StreamChunk::reasoning("check the port"),
            StreamChunk::text("{\"Device Information\": {}}"),
        ])]);
        let state = state(&provider, true);

        let (status, events) = post_reply(state.clone(), json!({"text": "  port is loose  "})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            event_types(&events),
            vec!["user", "panel", "heading", "panel", "panel", "panel", "done"]
        );
        // Stored and sent as typed
        assert_eq!(events[0]["content"], "  port is loose  ");
        assert_eq!(events[1]["panel"], "thinking");
        assert_eq!(events[1]["content"], "check the port▌");
        assert!(events[1].get("html").is_none());
        assert_eq!(events[2]["title"], "Answer");
        assert_eq!(events[4]["content"], "check the port");
        assert_eq!(events[5]["panel"], "answer");
        assert_eq!(events[5]["content"], "{\"Device Information\": {}}");

        let session = state.session.lock().await;
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].content, "  port is loose  ");
        assert_eq!(session.messages()[1].role, Role::Assistant);

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].content, "  port is loose  ");
        assert!(request.options.think);
        assert!(request.system.contains("Charging Port Board、Power Adapter"));
    }

    #[tokio::test]
    async fn test_analyze_wraps_transcript_and_honours_think_flag() {
        let provider = MockProvider::new(vec![MockTurn::chunks(vec![StreamChunk::text("ok")])]);
        let state = state(&provider, true);

        let (_, events) = post_reply(
            state.clone(),
            json!({"text": "客户: 充电口松动", "think": false, "analyze": true}),
        )
        .await;

        // No heading without think mode
        assert_eq!(event_types(&events), vec!["user", "panel", "panel", "done"]);

        let request = &provider.requests()[0];
        assert!(!request.options.think);
        assert_eq!(
            request.messages[0].content,
            "请分析以下对话并提供建议:\n\n客户: 充电口松动"
        );
    }

    #[tokio::test]
    async fn test_answer_panels_carry_markdown() {
        let provider = MockProvider::new(vec![MockTurn::chunks(vec![
            StreamChunk::text("**Reseat**"),
            StreamChunk::text(" the cable"),
        ])]);
        let state = state(&provider, false);

        let (_, events) = post_reply(state, json!({"text": "*screen* flickers"})).await;

        assert_eq!(events[0]["html"], "<p><em>screen</em> flickers</p>\n");
        assert_eq!(events[1]["html"], "<p><strong>Reseat</strong>▌</p>\n");
        assert_eq!(
            events[3]["html"],
            "<p><strong>Reseat</strong> the cable</p>\n"
        );
        assert_eq!(events[3]["content"], "**Reseat** the cable");
    }

    #[tokio::test]
    async fn test_failed_turn_sends_error_event() {
        let provider = MockProvider::new(vec![MockTurn::Fail(ProviderError::Transport(
            "Request failed with status 429 Too Many Requests: slow down".to_string(),
        ))]);
        let state = state(&provider, false);

        let (status, events) = post_reply(state.clone(), json!({"text": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(event_types(&events), vec!["user", "error", "done"]);
        assert!(events[1]["message"].as_str().unwrap().contains("429"));

        let session = state.session.lock().await;
        assert_eq!(session.messages().len(), 1);
        assert!(session.messages()[0].is_user());
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let provider = MockProvider::default();
        let (status, events) = post_reply(state(&provider, true), json!({"text": "   "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(events.is_empty());
        assert!(provider.requests().is_empty());
    }
}
