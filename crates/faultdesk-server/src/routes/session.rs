use crate::{markdown, state::AppState};
use axum::{extract::State, routing::get, Json, Router};
use faultdesk::models::message::Message;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct MessageView {
    #[serde(flatten)]
    message: Message,
    html: String,
}

// Waits for a running turn to finish, so the log is never read half written
async fn messages(State(state): State<AppState>) -> Json<Vec<MessageView>> {
    let session = state.session.lock().await;
    Json(
        session
            .messages()
            .iter()
            .map(|message| MessageView {
                html: markdown::to_html(&message.content),
                message: message.clone(),
            })
            .collect(),
    )
}

async fn catalog(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.parts.as_ref().clone())
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/messages", get(messages))
        .route("/catalog", get(catalog))
        .with_state(state)
}
