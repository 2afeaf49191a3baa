use crate::state::AppState;
use axum::{extract::State, response::Html, routing::get, Router};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Marker in the page replaced by the initial state of the think checkbox
const THINK_MARKER: &str = "{{think_checked}}";

async fn index(State(state): State<AppState>) -> Html<String> {
    let checked = if state.turn.think_default {
        "checked"
    } else {
        ""
    };
    Html(INDEX_HTML.replace(THINK_MARKER, checked))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}
