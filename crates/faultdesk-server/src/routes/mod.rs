// Export route modules
pub mod reply;
pub mod session;
pub mod ui;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(ui::routes(state.clone()))
        .merge(reply::routes(state.clone()))
        .merge(session::routes(state))
}
