mod configuration;
mod error;
mod markdown;
mod routes;
mod state;

use faultdesk::{catalog::PartsCatalog, providers::factory, session::SessionContext};
use state::{AppState, TurnSettings};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = configuration::Settings::new()?;

    let catalog = if settings.catalog.strict {
        PartsCatalog::try_load(&settings.catalog.path)?
    } else {
        PartsCatalog::load(&settings.catalog.path)
    };
    if catalog.is_empty() {
        tracing::warn!(
            path = %settings.catalog.path.display(),
            "Parts catalog is empty, the model will be told no parts are available"
        );
    } else {
        info!("Loaded {} parts from {}", catalog.len(), settings.catalog.path.display());
    }

    let turn = TurnSettings {
        think_default: settings.agent.think,
        thinking_budget: settings.provider.thinking_budget,
        tools: settings.provider.tools(),
    };
    let addr = settings.server.socket_addr()?;
    let provider = factory::get_provider(settings.provider.into_config())?;

    let state = AppState::new(provider, turn, SessionContext::new(catalog));

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
