use faultdesk::agent::ToolSet;
use faultdesk::providers::base::Provider;
use faultdesk::session::SessionContext;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Settings applied to every turn, fixed at start-up
#[derive(Debug, Clone, Default)]
pub struct TurnSettings {
    pub think_default: bool,
    pub thinking_budget: Option<u32>,
    pub tools: ToolSet,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn Provider>,
    pub turn: TurnSettings,
    /// Part names, fixed for the process so readers never wait on a turn
    pub parts: Arc<Vec<String>>,
    /// One session per process; a turn holds the lock until it completes
    pub session: Arc<Mutex<SessionContext>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn Provider>, turn: TurnSettings, session: SessionContext) -> Self {
        let parts = session
            .catalog()
            .names()
            .into_iter()
            .map(String::from)
            .collect();
        Self {
            provider,
            turn,
            parts: Arc::new(parts),
            session: Arc::new(Mutex::new(session)),
        }
    }
}
