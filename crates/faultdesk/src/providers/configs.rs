// Unified enum to wrap different provider configurations
pub enum ProviderConfig {
    DashScope(DashScopeProviderConfig),
}

#[derive(Clone)]
pub struct DashScopeProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}
