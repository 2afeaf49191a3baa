use super::{base::Provider, configs::ProviderConfig, dashscope::DashScopeProvider};
use crate::errors::ProviderResult;
use std::sync::Arc;

pub fn get_provider(config: ProviderConfig) -> ProviderResult<Arc<dyn Provider>> {
    match config {
        ProviderConfig::DashScope(dashscope_config) => {
            Ok(Arc::new(DashScopeProvider::new(dashscope_config)?))
        }
    }
}
