use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use faultdesk::agent::ToolSet;
use faultdesk::catalog::DEFAULT_CATALOG_PATH;
use faultdesk::providers::{
    configs::{DashScopeProviderConfig, ProviderConfig},
    dashscope,
};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_dashscope_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub thinking_budget: Option<u32>,
    /// Lets the model search the web while answering
    #[serde(default = "default_enable_search")]
    pub enable_search: bool,
}

impl ProviderSettings {
    pub fn tools(&self) -> ToolSet {
        ToolSet {
            web_search: self.enable_search,
        }
    }

    // Convert to the faultdesk ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        ProviderConfig::DashScope(DashScopeProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    /// Refuse to start when the catalog cannot be loaded
    #[serde(default)]
    pub strict: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            strict: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    /// Initial state of the think-mode toggle
    #[serde(default = "default_think")]
    pub think: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            think: default_think(),
        }
    }
}

#[derive(Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        // Start with default configuration
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_dashscope_host())?
            .set_default("provider.model", default_model())?
            .set_default("provider.enable_search", default_enable_search())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("FAULTDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::Other(err)
        })?;

        if settings.provider.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                env_var: to_env_var("provider.api_key"),
            });
        }

        Ok(settings)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_model() -> String {
    dashscope::DASHSCOPE_MODEL.to_string()
}

fn default_dashscope_host() -> String {
    dashscope::DASHSCOPE_HOST.to_string()
}

fn default_enable_search() -> bool {
    true
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}

fn default_think() -> bool {
    true
}
