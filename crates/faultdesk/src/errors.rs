use std::path::PathBuf;
use thiserror::Error;

/// Failures of the remote model call. Either the request never produced a
/// usable response (`Transport`) or the response could not be understood
/// (`Protocol`).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Failed to render instructions: {0}")]
    Prompt(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read parts catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse parts catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Parts catalog {0} is not a JSON object")]
    NotAnObject(PathBuf),
}
