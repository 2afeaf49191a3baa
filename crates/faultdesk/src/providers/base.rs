use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::ProviderResult;
use crate::models::chunk::StreamChunk;
use crate::models::message::Message;

/// Incremental pieces of one streaming response, in arrival order
pub type ChunkStream = BoxStream<'static, ProviderResult<StreamChunk>>;

/// Per-request options. Providers translate these into whatever their API exposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamOptions {
    pub think: bool,
    pub thinking_budget: Option<u32>,
    pub enable_search: bool,
}

/// Base trait for hosted model providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Open a streaming response for the conversation.
    ///
    /// Opening the stream fails with a transport error when the endpoint
    /// cannot be reached or rejects the request. Errors after that arrive as
    /// items of the stream.
    async fn stream(
        &self,
        system: &str,
        messages: &[Message],
        options: &StreamOptions,
    ) -> ProviderResult<ChunkStream>;
}
