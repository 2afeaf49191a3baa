use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::errors::{ProviderError, ProviderResult};
use crate::models::chunk::StreamChunk;
use crate::models::message::Message;
use crate::providers::base::{ChunkStream, Provider, StreamOptions};

/// Scripted outcome of one call to the mock provider
pub enum MockTurn {
    /// Stream these items, errors included, then end
    Stream(Vec<ProviderResult<StreamChunk>>),
    /// Fail before any chunk is produced
    Fail(ProviderError),
}

impl MockTurn {
    pub fn chunks(chunks: Vec<StreamChunk>) -> Self {
        MockTurn::Stream(chunks.into_iter().map(Ok).collect())
    }
}

/// What the mock was asked for, for assertions
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub options: StreamOptions,
}

/// A mock provider that replays pre-configured turns for testing
#[derive(Clone, Default)]
pub struct MockProvider {
    turns: Arc<Mutex<VecDeque<MockTurn>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of turns
    pub fn new(turns: Vec<MockTurn>) -> Self {
        Self {
            turns: Arc::new(Mutex::new(turns.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn stream(
        &self,
        system: &str,
        messages: &[Message],
        options: &StreamOptions,
    ) -> ProviderResult<ChunkStream> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: system.to_string(),
            messages: messages.to_vec(),
            options: options.clone(),
        });

        // An exhausted script behaves like an empty response
        let turn = self.turns.lock().unwrap().pop_front();
        match turn {
            Some(MockTurn::Stream(items)) => Ok(stream::iter(items).boxed()),
            Some(MockTurn::Fail(err)) => Err(err),
            None => Ok(stream::empty().boxed()),
        }
    }
}
