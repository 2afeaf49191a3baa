//! These models represent the objects passed between the UI, the session and the provider
//!
//! - `Message` is one entry of the conversation log and is what the provider replays
//! - `StreamChunk` is one incremental piece of a streaming model response
//!
//! Provider specific wire formats are converted into these at the adapter boundary.
pub mod chunk;
pub mod message;
pub mod role;
