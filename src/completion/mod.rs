//! Streaming chat completion.

mod openai;

pub use openai::OpenAICompletion;

use crate::error::Result;
use crate::rag::ChatMessage;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Text fragments from a completion, in arrival order. May fail mid-stream.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Trait for streaming completion services.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Check that the client is able to make requests at all.
    ///
    /// A failure here is a configuration error and is reported before any
    /// fragment is streamed.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Start a streaming completion for the given messages.
    async fn stream_complete(&self, messages: &[ChatMessage]) -> Result<FragmentStream>;
}
