//! Process-wide assistant: one document store and chat service shared by
//! every request.

use crate::chat::{ChatService, ResponseStream};
use crate::completion::{CompletionClient, OpenAICompletion};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::rag::{ConversationTurn, DocumentStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// The assistant's long-lived state.
///
/// Built once at startup; the document store is immutable afterwards, so
/// the assistant can be shared across concurrent requests without locks.
pub struct Assistant {
    settings: Settings,
    store: Arc<DocumentStore>,
    chat: ChatService,
}

impl Assistant {
    /// Start the assistant with OpenAI-backed embedding and completion.
    pub async fn start(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding));
        let completion: Arc<dyn CompletionClient> = Arc::new(OpenAICompletion::from_settings(&settings.chat));

        Self::with_components(settings, prompts, embedder, completion).await
    }

    /// Start the assistant with custom components.
    #[instrument(skip_all)]
    pub async fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionClient>,
    ) -> Result<Self> {
        info!("Building document store");
        let store = Arc::new(DocumentStore::from_settings(embedder, &settings).await?);
        info!(
            available = store.is_available(),
            chunks = store.chunk_count(),
            "Document store ready"
        );

        let chat = ChatService::new(completion, prompts, settings.retrieval.k)
            .with_fragment_timeout(Duration::from_secs(settings.chat.timeout_secs));

        Ok(Self {
            settings,
            store,
            chat,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<DocumentStore> {
        self.store.clone()
    }

    /// Answer `message` against the shared document store.
    pub async fn stream_response(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<ResponseStream> {
        self.chat.stream_response(message, history, &self.store).await
    }

    /// Release the assistant's resources.
    pub fn shutdown(self) {
        info!(
            chunks = self.store.chunk_count(),
            "Assistant shut down"
        );
    }
}
