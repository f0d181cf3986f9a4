//! Chat orchestration: retrieval, prompt assembly and streamed completion.
//!
//! Each request moves through [`ChatPhase`]s:
//! `Init -> Retrieving -> Assembling -> Streaming -> Done | Failed`.
//! `Failed` is only reachable from `Streaming` and still yields one apology
//! fragment before the stream ends. Waiting for any fragment, the first one
//! included, is bounded by the service's fragment timeout.

use crate::completion::{CompletionClient, FragmentStream};
use crate::config::Prompts;
use crate::error::Result;
use crate::rag::{ConversationTurn, DocumentStore, PromptAssembler, QuestionCategory};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Text fragments streamed back to the caller. Never fails; finite.
pub type ResponseStream = BoxStream<'static, String>;

/// Default bound on the wait for each completion fragment.
pub const DEFAULT_FRAGMENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifecycle of a single chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Init,
    Retrieving,
    Assembling,
    Streaming,
    Done,
    Failed,
}

fn enter(request_id: Uuid, phase: ChatPhase) {
    debug!(%request_id, ?phase, "chat phase");
}

/// Orchestrates a chat request against a completion service.
pub struct ChatService {
    completion: Arc<dyn CompletionClient>,
    assembler: PromptAssembler,
    k: usize,
    fragment_timeout: Duration,
}

impl ChatService {
    /// Create a chat service retrieving `k` chunks per question.
    pub fn new(completion: Arc<dyn CompletionClient>, prompts: Prompts, k: usize) -> Self {
        Self {
            completion,
            assembler: PromptAssembler::new(prompts),
            k,
            fragment_timeout: DEFAULT_FRAGMENT_TIMEOUT,
        }
    }

    /// Bound the wait for opening the completion and for each fragment.
    pub fn with_fragment_timeout(mut self, timeout: Duration) -> Self {
        self.fragment_timeout = timeout;
        self
    }

    /// Answer `message` given the prior `history`, streaming text fragments.
    ///
    /// Returns `Err` only for configuration errors, before anything is
    /// streamed. Retrieval problems degrade to an answer without context;
    /// completion problems end the stream with a single apology.
    pub async fn stream_response(
        &self,
        message: &str,
        history: &[ConversationTurn],
        store: &DocumentStore,
    ) -> Result<ResponseStream> {
        let request_id = Uuid::new_v4();
        enter(request_id, ChatPhase::Init);
        self.completion.ensure_configured()?;

        enter(request_id, ChatPhase::Retrieving);
        let retrieval = store.retrieve(message, self.k).await;
        if retrieval.is_degraded() {
            warn!(%request_id, "Answering without documentation: {:?}", retrieval);
        }

        enter(request_id, ChatPhase::Assembling);
        let category = QuestionCategory::classify(message);
        let system = self.assembler.system_prompt(category);
        let messages = self
            .assembler
            .assemble(&system, history, retrieval.context(), message);
        info!(
            %request_id,
            %category,
            history = history.len(),
            context = retrieval.context().is_some(),
            "Chat request assembled"
        );

        enter(request_id, ChatPhase::Streaming);
        let apology = self.assembler.prompts().chat.apology.clone();

        let timeout = self.fragment_timeout;
        match tokio::time::timeout(timeout, self.completion.stream_complete(&messages)).await {
            Ok(Ok(fragments)) => Ok(relay(fragments, apology, timeout, request_id)),
            Ok(Err(e)) => {
                warn!(%request_id, "Completion failed to start: {}", e);
                enter(request_id, ChatPhase::Failed);
                Ok(stream::once(async move { apology }).boxed())
            }
            Err(_) => {
                warn!(%request_id, "Completion did not start within {:?}", timeout);
                enter(request_id, ChatPhase::Failed);
                Ok(stream::once(async move { apology }).boxed())
            }
        }
    }
}

/// Forward non-empty fragments; on the first error or stall emit `apology`
/// and stop.
fn relay(
    fragments: FragmentStream,
    apology: String,
    timeout: Duration,
    request_id: Uuid,
) -> ResponseStream {
    stream::unfold(Some(fragments), move |state| {
        let apology = apology.clone();
        async move {
            let mut fragments = state?;

            loop {
                match tokio::time::timeout(timeout, fragments.next()).await {
                    Ok(Some(Ok(text))) if text.is_empty() => continue,
                    Ok(Some(Ok(text))) => return Some((text, Some(fragments))),
                    Ok(Some(Err(e))) => {
                        warn!(%request_id, "Completion stream failed: {}", e);
                        enter(request_id, ChatPhase::Failed);
                        return Some((apology, None));
                    }
                    Ok(None) => {
                        enter(request_id, ChatPhase::Done);
                        return None;
                    }
                    Err(_) => {
                        warn!(%request_id, "No completion fragment within {:?}", timeout);
                        enter(request_id, ChatPhase::Failed);
                        return Some((apology, None));
                    }
                }
            }
        }
    })
    .boxed()
}
