//! In-process fakes for the embedding and completion services.

use crate::completion::{CompletionClient, FragmentStream};
use crate::embedding::Embedder;
use crate::error::{AssistantError, Result};
use crate::rag::ChatMessage;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Mutex;

/// Terms counted by [`KeywordEmbedder`], one vector dimension each.
const VOCABULARY: &[&str] = &[
    "segment",
    "mparticle",
    "lytics",
    "zeotap",
    "source",
    "profile",
    "audience",
    "identit",
    "consent",
    "destination",
    "weather",
];

/// Bag-of-words embedder: each dimension counts one vocabulary term.
#[derive(Default)]
pub struct KeywordEmbedder {
    fail_batch: bool,
    fail_query: bool,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every batch call (index construction).
    pub fn failing_batch() -> Self {
        Self {
            fail_batch: true,
            fail_query: false,
        }
    }

    /// Fail every single-text call (query embedding).
    pub fn failing_query() -> Self {
        Self {
            fail_batch: false,
            fail_query: true,
        }
    }

    fn vectorize(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        VOCABULARY
            .iter()
            .map(|term| lower.matches(term).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_query {
            return Err(AssistantError::Embedding("query embedding unavailable".to_string()));
        }
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail_batch {
            return Err(AssistantError::Embedding("batch embedding unavailable".to_string()));
        }
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len()
    }
}

/// One step of a scripted completion stream.
#[derive(Debug, Clone)]
pub enum Step {
    Text(&'static str),
    Fail(&'static str),
    /// Never yields; the stream hangs from here on.
    Stall,
}

/// Completion client that replays a fixed script and records its prompts.
pub struct ScriptedCompletion {
    steps: Vec<Step>,
    configured: bool,
    fail_open: bool,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletion {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            configured: true,
            fail_open: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Emit the given fragments, then end.
    pub fn fragments(fragments: &[&'static str]) -> Self {
        Self::new(fragments.iter().map(|f| Step::Text(f)).collect())
    }

    /// Behave as if the credential were missing.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    /// Fail when opening the stream.
    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::new(Vec::new())
        }
    }

    /// Every message list this client was called with.
    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    fn ensure_configured(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(AssistantError::Config("OPENAI_API_KEY not set".to_string()))
        }
    }

    async fn stream_complete(&self, messages: &[ChatMessage]) -> Result<FragmentStream> {
        self.prompts.lock().unwrap().push(messages.to_vec());

        if self.fail_open {
            return Err(AssistantError::OpenAI("connection refused".to_string()));
        }

        let steps = self.steps.clone();
        Ok(futures::stream::iter(steps)
            .then(|step| async move {
                match step {
                    Step::Text(text) => Ok(text.to_string()),
                    Step::Fail(reason) => Err(AssistantError::Completion(reason.to_string())),
                    Step::Stall => futures::future::pending().await,
                }
            })
            .boxed())
    }
}
