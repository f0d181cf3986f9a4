//! OpenAI streaming chat completions.

use super::{CompletionClient, FragmentStream};
use crate::config::ChatSettings;
use crate::error::{AssistantError, Result};
use crate::openai::{create_client, require_api_key};
use crate::rag::{ChatMessage, Role};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, instrument};

/// OpenAI-based streaming completion client.
pub struct OpenAICompletion {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAICompletion {
    /// Create a completion client from the chat section of the settings.
    pub fn from_settings(settings: &ChatSettings) -> Self {
        Self {
            client: create_client(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OpenAICompletion {
    fn default() -> Self {
        Self::from_settings(&ChatSettings::default())
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.clone();
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AssistantError::Completion(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AssistantError::Completion(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AssistantError::Completion(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl CompletionClient for OpenAICompletion {
    fn ensure_configured(&self) -> Result<()> {
        require_api_key()
    }

    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn stream_complete(&self, messages: &[ChatMessage]) -> Result<FragmentStream> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature)
            .stream(true)
            .build()
            .map_err(|e| AssistantError::Completion(e.to_string()))?;

        // The request is sent lazily; connection errors surface as stream items.
        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| AssistantError::OpenAI(format!("Failed to open completion stream: {}", e)))?;

        debug!("Completion stream created");

        Ok(stream
            .map(|item| match item {
                Ok(response) => Ok(response
                    .choices
                    .into_iter()
                    .filter_map(|choice| choice.delta.content)
                    .collect::<String>()),
                Err(e) => Err(AssistantError::OpenAI(format!("Completion stream error: {}", e))),
            })
            .boxed())
    }
}
