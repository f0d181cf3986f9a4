//! Prompt assembly.

use super::{ChatMessage, ConversationTurn, QuestionCategory};
use crate::config::Prompts;
use std::collections::HashMap;

/// Builds the ordered message sequence sent to the model.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    prompts: Prompts,
}

impl PromptAssembler {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    /// System instructions for a question of the given category.
    pub fn system_prompt(&self, category: QuestionCategory) -> String {
        let base = self
            .prompts
            .render_with_custom(&self.prompts.chat.system, &HashMap::new());
        format!("{}\n\n{}", base, category.guidance(&self.prompts.guidance))
    }

    /// The system message carrying retrieved documentation.
    pub fn context_message(&self, context: &str) -> ChatMessage {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        ChatMessage::system(self.prompts.render_with_custom(&self.prompts.chat.context, &vars))
    }

    /// Assemble `[system] + history + [context] + [message]`.
    ///
    /// History is replayed as given: no reordering, deduplication or
    /// truncation. A present context is always included as given.
    pub fn assemble(
        &self,
        system: &str,
        history: &[ConversationTurn],
        context: Option<&str>,
        message: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(ChatMessage::system(system));

        messages.extend(history.iter().map(|turn| ChatMessage {
            role: turn.model_role(),
            content: turn.content.clone(),
        }));

        if let Some(context) = context {
            messages.push(self.context_message(context));
        }

        messages.push(ChatMessage::user(message));
        messages
    }
}
