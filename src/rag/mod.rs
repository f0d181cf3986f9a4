//! RAG (Retrieval-Augmented Generation) over the CDP documentation corpus.
//!
//! Retrieval lives in [`DocumentStore`], prompt construction in
//! [`PromptAssembler`], question classification in [`QuestionCategory`].

mod classify;
mod prompt;
mod store;

pub use classify::QuestionCategory;
pub use prompt::PromptAssembler;
pub use store::{DocumentStore, RetrievalOutcome, DEFAULT_K};

use serde::{Deserialize, Serialize};

/// Role of a model-facing chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A model-facing message; the assembled prompt is a sequence of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One prior turn of the conversation, as sent by the caller.
///
/// The role is kept as free text; anything other than `"user"` is replayed
/// to the model as an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// The model-facing role for this turn.
    pub fn model_role(&self) -> Role {
        if self.role.trim().eq_ignore_ascii_case("user") {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_roles_become_assistant() {
        assert_eq!(ConversationTurn::user("hi").model_role(), Role::User);
        assert_eq!(ConversationTurn::assistant("hello").model_role(), Role::Assistant);

        let odd = ConversationTurn {
            role: "tool".to_string(),
            content: "{}".to_string(),
        };
        assert_eq!(odd.model_role(), Role::Assistant);
    }

    #[test]
    fn test_turn_deserializes_any_role() {
        let turns: Vec<ConversationTurn> = serde_json::from_str(
            r#"[{"role": "user", "content": "a"}, {"role": "system", "content": "b"}]"#,
        )
        .unwrap();
        assert_eq!(turns[1].model_role(), Role::Assistant);
    }
}
