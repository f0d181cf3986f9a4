//! Prompt templates for the assistant.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").unwrap())
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub chat: ChatPrompts,
    /// Per-category guidance appended to the system prompt.
    pub guidance: GuidancePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the chat pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub system: String,
    /// Template for the retrieved-context message; `{{context}}` is replaced.
    pub context: String,
    /// Sent to the user when the completion stream fails.
    pub apology: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful CDP (Customer Data Platform) support agent. You can answer questions about Segment, mParticle, Lytics, and Zeotap.

Guidelines:
- Focus on providing clear, step-by-step instructions for how-to questions
- Base your answers on official documentation and the documentation excerpts you are given
- If a question is not related to these CDPs, politely explain that you can only help with CDP-related queries
- If the documentation does not cover the question, say so instead of guessing"#
                .to_string(),

            context: "Relevant documentation:\n{{context}}".to_string(),

            apology: "I apologize, but I encountered an error while generating a response. Please try again.".to_string(),
        }
    }
}

/// Guidance lines keyed by question category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidancePrompts {
    pub how_to: String,
    pub comparison: String,
    pub troubleshooting: String,
    pub general: String,
}

impl Default for GuidancePrompts {
    fn default() -> Self {
        Self {
            how_to: "The user is asking how to do something. Answer with numbered steps and name the screens or settings involved.".to_string(),
            comparison: "The user is comparing platforms. Contrast them point by point and only state differences the documentation supports.".to_string(),
            troubleshooting: "The user is troubleshooting a problem. List the most likely causes first, then how to verify and fix each one.".to_string(),
            general: "Give a concise, accurate answer.".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = super::Settings::expand_path(dir);

            let chat_path = custom_path.join("chat.toml");
            if chat_path.exists() {
                let content = std::fs::read_to_string(&chat_path)?;
                prompts.chat = toml::from_str(&content)?;
            }

            let guidance_path = custom_path.join("guidance.toml");
            if guidance_path.exists() {
                let content = std::fs::read_to_string(&guidance_path)?;
                prompts.guidance = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass, so `{{...}}` inside a
    /// substituted value is left as is. Unknown placeholders are kept.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        placeholder()
            .replace_all(template, |caps: &regex::Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.chat.system.contains("Segment, mParticle, Lytics, and Zeotap"));
        assert!(prompts.chat.context.contains("{{context}}"));
        assert!(!prompts.chat.apology.is_empty());
    }

    #[test]
    fn test_render_template() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "Segment docs".to_string());

        let result = Prompts::render("Relevant documentation:\n{{context}}", &vars);
        assert_eq!(result, "Relevant documentation:\nSegment docs");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "see {{company}} docs".to_string());
        vars.insert("company".to_string(), "Acme".to_string());

        let result = Prompts::render("{{company}}: {{context}} {{missing}}", &vars);
        assert_eq!(result, "Acme: see {{company}} docs {{missing}}");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("team".to_string(), "Growth".to_string());
        prompts.variables.insert("context".to_string(), "stale".to_string());

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "fresh".to_string());

        let result = prompts.render_with_custom("{{team}}: {{context}}", &vars);
        assert_eq!(result, "Growth: fresh");
    }

    #[test]
    fn test_load_custom_chat_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("chat.toml"),
            "system = \"Only talk about Segment.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.chat.system, "Only talk about Segment.");
        // Fields absent from the file keep their defaults.
        assert!(prompts.chat.context.contains("{{context}}"));
        assert!(!prompts.guidance.how_to.is_empty());
    }
}
