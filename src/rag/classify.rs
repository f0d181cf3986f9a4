//! Keyword classification of user questions.

use crate::config::GuidancePrompts;
use regex::Regex;
use std::sync::OnceLock;

/// What kind of question the user is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionCategory {
    HowTo,
    Comparison,
    Troubleshooting,
    General,
}

struct Patterns {
    comparison: Regex,
    troubleshooting: Regex,
    how_to: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        comparison: Regex::new(
            r"(?i)\b(compare|compared|comparing|comparison|versus|vs|difference|differences|differ|better than|which is better)\b",
        )
        .unwrap(),
        troubleshooting: Regex::new(
            r"(?i)\b(error|errors|fail|fails|failed|failing|not working|broken|issue|issues|problem|problems|troubleshoot|debug|missing|wrong)\b",
        )
        .unwrap(),
        how_to: Regex::new(
            r"(?i)\b(how (do|can|should|to)|steps?|set ?up|configure|create|build|integrate|implement|enable|connect|guide)\b",
        )
        .unwrap(),
    })
}

impl QuestionCategory {
    /// Classify a message by keyword.
    ///
    /// Comparison wins over troubleshooting, which wins over how-to.
    pub fn classify(message: &str) -> Self {
        let p = patterns();
        if p.comparison.is_match(message) {
            QuestionCategory::Comparison
        } else if p.troubleshooting.is_match(message) {
            QuestionCategory::Troubleshooting
        } else if p.how_to.is_match(message) {
            QuestionCategory::HowTo
        } else {
            QuestionCategory::General
        }
    }

    /// The guidance line for this category.
    pub fn guidance<'a>(&self, prompts: &'a GuidancePrompts) -> &'a str {
        match self {
            QuestionCategory::HowTo => &prompts.how_to,
            QuestionCategory::Comparison => &prompts.comparison,
            QuestionCategory::Troubleshooting => &prompts.troubleshooting,
            QuestionCategory::General => &prompts.general,
        }
    }
}

impl std::fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionCategory::HowTo => write!(f, "how-to"),
            QuestionCategory::Comparison => write!(f, "comparison"),
            QuestionCategory::Troubleshooting => write!(f, "troubleshooting"),
            QuestionCategory::General => write!(f, "general"),
        }
    }
}
