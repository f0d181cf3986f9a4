//! Interactive chat command.

use super::ask::print_stream;
use crate::assistant::Assistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::ConversationTurn;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let spinner = Output::spinner("Indexing CDP documentation...");
    let assistant = Assistant::start(settings).await;
    spinner.finish_and_clear();
    let assistant = assistant?;

    if !assistant.store().is_available() {
        Output::warning("Documentation index is unavailable; answers will not include documentation.");
    }

    let mut session = ChatSession::new(assistant.settings().chat.max_history_turns);

    println!("\n{}", style("CDP Assistant").bold().cyan());
    println!(
        "{}\n",
        style("Ask about Segment, mParticle, Lytics or Zeotap. Type 'exit' to quit, 'clear' to reset the conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        match assistant.stream_response(input, session.history()).await {
            Ok(fragments) => {
                print!("\n{} ", style("Assistant:").cyan().bold());
                let answer = print_stream(fragments).await?;
                println!("\n");
                session.record(input, answer);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    assistant.shutdown();
    Ok(())
}

/// Client-side conversation history, bounded to the most recent turns.
struct ChatSession {
    history: Vec<ConversationTurn>,
    max_turns: usize,
}

impl ChatSession {
    fn new(max_turns: usize) -> Self {
        Self {
            history: Vec::new(),
            max_turns,
        }
    }

    fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    fn clear(&mut self) {
        self.history.clear();
    }

    /// Append a completed exchange and drop the oldest turns past the limit.
    fn record(&mut self, question: &str, answer: String) {
        self.history.push(ConversationTurn::user(question));
        self.history.push(ConversationTurn::assistant(answer));

        if self.history.len() > self.max_turns {
            let excess = self.history.len() - self.max_turns;
            self.history.drain(..excess);
            debug!("Trimmed {} turns from chat history", excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_exchange() {
        let mut session = ChatSession::new(20);
        session.record("What is Zeotap?", "An identity-focused CDP.".to_string());

        assert_eq!(
            session.history(),
            &[
                ConversationTurn::user("What is Zeotap?"),
                ConversationTurn::assistant("An identity-focused CDP."),
            ]
        );
    }

    #[test]
    fn test_record_keeps_most_recent_turns() {
        let mut session = ChatSession::new(4);
        for i in 0..3 {
            session.record(&format!("q{}", i), format!("a{}", i));
        }

        let contents: Vec<&str> = session.history().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2"]);
    }

    #[test]
    fn test_clear() {
        let mut session = ChatSession::new(4);
        session.record("q", "a".to_string());
        session.clear();
        assert!(session.history().is_empty());
    }
}
