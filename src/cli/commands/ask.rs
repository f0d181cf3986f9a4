//! Ask command implementation.

use crate::assistant::Assistant;
use crate::chat::ResponseStream;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use futures::StreamExt;
use std::io::{self, Write};

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
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
        Output::warning("Documentation index is unavailable; answering without it.");
    }

    let fragments = assistant.stream_response(question, &[]).await?;

    println!();
    print_stream(fragments).await?;
    println!("\n");

    assistant.shutdown();
    Ok(())
}

/// Print fragments as they arrive and return the full answer.
pub(crate) async fn print_stream(mut fragments: ResponseStream) -> io::Result<String> {
    let mut stdout = io::stdout();
    let mut answer = String::new();

    while let Some(fragment) = fragments.next().await {
        print!("{}", fragment);
        stdout.flush()?;
        answer.push_str(&fragment);
    }

    Ok(answer)
}
