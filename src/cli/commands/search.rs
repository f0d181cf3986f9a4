//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::rag::DocumentStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(query: &str, k: usize, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding));

    let spinner = Output::spinner("Indexing CDP documentation...");
    let store = DocumentStore::from_settings(embedder, &settings).await;
    spinner.finish_and_clear();
    let store = store?;

    if let Some(reason) = store.index().unavailable_reason() {
        Output::error(&format!("Documentation index is unavailable: {}", reason));
        return Err(anyhow::anyhow!("index unavailable"));
    }

    let spinner = Output::spinner("Searching...");
    let results = store.search(query, k).await;
    spinner.finish_and_clear();

    if results.is_empty() {
        Output::warning("No results found matching your query.");
    } else {
        Output::success(&format!("Found {} results", results.len()));

        for (rank, result) in results.iter().enumerate() {
            Output::search_result(
                rank + 1,
                result.chunk.source_label.as_deref(),
                result.score,
                &result.chunk.text,
            );
        }
    }

    Ok(())
}
