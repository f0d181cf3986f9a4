//! The document store: corpus, chunks and vector index.

use crate::chunking::{DocumentChunk, RecursiveSplitter};
use crate::config::Settings;
use crate::corpus::{self, CorpusDocument, Platform, CORPUS};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{MemoryVectorIndex, SearchResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Number of chunks retrieved per question unless configured otherwise.
pub const DEFAULT_K: usize = 3;

/// Result of a retrieval attempt.
///
/// Only [`RetrievalOutcome::Context`] carries text; the other variants say
/// why the answer will be generated without documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Context(String),
    NoMatches,
    /// The index failed to build at startup.
    Unavailable,
    /// Query embedding or search failed.
    Failed(String),
}

impl RetrievalOutcome {
    pub fn context(&self) -> Option<&str> {
        match self {
            RetrievalOutcome::Context(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_context(self) -> Option<String> {
        match self {
            RetrievalOutcome::Context(text) => Some(text),
            _ => None,
        }
    }

    /// Whether retrieval was degraded by a failure, as opposed to finding nothing.
    pub fn is_degraded(&self) -> bool {
        matches!(self, RetrievalOutcome::Unavailable | RetrievalOutcome::Failed(_))
    }
}

/// Owns the documentation corpus and answers "most relevant chunks" queries.
///
/// Built once; every method takes `&self` and nothing is mutated afterwards,
/// so one store can be shared across concurrent requests.
pub struct DocumentStore {
    index: MemoryVectorIndex,
    timeout: Duration,
}

impl DocumentStore {
    /// Chunk, label and index `documents`.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn build(
        documents: &[CorpusDocument],
        splitter: &RecursiveSplitter,
        embedder: Arc<dyn Embedder>,
        timeout: Duration,
    ) -> Self {
        let text = corpus::joined(documents);
        let chunks: Vec<DocumentChunk> = splitter
            .split(&text)
            .into_iter()
            .map(|chunk| {
                let label = Platform::detect(&chunk.text).map(|p| p.label());
                chunk.with_source_label(label)
            })
            .collect();

        info!(
            "Split {} documents into {} chunks (size {}, overlap {})",
            documents.len(),
            chunks.len(),
            splitter.chunk_size(),
            splitter.chunk_overlap()
        );

        let index = MemoryVectorIndex::build(chunks, embedder).await;
        if !index.is_available() {
            warn!("Answers will be generated without documentation context");
        }

        Self { index, timeout }
    }

    /// Build the store over the built-in corpus using the configured chunking.
    ///
    /// Fails only on invalid chunking settings; embedding failures leave the
    /// store in the unavailable state instead.
    pub async fn from_settings(embedder: Arc<dyn Embedder>, settings: &Settings) -> Result<Self> {
        let splitter = RecursiveSplitter::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
        )?;
        let timeout = Duration::from_secs(settings.retrieval.timeout_secs);
        Ok(Self::build(CORPUS, &splitter, embedder, timeout).await)
    }

    pub fn is_available(&self) -> bool {
        self.index.is_available()
    }

    /// Number of indexed chunks.
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn index(&self) -> &MemoryVectorIndex {
        &self.index
    }

    /// Retrieve context for `query`, reporting why none was found.
    #[instrument(skip(self, query))]
    pub async fn retrieve(&self, query: &str, k: usize) -> RetrievalOutcome {
        if !self.index.is_available() {
            return RetrievalOutcome::Unavailable;
        }

        match self.search_with_timeout(query, k).await {
            Ok(results) if results.is_empty() => RetrievalOutcome::NoMatches,
            Ok(results) => {
                debug!("Retrieved {} chunks", results.len());
                RetrievalOutcome::Context(format_context(&results))
            }
            Err(reason) => RetrievalOutcome::Failed(reason),
        }
    }

    /// The most relevant chunks for `query` joined into one string.
    ///
    /// Never fails: an unavailable index or a failed query yields `None`.
    pub async fn get_relevant_context(&self, query: &str, k: usize) -> Option<String> {
        let outcome = self.retrieve(query, k).await;
        if let RetrievalOutcome::Failed(reason) = &outcome {
            warn!("Retrieval failed: {}", reason);
        }
        outcome.into_context()
    }

    /// Scored search results for `query`; empty on any failure.
    pub async fn search(&self, query: &str, k: usize) -> Vec<SearchResult> {
        match self.search_with_timeout(query, k).await {
            Ok(results) => results,
            Err(reason) => {
                warn!("Search failed: {}", reason);
                Vec::new()
            }
        }
    }

    async fn search_with_timeout(&self, query: &str, k: usize) -> std::result::Result<Vec<SearchResult>, String> {
        match tokio::time::timeout(self.timeout, self.index.query(query, k)).await {
            Ok(Ok(results)) => Ok(results),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
        }
    }
}

/// Join retrieved chunks, each prefixed with its source label when known.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| match &r.chunk.source_label {
            Some(label) => format!("[{}]\n{}", label, r.chunk.text.trim()),
            None => r.chunk.text.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::KeywordEmbedder;

    async fn store_with(embedder: KeywordEmbedder) -> DocumentStore {
        DocumentStore::from_settings(Arc::new(embedder), &Settings::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_builds_one_labelled_chunk_per_platform() {
        let store = store_with(KeywordEmbedder::new()).await;
        assert!(store.is_available());
        assert_eq!(store.chunk_count(), 4);
    }

    #[tokio::test]
    async fn test_segment_question_retrieves_segment_docs() {
        let store = store_with(KeywordEmbedder::new()).await;

        let context = store
            .get_relevant_context("How do I set up a source in Segment?", DEFAULT_K)
            .await
            .unwrap();

        assert!(context.starts_with("[Segment Documentation]\nSegment Documentation:"));
        assert_eq!(context.matches("Documentation]").count(), 3);
    }

    #[tokio::test]
    async fn test_search_is_ranked() {
        let store = store_with(KeywordEmbedder::new()).await;
        let results = store.search("Zeotap identity resolution", 4).await;

        assert_eq!(results.len(), 4);
        assert_eq!(
            results[0].chunk.source_label.as_deref(),
            Some("Zeotap Documentation")
        );
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_unavailable_index_yields_no_context() {
        let store = store_with(KeywordEmbedder::failing_batch()).await;

        assert!(!store.is_available());
        assert_eq!(store.retrieve("Segment", 3).await, RetrievalOutcome::Unavailable);
        assert!(store.get_relevant_context("Segment", 3).await.is_none());
        assert!(store.search("Segment", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_is_swallowed() {
        let store = store_with(KeywordEmbedder::failing_query()).await;

        let outcome = store.retrieve("Segment", 3).await;
        assert!(matches!(outcome, RetrievalOutcome::Failed(_)));
        assert!(outcome.is_degraded());
        assert!(store.get_relevant_context("Segment", 3).await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_chunking_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.chunking.chunk_overlap = settings.chunking.chunk_size + 1;

        let result = DocumentStore::from_settings(Arc::new(KeywordEmbedder::new()), &settings).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_small_chunks_keep_labels_where_markers_survive() {
        let splitter = RecursiveSplitter::new(200, 40).unwrap();
        let store = DocumentStore::build(
            CORPUS,
            &splitter,
            Arc::new(KeywordEmbedder::new()),
            Duration::from_secs(5),
        )
        .await;

        let results = store.search("mParticle profile", store.chunk_count()).await;
        assert!(results.len() > 4);
        for result in &results {
            let expected = Platform::detect(&result.chunk.text).map(|p| p.label());
            assert_eq!(result.chunk.source_label, expected);
        }
    }

    #[test]
    fn test_format_context_labels() {
        let labelled = SearchResult {
            chunk: DocumentChunk::new("\n\nLytics text".to_string(), 0, 14, 0)
                .with_source_label(Some("Lytics Documentation".to_string())),
            score: 0.9,
        };
        let unlabelled = SearchResult {
            chunk: DocumentChunk::new("plain".to_string(), 14, 19, 1),
            score: 0.5,
        };

        assert_eq!(
            format_context(&[labelled, unlabelled]),
            "[Lytics Documentation]\nLytics text\n\nplain"
        );
    }
}
