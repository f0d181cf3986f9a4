//! In-memory vector index.

use super::{cosine_similarity, IndexedChunk, SearchResult};
use crate::chunking::DocumentChunk;
use crate::embedding::Embedder;
use crate::error::{AssistantError, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

enum IndexState {
    Ready {
        entries: Vec<IndexedChunk>,
        dimensions: usize,
    },
    Unavailable {
        reason: String,
    },
}

/// In-memory vector index, built once and read-only afterwards.
///
/// Construction is all-or-nothing: if any chunk cannot be embedded the index
/// is marked unavailable and every query returns no results.
pub struct MemoryVectorIndex {
    embedder: Arc<dyn Embedder>,
    state: IndexState,
}

impl MemoryVectorIndex {
    /// Embed every chunk and build the index.
    #[instrument(skip(chunks, embedder), fields(chunks = chunks.len()))]
    pub async fn build(chunks: Vec<DocumentChunk>, embedder: Arc<dyn Embedder>) -> Self {
        let state = match Self::embed_all(chunks, embedder.as_ref()).await {
            Ok((entries, dimensions)) => {
                info!("Indexed {} chunks ({} dimensions)", entries.len(), dimensions);
                IndexState::Ready {
                    entries,
                    dimensions,
                }
            }
            Err(e) => {
                warn!("Document index unavailable: {}", e);
                IndexState::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        Self { embedder, state }
    }

    async fn embed_all(
        chunks: Vec<DocumentChunk>,
        embedder: &dyn Embedder,
    ) -> Result<(Vec<IndexedChunk>, usize)> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(AssistantError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(AssistantError::Embedding(format!(
                "Inconsistent embedding dimensions: {} and {}",
                dimensions,
                bad.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        Ok((entries, dimensions))
    }

    /// Whether construction succeeded.
    pub fn is_available(&self) -> bool {
        matches!(self.state, IndexState::Ready { .. })
    }

    /// Why construction failed, if it did.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            IndexState::Unavailable { reason } => Some(reason),
            IndexState::Ready { .. } => None,
        }
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        match &self.state {
            IndexState::Ready { entries, .. } => entries.len(),
            IndexState::Unavailable { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimensionality, when available.
    pub fn dimensions(&self) -> Option<usize> {
        match &self.state {
            IndexState::Ready { dimensions, .. } => Some(*dimensions),
            IndexState::Unavailable { .. } => None,
        }
    }

    /// Return the `k` chunks most similar to `query_text`.
    ///
    /// Results are ordered by descending cosine similarity; equal scores keep
    /// corpus order. An unavailable index yields no results.
    #[instrument(skip(self, query_text))]
    pub async fn query(&self, query_text: &str, k: usize) -> Result<Vec<SearchResult>> {
        let IndexState::Ready {
            entries,
            dimensions,
        } = &self.state
        else {
            debug!("Query against unavailable index");
            return Ok(Vec::new());
        };

        let k = k.min(entries.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query_text)
            .await
            .map_err(|e| AssistantError::Retrieval(format!("Query embedding failed: {}", e)))?;

        if query_embedding.len() != *dimensions {
            return Err(AssistantError::Retrieval(format!(
                "Query has {} dimensions, index has {}",
                query_embedding.len(),
                dimensions
            )));
        }

        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query_embedding, &entry.embedding),
            })
            .collect();

        // Stable sort: ties stay in corpus order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        debug!("Query matched {} chunks", results.len());
        Ok(results)
    }
}
