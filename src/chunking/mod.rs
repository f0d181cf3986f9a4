//! Text chunking for the documentation corpus.
//!
//! Chunks are contiguous slices of the source text. Consecutive chunks may
//! overlap, but there are never gaps between them.

mod recursive;

pub use recursive::{RecursiveSplitter, DEFAULT_SEPARATORS};

/// A bounded-size slice of source text used as the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Text content of this chunk.
    pub text: String,
    /// Human-readable label of the document this chunk came from.
    pub source_label: Option<String>,
    /// Byte offset of the chunk in the chunked text.
    pub start: usize,
    /// Byte offset one past the end of the chunk.
    pub end: usize,
    /// Position of this chunk in the chunk sequence.
    pub index: usize,
}

impl DocumentChunk {
    /// Create an unlabelled chunk.
    pub fn new(text: String, start: usize, end: usize, index: usize) -> Self {
        Self {
            text,
            source_label: None,
            start,
            end,
            index,
        }
    }

    /// Attach a source label.
    pub fn with_source_label(mut self, label: Option<String>) -> Self {
        self.source_label = label;
        self
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Number of bytes this chunk shares with the chunk before it.
    pub fn overlap_with(&self, previous: &DocumentChunk) -> usize {
        previous.end.saturating_sub(self.start)
    }
}
