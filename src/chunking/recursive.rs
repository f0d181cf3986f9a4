//! Recursive character splitter.
//!
//! Cuts text at the highest-priority separator present (paragraphs, then
//! lines, then spaces, then single characters), merges the resulting pieces
//! into chunks of at most `chunk_size` characters, and recurses into pieces
//! that are still too large using the next separators.

use super::DocumentChunk;
use crate::error::{AssistantError, Result};
use std::collections::VecDeque;
use std::ops::Range;

/// Separators in priority order. The empty separator splits into characters.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Splits text into overlapping chunks of bounded size.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Create a splitter.
    ///
    /// `chunk_size` and `chunk_overlap` are measured in characters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AssistantError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap > chunk_size {
            return Err(AssistantError::InvalidInput(format!(
                "chunk_overlap ({}) must not exceed chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the separator list.
    ///
    /// Without a trailing empty separator, a piece that contains none of the
    /// separators is emitted whole even if it exceeds `chunk_size`.
    pub fn with_separators<S: Into<String>>(mut self, separators: Vec<S>) -> Self {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into chunks.
    pub fn split(&self, text: &str) -> Vec<DocumentChunk> {
        let mut spans = Vec::new();
        if !text.is_empty() {
            self.split_span(text, 0..text.len(), &self.separators, &mut spans);
        }

        spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| {
                DocumentChunk::new(text[span.clone()].to_string(), span.start, span.end, index)
            })
            .collect()
    }

    fn split_span(
        &self,
        text: &str,
        span: Range<usize>,
        separators: &[String],
        out: &mut Vec<Range<usize>>,
    ) {
        let segment = &text[span.clone()];

        let Some(position) = separators
            .iter()
            .position(|s| s.is_empty() || segment.contains(s.as_str()))
        else {
            out.push(span);
            return;
        };
        let separator = separators[position].as_str();
        let level = &separators[position..];
        let remaining = &separators[position + 1..];

        let mut mergeable: Vec<Range<usize>> = Vec::new();

        for piece in split_keeping_separator(segment, separator) {
            let piece = (piece.start + span.start)..(piece.end + span.start);

            if char_len(text, &piece) <= self.chunk_size {
                mergeable.push(piece);
                continue;
            }

            if !mergeable.is_empty() {
                self.merge(text, &mergeable, level, out);
                mergeable.clear();
            }

            if remaining.is_empty() {
                out.push(piece);
            } else {
                self.split_span(text, piece, remaining, out);
            }
        }

        if !mergeable.is_empty() {
            self.merge(text, &mergeable, level, out);
        }
    }

    /// Greedily merge contiguous pieces (each within `chunk_size`) into chunks.
    ///
    /// When the pieces continue right where the last emitted chunk ends, the
    /// first chunk is seeded with a tail of that chunk so overlap carries
    /// across recursion boundaries.
    fn merge(
        &self,
        text: &str,
        pieces: &[Range<usize>],
        separators: &[String],
        out: &mut Vec<Range<usize>>,
    ) {
        let mut window: VecDeque<(Range<usize>, usize)> = match (out.last(), pieces.first()) {
            (Some(previous), Some(first)) if previous.end == first.start => {
                self.overlap_seed(text, previous, separators)
            }
            _ => VecDeque::new(),
        };
        let mut total: usize = window.iter().map(|(_, len)| len).sum();
        // Whether the window holds anything not yet emitted.
        let mut fresh = false;

        for piece in pieces {
            let len = char_len(text, piece);

            if total + len > self.chunk_size {
                if fresh {
                    out.push(window_span(&window));
                    fresh = false;

                    // Keep the shortest tail that still covers the overlap...
                    while let Some((_, front_len)) = window.front() {
                        if total - front_len >= self.chunk_overlap {
                            total -= front_len;
                            window.pop_front();
                        } else {
                            break;
                        }
                    }
                }

                // ...unless the next piece would not fit next to it.
                while total + len > self.chunk_size {
                    match window.pop_front() {
                        Some((_, front_len)) => total -= front_len,
                        None => break,
                    }
                }
            }

            window.push_back((piece.clone(), len));
            total += len;
            fresh = true;
        }

        if fresh {
            out.push(window_span(&window));
        }
    }

    /// The shortest tail of `previous`, cut at the coarsest separator that
    /// allows it, covering at least `chunk_overlap` characters.
    ///
    /// Falls back to the whole chunk when no proper tail is long enough.
    fn overlap_seed(
        &self,
        text: &str,
        previous: &Range<usize>,
        separators: &[String],
    ) -> VecDeque<(Range<usize>, usize)> {
        if self.chunk_overlap == 0 {
            return VecDeque::new();
        }

        let segment = &text[previous.clone()];
        for separator in separators {
            let pieces = split_keeping_separator(segment, separator);
            if pieces.len() < 2 {
                continue;
            }

            let mut tail = VecDeque::new();
            let mut total = 0;
            for piece in pieces.iter().rev() {
                let piece = (piece.start + previous.start)..(piece.end + previous.start);
                let len = char_len(text, &piece);
                tail.push_front((piece, len));
                total += len;
                if total >= self.chunk_overlap {
                    break;
                }
            }

            if total >= self.chunk_overlap && tail.len() < pieces.len() {
                return tail;
            }
        }

        VecDeque::from([(previous.clone(), char_len(text, previous))])
    }
}

/// Cut `segment` before every occurrence of `separator`, so each piece after
/// the first starts with the separator.
///
/// Whitespace-only pieces are glued to the following piece (or the preceding
/// one at the end), so a run of separators never becomes a piece of its own.
/// The empty separator cuts between characters.
fn split_keeping_separator(segment: &str, separator: &str) -> Vec<Range<usize>> {
    if separator.is_empty() {
        return segment
            .char_indices()
            .map(|(i, c)| i..i + c.len_utf8())
            .collect();
    }

    let mut pieces: Vec<Range<usize>> = Vec::new();
    let mut start = 0;
    for (idx, _) in segment.match_indices(separator) {
        if idx > start && !segment[start..idx].trim().is_empty() {
            pieces.push(start..idx);
            start = idx;
        }
    }
    if start < segment.len() {
        match pieces.last_mut() {
            Some(last) if segment[start..].trim().is_empty() => last.end = segment.len(),
            _ => pieces.push(start..segment.len()),
        }
    }
    pieces
}

fn char_len(text: &str, span: &Range<usize>) -> usize {
    text[span.clone()].chars().count()
}

fn window_span(window: &VecDeque<(Range<usize>, usize)>) -> Range<usize> {
    let start = window.front().map(|(r, _)| r.start).unwrap_or(0);
    let end = window.back().map(|(r, _)| r.end).unwrap_or(start);
    start..end
}
