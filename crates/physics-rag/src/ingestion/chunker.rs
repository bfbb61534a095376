//! Fixed-window text chunking with overlap

use std::ops::Range;

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Text chunker with configurable size and overlap.
///
/// Windows are measured in bytes and snapped to UTF-8 character boundaries,
/// so multi-byte text is never split inside a code point.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Maximum chunk size in bytes
    chunk_size: usize,
    /// Bytes repeated at the start of the next chunk
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than 0".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Untrimmed byte windows covering `text` from start to end
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        let len = text.len();
        let step = self.chunk_size - self.overlap;
        let mut spans = Vec::new();
        let mut start = 0usize;

        while start < len {
            let mut end = floor_char_boundary(text, (start + self.chunk_size).min(len));
            if end <= start {
                // A single character wider than the window
                end = ceil_char_boundary(text, start + 1);
            }
            spans.push(start..end);

            if end == len {
                break;
            }

            let mut next = floor_char_boundary(text, start + step);
            if next <= start {
                next = ceil_char_boundary(text, start + 1);
            }
            start = next;
        }

        spans
    }

    /// Split `text` into trimmed chunk texts; blank windows are dropped
    pub fn split(&self, text: &str) -> Vec<String> {
        self.spans(text)
            .into_iter()
            .map(|span| text[span].trim())
            .filter(|chunk| !chunk.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Chunk a source file's text into indexed chunks
    pub fn chunk(&self, text: &str, source_name: &str) -> Vec<Chunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(text, source_name, index))
            .collect()
    }
}

/// Largest char boundary `<= index`
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary `>= index`
fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
