//! Text chunking module
//!
//! Splits extracted document text into overlapping windows before embedding.
//! The default strategy is a linear scan over characters with fixed-size
//! windows; a semantic strategy backed by `text-splitter` is available for
//! documents where sentence boundaries matter more than uniform size.

use serde::{Deserialize, Serialize};
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::{debug, warn};

/// How text is split into chunks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Fixed-size character windows with overlap
    #[default]
    FixedWindow,
    /// Boundary-aware splitting up to the same capacity
    Semantic,
}

/// Configuration for text chunking
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Window size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Chunks shorter than this are dropped unless they are the only one
    pub min_chunk_chars: usize,
    /// Splitting strategy
    pub strategy: ChunkStrategy,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_chars: 20,
            strategy: ChunkStrategy::FixedWindow,
        }
    }
}

impl ChunkingConfig {
    /// Overlap actually used: an overlap that would stall the scan falls back to a quarter window
    pub fn effective_overlap(&self) -> usize {
        if self.chunk_overlap >= self.chunk_size {
            self.chunk_size / 4
        } else {
            self.chunk_overlap
        }
    }
}

/// A text chunk with its window position
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Index of this chunk in the document
    pub index: usize,
    /// Trimmed chunk content
    pub content: String,
    /// Start character position of the window in the source text
    pub start_char: usize,
    /// End character position (exclusive) of the window
    pub end_char: usize,
}

/// Split text into chunks for embedding
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<TextChunk> {
    let windows = match config.strategy {
        ChunkStrategy::FixedWindow => fixed_windows(text, config),
        ChunkStrategy::Semantic => semantic_windows(text, config),
    };

    let total = windows.len();
    let chunks: Vec<TextChunk> = windows
        .into_iter()
        .filter(|(content, _, _)| total == 1 || content.chars().count() >= config.min_chunk_chars)
        .enumerate()
        .map(|(index, (content, start_char, end_char))| TextChunk {
            index,
            content,
            start_char,
            end_char,
        })
        .collect();

    debug!(
        input_chars = text.chars().count(),
        chunk_count = chunks.len(),
        chunk_size = config.chunk_size,
        overlap = config.effective_overlap(),
        strategy = ?config.strategy,
        "Text chunked"
    );

    chunks
}

/// Linear scan with fixed windows: `[start, start + size)`, next start is `end - overlap`
fn fixed_windows(text: &str, config: &ChunkingConfig) -> Vec<(String, usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    let total_len = chars.len();

    if config.chunk_size == 0 {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![(trimmed.to_string(), 0, total_len)]
        };
    }

    let size = config.chunk_size;
    let overlap = config.effective_overlap();
    let mut windows = Vec::new();
    let mut start = 0usize;

    while start < total_len {
        let end = (start + size).min(total_len);
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            windows.push((trimmed.to_string(), start, end));
        }
        if end == total_len {
            break;
        }
        start = end - overlap;
    }

    windows
}

fn semantic_windows(text: &str, config: &ChunkingConfig) -> Vec<(String, usize, usize)> {
    let capacity = config.chunk_size.max(1);
    let chunk_config = match ChunkConfig::new(capacity).with_overlap(config.effective_overlap()) {
        Ok(chunk_config) => chunk_config,
        Err(e) => {
            warn!(error = %e, "Invalid semantic chunk overlap, falling back to fixed windows");
            return fixed_windows(text, config);
        }
    };
    let splitter = TextSplitter::new(chunk_config);

    splitter
        .chunk_indices(text)
        .filter_map(|(byte_offset, chunk)| {
            let trimmed = chunk.trim();
            if trimmed.is_empty() {
                return None;
            }
            let start_char = text[..byte_offset].chars().count();
            let end_char = start_char + chunk.chars().count();
            Some((trimmed.to_string(), start_char, end_char))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(size: usize, overlap: usize, min: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            min_chunk_chars: min,
            strategy: ChunkStrategy::FixedWindow,
        }
    }

    #[test]
    fn test_fixed_windows_overlap() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunk_text(text, &fixed(10, 3, 1));

        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcdefghij", "hijklmnopq", "opqrstuvwx", "vwxyz"]);
        assert_eq!(chunks[1].start_char, 7);
        assert_eq!(chunks[3].end_char, 26);
        assert_eq!(chunks.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_overlap_clamped_when_too_large() {
        let config = fixed(8, 8, 1);
        assert_eq!(config.effective_overlap(), 2);

        let chunks = chunk_text("0123456789abcdef", &config);
        assert_eq!(chunks[0].content, "01234567");
        assert_eq!(chunks[1].start_char, 6);
    }

    #[test]
    fn test_zero_size_returns_whole_text() {
        let chunks = chunk_text("  whole document  ", &fixed(0, 0, 50));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "whole document");
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", &ChunkingConfig::default()).is_empty());
        assert!(chunk_text("   ", &fixed(0, 0, 0)).is_empty());
    }

    #[test]
    fn test_short_tail_dropped_and_reindexed() {
        // windows: "aaaaaaaaaa" and "aaaa b"; the 6-char tail is below the minimum
        let text = format!("{}{}", "a".repeat(14), " b");
        let chunks = chunk_text(&text, &fixed(10, 0, 7));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_single_short_chunk_kept() {
        let chunks = chunk_text("tiny", &fixed(100, 10, 50));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "tiny");
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "é".repeat(25);
        let chunks = chunk_text(&text, &fixed(10, 2, 1));
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 10));
        assert_eq!(chunks[0].content.chars().count(), 10);
    }

    #[test]
    fn test_semantic_strategy() {
        let text = "Check the condenser water flow. Verify the setpoint. ".repeat(20);
        let config = ChunkingConfig {
            chunk_size: 120,
            chunk_overlap: 20,
            min_chunk_chars: 10,
            strategy: ChunkStrategy::Semantic,
        };
        let chunks = chunk_text(&text, &config);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 120));
    }
}
