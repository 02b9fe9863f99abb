//! Fixed-size text chunking.
//!
//! Lengths are counted in `char`s so a boundary never falls inside a
//! multi-byte UTF-8 sequence.

use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};

/// A contiguous slice of the source text and its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in the chunk sequence.
    pub index: usize,
    /// Text content of this chunk.
    pub text: String,
}

/// Length of `text` as used by all size thresholds.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into consecutive chunks of `size` characters.
///
/// The last chunk holds the remainder. Empty text yields no chunks.
pub fn chunk(text: &str, size: usize) -> Result<Vec<Chunk>> {
    if size == 0 {
        return Err(RecapError::InvalidInput(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    let chars: Vec<char> = text.chars().collect();
    Ok(chars
        .chunks(size)
        .enumerate()
        .map(|(index, window)| Chunk {
            index,
            text: window.iter().collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunk("", 10).unwrap().is_empty());
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(matches!(chunk("abc", 0), Err(RecapError::InvalidInput(_))));
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk("hello", 5).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], Chunk { index: 0, text: "hello".to_string() });

        let chunks = chunk("hi", 100).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hi");
    }

    #[test]
    fn test_remainder_goes_last() {
        let text = "x".repeat(5000);
        let chunks = chunk(&text, 1200).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(|c| char_len(&c.text)).collect();
        assert_eq!(sizes, vec![1200, 1200, 1200, 1200, 200]);
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_concatenation_reconstructs_source() {
        let samples = [
            "The quick brown fox jumps over the lazy dog.",
            "Résumé: café, naïve, déjà vu. Ünïcödé everywhere!",
            "日本語のテキストを分割します。韓国語: 안녕하세요",
            "emoji 🎬🔑💡📝🚀 mixed with text",
            "a",
        ];
        for text in samples {
            for size in 1..=17 {
                let chunks = chunk(text, size).unwrap();
                assert_eq!(rejoin(&chunks), text, "size {}", size);
                let expected = char_len(text).div_ceil(size);
                assert_eq!(chunks.len(), expected);
                for c in &chunks[..chunks.len() - 1] {
                    assert_eq!(char_len(&c.text), size);
                }
                let last = char_len(&chunks[chunks.len() - 1].text);
                assert!((1..=size).contains(&last));
            }
        }
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        assert_eq!(chunk(&text, 37).unwrap(), chunk(&text, 37).unwrap());
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        assert_eq!(char_len("héllo"), 5);
        assert_eq!(char_len("🎬"), 1);
    }
}
