//! Lowercasing ASCII alphanumeric tokenizer.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref TOKEN_PATTERN: Regex =
        Regex::new(r"[a-z0-9]+").expect("Token pattern should be valid");
}

/// Extracts maximal runs of ASCII letters and digits from lowercased text,
/// dropping tokens shorter than a minimum length.
///
/// # Example
///
/// ```
/// use modelseek::analysis::Tokenizer;
///
/// let tokenizer = Tokenizer::default();
/// assert_eq!(
///     tokenizer.tokenize("Image-Classification with ViT-B/16"),
///     vec!["image", "classification", "with", "vit", "16"]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    min_len: usize,
}

impl Tokenizer {
    /// Minimum token length used when none is configured.
    pub const DEFAULT_MIN_LEN: usize = 2;

    /// Create a tokenizer that discards tokens shorter than `min_len` bytes.
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    /// The configured minimum token length.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Tokenize text, preserving order and duplicates.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| t.len() >= self.min_len)
            .map(String::from)
            .collect()
    }

    /// Tokenize and deduplicate, keeping first occurrences in order.
    pub fn tokenize_unique(&self, text: &str) -> Vec<String> {
        let mut seen = ahash::AHashSet::new();
        self.tokenize(text)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_LEN)
    }
}

/// Tokenize with the default minimum length.
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default().tokenize(text)
}
