//! BM25 and structured-match scoring primitives.

use ahash::AHashSet;

/// Smoothed BM25 inverse document frequency.
///
/// `ln((N - df + 0.5) / (df + 0.5) + 1)`, which is never negative for
/// `df <= N`.
pub fn idf(doc_count: usize, doc_freq: usize) -> f64 {
    let n = doc_count as f64;
    let df = doc_freq as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// BM25 term scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25 {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalisation.
    pub b: f64,
}

impl Bm25 {
    /// Create a scorer.
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// Score one posting.
    ///
    /// A zero `avgdl` (empty index) is treated as no length normalisation.
    pub fn term_score(&self, idf: f64, tf: u32, doc_len: u32, avgdl: f64) -> f64 {
        let tf = tf as f64;
        let length_ratio = if avgdl > 0.0 {
            doc_len as f64 / avgdl
        } else {
            0.0
        };
        let denom = tf + self.k1 * (1.0 - self.b + self.b * length_ratio);
        idf * (tf * (self.k1 + 1.0)) / denom
    }
}

/// Exact/partial match boost for structured field values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuredMatcher {
    /// Boost for full containment.
    pub boost: f64,
    /// Overlap fraction needed for a partial match.
    pub overlap_ratio: f64,
    /// Fraction of `boost` granted on a partial match.
    pub partial_factor: f64,
}

impl StructuredMatcher {
    /// Boost earned by one structured value against the raw query tokens.
    ///
    /// Full boost when either token set contains the other, partial boost
    /// when at least `overlap_ratio` of the value's tokens occur in the
    /// query, nothing otherwise. Values without tokens never match.
    pub fn score(&self, value_tokens: &AHashSet<String>, query_tokens: &AHashSet<String>) -> f64 {
        if value_tokens.is_empty() || query_tokens.is_empty() {
            return 0.0;
        }
        if value_tokens.is_subset(query_tokens) || query_tokens.is_subset(value_tokens) {
            return self.boost;
        }
        let overlap = value_tokens.intersection(query_tokens).count() as f64;
        if overlap > 0.0 && overlap >= value_tokens.len() as f64 * self.overlap_ratio {
            self.boost * self.partial_factor
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> AHashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_idf_values() {
        // df == N still yields a positive weight thanks to the +1 smoothing
        assert!(idf(3, 3) > 0.0);
        assert!(idf(3, 1) > idf(3, 2));
        assert!((idf(1, 1) - (1.0f64 / 3.0 + 1.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_term_score_saturates() {
        let bm25 = Bm25::new(1.5, 0.75);
        let one = bm25.term_score(1.0, 1, 10, 10.0);
        let ten = bm25.term_score(1.0, 10, 10, 10.0);
        assert!(ten > one);
        assert!(ten < 1.0 * (1.5 + 1.0));
    }

    #[test]
    fn test_term_score_length_normalisation() {
        let bm25 = Bm25::new(1.5, 0.75);
        let short = bm25.term_score(1.0, 1, 5, 10.0);
        let long = bm25.term_score(1.0, 1, 20, 10.0);
        assert!(short > long);
    }

    #[test]
    fn test_term_score_zero_avgdl() {
        let bm25 = Bm25::new(1.5, 0.75);
        assert!(bm25.term_score(1.0, 1, 0, 0.0).is_finite());
    }

    #[test]
    fn test_structured_match() {
        let matcher = StructuredMatcher {
            boost: 1.5,
            overlap_ratio: 0.5,
            partial_factor: 0.5,
        };
        let query = set(&["pytorch", "image", "classification"]);

        assert_eq!(matcher.score(&set(&["pytorch"]), &query), 1.5);
        assert_eq!(
            matcher.score(&set(&["image", "classification"]), &query),
            1.5
        );
        // query contained in value
        assert_eq!(
            matcher.score(&set(&["pytorch", "image", "classification", "models"]), &set(&["pytorch"])),
            1.5
        );
        // half of the value's tokens
        assert_eq!(
            matcher.score(&set(&["image", "segmentation"]), &query),
            0.75
        );
        assert_eq!(
            matcher.score(&set(&["object", "detection", "image"]), &query),
            0.0
        );
        assert_eq!(matcher.score(&set(&[]), &query), 0.0);
    }
}
