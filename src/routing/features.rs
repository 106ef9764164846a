//! Query feature detection.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::Tokenizer;

/// A linguistic signal that a query needs more than keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFeature {
    /// count / sum / average / "how many".
    Aggregation,
    /// "group by", "per", "each".
    Grouping,
    /// compare / versus / "more than".
    Comparison,
    /// not / without / except.
    Negation,
    /// Clause-joining conjunctions and relative pronouns.
    MultiClause,
    /// Numeric literals or bounds such as "at least".
    NumericFilter,
    /// Long natural-language descriptions.
    Descriptive,
}

impl QueryFeature {
    pub const ALL: [QueryFeature; 7] = [
        QueryFeature::Aggregation,
        QueryFeature::Grouping,
        QueryFeature::Comparison,
        QueryFeature::Negation,
        QueryFeature::MultiClause,
        QueryFeature::NumericFilter,
        QueryFeature::Descriptive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryFeature::Aggregation => "aggregation",
            QueryFeature::Grouping => "grouping",
            QueryFeature::Comparison => "comparison",
            QueryFeature::Negation => "negation",
            QueryFeature::MultiClause => "multi_clause",
            QueryFeature::NumericFilter => "numeric_filter",
            QueryFeature::Descriptive => "descriptive",
        }
    }

    /// Contribution to the complexity score when no weight is configured.
    pub fn default_weight(&self) -> f64 {
        match self {
            QueryFeature::Aggregation => 0.35,
            QueryFeature::Grouping => 0.25,
            QueryFeature::Comparison => 0.25,
            QueryFeature::Negation => 0.2,
            QueryFeature::MultiClause => 0.15,
            QueryFeature::NumericFilter => 0.15,
            QueryFeature::Descriptive => 0.3,
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            QueryFeature::Aggregation => &[
                "count", "counts", "sum", "total", "average", "avg", "mean", "median",
                "maximum", "minimum", "max", "min", "aggregate", "distribution", "statistics",
            ],
            QueryFeature::Grouping => &["by", "per", "each", "grouped", "breakdown"],
            QueryFeature::Comparison => &[
                "compare", "comparison", "versus", "vs", "than", "between", "difference",
                "better", "worse", "higher", "lower", "highest", "lowest", "most", "least",
            ],
            QueryFeature::Negation => &[
                "not", "no", "without", "except", "excluding", "exclude", "non", "neither",
                "nor", "never",
            ],
            QueryFeature::MultiClause => &[
                "and", "or", "but", "while", "whereas", "where", "which", "whose", "that",
            ],
            QueryFeature::NumericFilter => &["over", "under", "above", "below", "exceeding"],
            QueryFeature::Descriptive => &[],
        }
    }

    fn phrases(&self) -> &'static [&'static str] {
        match self {
            QueryFeature::Aggregation => &["how many", "number of"],
            QueryFeature::Grouping => &["group by", "grouped by"],
            QueryFeature::Comparison => &["more than", "less than", "fewer than"],
            QueryFeature::NumericFilter => &["at least", "at most"],
            _ => &[],
        }
    }
}

impl fmt::Display for QueryFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detects [`QueryFeature`]s in query text.
#[derive(Debug, Clone)]
pub struct FeatureDetector {
    tokenizer: Tokenizer,
    descriptive_min_tokens: usize,
}

impl Default for FeatureDetector {
    fn default() -> Self {
        Self::new(6)
    }
}

impl FeatureDetector {
    /// Queries with at least `descriptive_min_tokens` tokens count as
    /// descriptive.
    pub fn new(descriptive_min_tokens: usize) -> Self {
        Self {
            // Keep one-character tokens so "5" or "a" are seen.
            tokenizer: Tokenizer::new(1),
            descriptive_min_tokens,
        }
    }

    /// Detected features with the words that triggered them.
    pub fn detect(&self, query: &str) -> BTreeMap<QueryFeature, Vec<String>> {
        let tokens = self.tokenizer.tokenize(query);
        let padded = format!(" {} ", tokens.join(" "));
        let mut found: BTreeMap<QueryFeature, Vec<String>> = BTreeMap::new();

        for feature in QueryFeature::ALL {
            let mut evidence: Vec<String> = feature
                .phrases()
                .iter()
                .filter(|phrase| padded.contains(&format!(" {phrase} ")))
                .map(|phrase| phrase.to_string())
                .collect();
            evidence.extend(
                tokens
                    .iter()
                    .filter(|token| feature.keywords().contains(&token.as_str()))
                    .cloned(),
            );
            if !evidence.is_empty() {
                evidence.dedup();
                found.insert(feature, evidence);
            }
        }

        if tokens.iter().any(|t| t.bytes().all(|b| b.is_ascii_digit())) {
            found
                .entry(QueryFeature::NumericFilter)
                .or_default()
                .extend(
                    tokens
                        .iter()
                        .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
                        .cloned(),
                );
        }

        if tokens.len() >= self.descriptive_min_tokens {
            found
                .entry(QueryFeature::Descriptive)
                .or_default()
                .push(format!("{} tokens", tokens.len()));
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_and_grouping() {
        let found = FeatureDetector::default().detect("count models by task");
        assert_eq!(found[&QueryFeature::Aggregation], vec!["count"]);
        assert_eq!(found[&QueryFeature::Grouping], vec!["by"]);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_phrases() {
        let found = FeatureDetector::default().detect("How many models have at least 5 likes?");
        assert!(found[&QueryFeature::Aggregation].contains(&"how many".to_string()));
        assert!(found[&QueryFeature::NumericFilter].contains(&"at least".to_string()));
        assert!(found[&QueryFeature::NumericFilter].contains(&"5".to_string()));
        assert!(found.contains_key(&QueryFeature::Descriptive));
    }

    #[test]
    fn test_phrase_requires_word_boundaries() {
        // "at most" must not fire inside "what mostly".
        let found = FeatureDetector::default().detect("what mostly");
        assert!(!found.contains_key(&QueryFeature::NumericFilter));
    }

    #[test]
    fn test_negation_and_comparison() {
        let found = FeatureDetector::default().detect("bert vs roberta without tensorflow");
        assert!(found.contains_key(&QueryFeature::Comparison));
        assert!(found.contains_key(&QueryFeature::Negation));
    }

    #[test]
    fn test_plain_keywords() {
        assert!(FeatureDetector::default().detect("pytorch vision").is_empty());
        assert!(FeatureDetector::default().detect("").is_empty());
    }
}
