//! Routing decision types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Retrieval strategy selected for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// BM25 only.
    LexicalOnly,
    /// BM25 and dense retrieval merged by rank fusion.
    DenseFusion,
    /// Hand the query to the external generative pipeline.
    Defer,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::LexicalOnly => "lexical_only",
            Strategy::DenseFusion => "dense_fusion",
            Strategy::Defer => "defer",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of routing one query, with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub strategy: Strategy,
    /// Weighted feature sum clamped to `[0, 1]`.
    pub complexity_score: f64,
    /// Names of the features detected in the query.
    pub matched_features: BTreeSet<String>,
}

impl RoutingDecision {
    /// A decision for a query with no detected features.
    pub fn lexical_only() -> Self {
        Self {
            strategy: Strategy::LexicalOnly,
            complexity_score: 0.0,
            matched_features: BTreeSet::new(),
        }
    }
}
