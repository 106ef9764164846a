//! Types and data structures for ranked retrieval.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocId;
use crate::routing::{RoutingDecision, Strategy};

/// A single hit produced by one retrieval strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    /// Document ID.
    pub doc_id: DocId,
    /// Strategy-specific score (BM25 or cosine similarity).
    pub score: f64,
    /// 1-based rank within the strategy's list.
    pub rank: usize,
}

impl RankedHit {
    /// Create a new hit.
    pub fn new<I: Into<DocId>>(doc_id: I, score: f64, rank: usize) -> Self {
        Self {
            doc_id: doc_id.into(),
            score,
            rank,
        }
    }

    /// Order scored documents by `(-score, DocId)`, keep the first `top_k`
    /// and assign 1-based ranks.
    pub fn rank_scores(mut scored: Vec<(DocId, f64)>, top_k: usize) -> Vec<RankedHit> {
        scored.sort_by(|a, b| descending_score(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(top_k);
        scored
            .into_iter()
            .enumerate()
            .map(|(i, (doc_id, score))| RankedHit {
                doc_id,
                score,
                rank: i + 1,
            })
            .collect()
    }
}

/// Total order placing higher scores first.
pub(crate) fn descending_score(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Retrieval strategy that contributed a document to a fused list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    /// BM25 lexical index.
    Lexical,
    /// Dense embedding index.
    Dense,
}

impl fmt::Display for RetrievalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalSource::Lexical => f.write_str("lexical"),
            RetrievalSource::Dense => f.write_str("dense"),
        }
    }
}

/// A fused result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    /// Document ID.
    pub doc_id: DocId,
    /// Combined score under the fusion method used.
    pub combined_score: f64,
    /// Sources whose lists contained this document.
    pub sources: BTreeSet<RetrievalSource>,
    /// Rank in the lexical list, if present there.
    pub lexical_rank: Option<usize>,
    /// Rank in the dense list, if present there.
    pub dense_rank: Option<usize>,
    /// 1-based rank over the fused order.
    pub final_rank: usize,
}

impl FusionResult {
    /// Whether both sources returned this document.
    pub fn is_hybrid(&self) -> bool {
        self.sources.len() == 2
    }

    /// Wrap one strategy's hits unchanged, for routes that skip fusion.
    pub fn from_single_source(hits: Vec<RankedHit>, source: RetrievalSource) -> Vec<FusionResult> {
        hits.into_iter()
            .map(|hit| FusionResult {
                combined_score: hit.score,
                sources: BTreeSet::from([source]),
                lexical_rank: (source == RetrievalSource::Lexical).then_some(hit.rank),
                dense_rank: (source == RetrievalSource::Dense).then_some(hit.rank),
                final_rank: hit.rank,
                doc_id: hit.doc_id,
            })
            .collect()
    }
}

/// Outcome of one orchestrated search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// The query as received.
    pub query: String,
    /// Routing decision taken for this query.
    pub decision: RoutingDecision,
    /// Strategy actually executed; differs from the decision when the
    /// engine had to degrade (e.g. no dense index loaded).
    pub executed: Strategy,
    /// True when the caller should hand the query to the heavy pipeline.
    pub deferred: bool,
    /// Ranked results, possibly empty.
    pub results: Vec<FusionResult>,
    /// Wall-clock processing time in milliseconds.
    pub query_time_ms: u64,
}

impl SearchResponse {
    /// Get the number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if results are empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Get the best result.
    pub fn best(&self) -> Option<&FusionResult> {
        self.results.first()
    }
}
