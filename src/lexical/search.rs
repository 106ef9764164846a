//! Query execution over a [`LexicalIndex`].

use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use tracing::debug;

use crate::hybrid::types::{RankedHit, descending_score};
use crate::lexical::index::LexicalIndex;
use crate::lexical::scoring::{Bm25, StructuredMatcher};

/// A lexical hit with the evidence that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedHit {
    /// The ranked hit.
    pub hit: RankedHit,
    /// Expanded query terms that matched at least one posting.
    pub matched_terms: BTreeSet<String>,
    /// Structured-match boost included in `hit.score`.
    pub structured_boost: f64,
}

#[derive(Default)]
struct Accumulator {
    score: f64,
    boost: f64,
    matched: BTreeSet<String>,
}

impl LexicalIndex {
    /// Search the index and return the top `top_k` hits.
    ///
    /// A query with no usable tokens, a query matching nothing and any query
    /// against an empty index all return an empty list.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<RankedHit> {
        self.search_explained(query, top_k)
            .into_iter()
            .map(|explained| explained.hit)
            .collect()
    }

    /// Like [`LexicalIndex::search`], additionally reporting matched terms
    /// and the structured boost per hit.
    pub fn search_explained(&self, query: &str, top_k: usize) -> Vec<ExplainedHit> {
        if top_k == 0 || self.is_empty() {
            return Vec::new();
        }
        let tokens = self.tokenizer.tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let expanded = self.expander.expand(&tokens);
        let bm25 = Bm25::new(self.config.k1, self.config.b);
        let avgdl = self.stats.average_document_length;

        let mut accumulators: AHashMap<usize, Accumulator> = AHashMap::new();
        for term in &expanded {
            let Some(idf) = self.stats.idf(term) else {
                continue;
            };
            for posting in self.postings(term) {
                let doc_len = self.doc_lengths[posting.doc];
                let score = bm25.term_score(idf, posting.term_frequency, doc_len, avgdl)
                    * self.config.weight(posting.field);

                let acc = accumulators.entry(posting.doc).or_default();
                acc.score += score;
                acc.matched.insert(term.clone());
            }
        }

        // Boost against the raw query only; expanded terms would over-match.
        let query_tokens: AHashSet<String> = tokens.into_iter().collect();
        let matcher = StructuredMatcher {
            boost: self.config.structured_boost,
            overlap_ratio: self.config.partial_overlap_ratio,
            partial_factor: self.config.partial_boost_factor,
        };
        for (doc, acc) in accumulators.iter_mut() {
            let boost: f64 = self.structured[*doc]
                .iter()
                .map(|value| matcher.score(&value.tokens, &query_tokens))
                .sum();
            acc.boost = boost;
            acc.score += boost;
        }

        let candidates = accumulators.len();
        let mut scored: Vec<(usize, Accumulator)> = accumulators.into_iter().collect();
        scored.sort_by(|a, b| {
            descending_score(a.1.score, b.1.score)
                .then_with(|| self.doc_ids[a.0].cmp(&self.doc_ids[b.0]))
        });
        scored.truncate(top_k);

        debug!(
            query,
            expanded_terms = expanded.len(),
            candidates,
            returned = scored.len(),
            "Lexical search"
        );

        scored
            .into_iter()
            .enumerate()
            .map(|(i, (doc, acc))| ExplainedHit {
                hit: RankedHit {
                    doc_id: self.doc_ids[doc].clone(),
                    score: acc.score,
                    rank: i + 1,
                },
                matched_terms: acc.matched,
                structured_boost: acc.boost,
            })
            .collect()
    }
}
