//! Rank fusion of lexical and dense result lists.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::document::DocId;
use crate::error::{ModelseekError, Result};
use crate::hybrid::normalizer::MinMaxScaler;
use crate::hybrid::types::{FusionResult, RankedHit, RetrievalSource, descending_score};

/// How two ranked lists are combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FusionMethod {
    /// Reciprocal Rank Fusion: `Σ 1 / (k + rank)`.
    Rrf {
        /// Smoothing constant.
        k: u32,
    },
    /// Weighted sum of min-max normalized scores.
    Weighted {
        /// Weight of the lexical source.
        lexical: f64,
        /// Weight of the dense source.
        dense: f64,
    },
}

impl Default for FusionMethod {
    fn default() -> Self {
        Self::rrf()
    }
}

impl FusionMethod {
    pub const DEFAULT_RRF_K: u32 = 60;

    /// RRF with `k = 60`.
    pub fn rrf() -> Self {
        FusionMethod::Rrf {
            k: Self::DEFAULT_RRF_K,
        }
    }

    /// Weighted fusion with 0.6 lexical / 0.4 dense.
    pub fn weighted() -> Self {
        FusionMethod::Weighted {
            lexical: 0.6,
            dense: 0.4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FusionMethod::Rrf { .. } => "rrf",
            FusionMethod::Weighted { .. } => "weighted",
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let FusionMethod::Weighted { lexical, dense } = *self {
            if !lexical.is_finite() || !dense.is_finite() || lexical < 0.0 || dense < 0.0 {
                return Err(ModelseekError::invalid_config(format!(
                    "fusion weights must be non-negative, got lexical={lexical} dense={dense}"
                )));
            }
            if lexical + dense <= 0.0 {
                return Err(ModelseekError::invalid_config(
                    "fusion weights must sum to a positive number",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Contribution {
    rank: usize,
    score: f64,
}

#[derive(Debug, Default)]
struct Candidate {
    lexical: Option<Contribution>,
    dense: Option<Contribution>,
}

fn keep_best(slot: &mut Option<Contribution>, hit: &RankedHit) {
    match slot {
        Some(existing) if existing.rank <= hit.rank => {}
        _ => {
            *slot = Some(Contribution {
                rank: hit.rank,
                score: hit.score,
            })
        }
    }
}

/// Merge `lexical` and `dense` into one ranked list of at most `top_k`.
///
/// A document appearing more than once in one input keeps its best rank.
/// Output is ordered by `(-combined_score, DocId)` with `final_rank`
/// reassigned from 1.
pub fn fuse(
    lexical: &[RankedHit],
    dense: &[RankedHit],
    method: FusionMethod,
    top_k: usize,
) -> Result<Vec<FusionResult>> {
    method.validate()?;
    if top_k == 0 {
        return Ok(Vec::new());
    }

    let mut candidates: BTreeMap<&DocId, Candidate> = BTreeMap::new();
    for hit in lexical {
        keep_best(&mut candidates.entry(&hit.doc_id).or_default().lexical, hit);
    }
    for hit in dense {
        keep_best(&mut candidates.entry(&hit.doc_id).or_default().dense, hit);
    }

    let score: Box<dyn Fn(&Candidate) -> f64> = match method {
        FusionMethod::Rrf { k } => {
            let k = f64::from(k);
            Box::new(move |c: &Candidate| {
                [c.lexical, c.dense]
                    .iter()
                    .flatten()
                    .map(|contribution| 1.0 / (k + contribution.rank as f64))
                    .sum()
            })
        }
        FusionMethod::Weighted {
            lexical: w_lexical,
            dense: w_dense,
        } => {
            let lexical_scores: Vec<f64> = candidates
                .values()
                .filter_map(|c| c.lexical.map(|x| x.score))
                .collect();
            let dense_scores: Vec<f64> = candidates
                .values()
                .filter_map(|c| c.dense.map(|x| x.score))
                .collect();
            let lexical_scaler = MinMaxScaler::fit(&lexical_scores);
            let dense_scaler = MinMaxScaler::fit(&dense_scores);
            Box::new(move |c: &Candidate| {
                let lexical_part = match (c.lexical, lexical_scaler) {
                    (Some(x), Some(scaler)) => scaler.scale(x.score),
                    _ => 0.0,
                };
                let dense_part = match (c.dense, dense_scaler) {
                    (Some(x), Some(scaler)) => scaler.scale(x.score),
                    _ => 0.0,
                };
                w_lexical * lexical_part + w_dense * dense_part
            })
        }
    };

    let mut results: Vec<FusionResult> = candidates
        .iter()
        .map(|(doc_id, candidate)| {
            let mut sources = BTreeSet::new();
            if candidate.lexical.is_some() {
                sources.insert(RetrievalSource::Lexical);
            }
            if candidate.dense.is_some() {
                sources.insert(RetrievalSource::Dense);
            }
            FusionResult {
                doc_id: (*doc_id).clone(),
                combined_score: score(candidate),
                sources,
                lexical_rank: candidate.lexical.map(|c| c.rank),
                dense_rank: candidate.dense.map(|c| c.rank),
                final_rank: 0,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        descending_score(a.combined_score, b.combined_score).then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    results.truncate(top_k);
    for (i, result) in results.iter_mut().enumerate() {
        result.final_rank = i + 1;
    }

    Ok(results)
}
