//! Configuration for the lexical index.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::Tokenizer;
use crate::document::FieldName;
use crate::error::{ModelseekError, Result};

/// Multiplicative importance weight per field.
///
/// The table must cover every [`FieldName`]; a weight is never silently
/// defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldWeights(BTreeMap<FieldName, f64>);

impl FieldWeights {
    /// Every field weighted 1.0.
    pub fn uniform() -> Self {
        FieldWeights(FieldName::ALL.iter().map(|f| (*f, 1.0)).collect())
    }

    /// Weight for a field.
    pub fn get(&self, field: FieldName) -> f64 {
        self.0
            .get(&field)
            .copied()
            .unwrap_or_else(|| field.default_weight())
    }

    /// Override the weight for a field.
    pub fn set(&mut self, field: FieldName, weight: f64) {
        self.0.insert(field, weight);
    }

    /// Builder-style override.
    pub fn with(mut self, field: FieldName, weight: f64) -> Self {
        self.set(field, weight);
        self
    }

    /// Check the table is complete and every weight is finite and
    /// non-negative.
    pub fn validate(&self) -> Result<()> {
        for field in FieldName::ALL {
            match self.0.get(&field) {
                None => {
                    return Err(ModelseekError::invalid_config(format!(
                        "missing weight for field '{field}'"
                    )));
                }
                Some(w) if !w.is_finite() || *w < 0.0 => {
                    return Err(ModelseekError::invalid_config(format!(
                        "weight for field '{field}' must be a non-negative number, got {w}"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        FieldWeights(
            FieldName::ALL
                .iter()
                .map(|f| (*f, f.default_weight()))
                .collect(),
        )
    }
}

/// Configuration for building and querying a [`LexicalIndex`].
///
/// [`LexicalIndex`]: crate::lexical::LexicalIndex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    /// BM25 term-frequency saturation.
    pub k1: f64,
    /// BM25 length normalisation.
    pub b: f64,
    /// Shortest token kept by the tokenizer.
    pub min_token_len: usize,
    /// Per-field weights.
    pub field_weights: FieldWeights,
    /// Boost added for each structured value fully contained in the query
    /// (or containing it).
    pub structured_boost: f64,
    /// Fraction of a structured value's tokens that must appear in the
    /// query for a partial boost.
    pub partial_overlap_ratio: f64,
    /// Fraction of `structured_boost` granted for a partial match.
    pub partial_boost_factor: f64,
    /// Expand query terms with domain synonyms.
    pub enable_query_expansion: bool,
    /// Apply `field_weights`; when off every field weighs 1.0.
    pub enable_field_weighting: bool,
    /// Optional JSON synonym tables replacing the built-in ones.
    pub synonyms_path: Option<PathBuf>,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            min_token_len: Tokenizer::DEFAULT_MIN_LEN,
            field_weights: FieldWeights::default(),
            structured_boost: 1.5,
            partial_overlap_ratio: 0.5,
            partial_boost_factor: 0.5,
            enable_query_expansion: true,
            enable_field_weighting: true,
            synonyms_path: None,
        }
    }
}

impl LexicalConfig {
    /// The tokenizer this configuration describes.
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.min_token_len)
    }

    /// Effective weight of a field, honouring `enable_field_weighting`.
    pub fn weight(&self, field: FieldName) -> f64 {
        if self.enable_field_weighting {
            self.field_weights.get(field)
        } else {
            1.0
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 <= 0.0 {
            return Err(ModelseekError::invalid_config(format!(
                "k1 must be positive, got {}",
                self.k1
            )));
        }
        if !self.b.is_finite() || self.b <= 0.0 || self.b > 1.0 {
            return Err(ModelseekError::invalid_config(format!(
                "b must be in (0, 1], got {}",
                self.b
            )));
        }
        if self.min_token_len == 0 {
            return Err(ModelseekError::invalid_config(
                "min_token_len must be at least 1",
            ));
        }
        if !self.structured_boost.is_finite() || self.structured_boost < 0.0 {
            return Err(ModelseekError::invalid_config(format!(
                "structured_boost must be non-negative, got {}",
                self.structured_boost
            )));
        }
        if !(self.partial_overlap_ratio > 0.0 && self.partial_overlap_ratio <= 1.0) {
            return Err(ModelseekError::invalid_config(format!(
                "partial_overlap_ratio must be in (0, 1], got {}",
                self.partial_overlap_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.partial_boost_factor) {
            return Err(ModelseekError::invalid_config(format!(
                "partial_boost_factor must be in [0, 1], got {}",
                self.partial_boost_factor
            )));
        }
        self.field_weights.validate()
    }
}
