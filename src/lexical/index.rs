//! Inverted index construction.

use std::sync::Arc;
use std::time::Instant;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use tracing::info;

use crate::analysis::{
    DomainQueryExpander, IdentityExpander, QueryExpander, SynonymTables, Tokenizer,
};
use crate::document::{DocId, Document, FieldName};
use crate::error::{ModelseekError, Result};
use crate::lexical::config::LexicalConfig;
use crate::lexical::scoring;

/// One posting: a term's occurrences within one field of one document.
///
/// For a given term there is at most one entry per `(doc, field)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingEntry {
    /// Position of the document in the index (see [`LexicalIndex::doc_id`]).
    pub doc: usize,
    /// Occurrences of the term in this field's tokenized text.
    pub term_frequency: u32,
    /// Field the occurrences came from.
    pub field: FieldName,
}

/// Aggregate statistics of one index build.
///
/// Only valid for the exact build that produced them.
#[derive(Debug, Clone, Default)]
pub struct IndexStatistics {
    /// Indexed documents (`N`).
    pub document_count: usize,
    /// Input documents dropped because they produced no tokens.
    pub skipped_documents: usize,
    /// Tokens across every indexed document.
    pub total_tokens: u64,
    /// Average document length in tokens, 0 for an empty index.
    pub average_document_length: f64,
    /// Inverse document frequency per term.
    pub idf: AHashMap<String, f64>,
}

impl IndexStatistics {
    /// Inverse document frequency of a term, if indexed.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Number of distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.idf.len()
    }
}

/// A structured field value kept for boost matching.
#[derive(Debug, Clone)]
pub(crate) struct StructuredValue {
    pub(crate) field: FieldName,
    /// Lowercased original value.
    pub(crate) original: String,
    pub(crate) tokens: AHashSet<String>,
}

/// Per-document analysis output, produced in parallel.
struct AnalyzedDocument<'a> {
    id: &'a DocId,
    length: u32,
    field_terms: Vec<(FieldName, AHashMap<String, u32>)>,
    structured: Vec<StructuredValue>,
}

fn analyze<'a>(document: &'a Document, tokenizer: &Tokenizer) -> AnalyzedDocument<'a> {
    let mut length = 0u32;
    let mut field_terms = Vec::new();
    let mut structured: Vec<StructuredValue> = Vec::new();

    for (field, values) in document.fields() {
        let mut frequencies: AHashMap<String, u32> = AHashMap::new();
        for value in values {
            let tokens = tokenizer.tokenize(value);
            length += tokens.len() as u32;

            if field.is_structured() {
                let original = value.to_lowercase();
                if !structured
                    .iter()
                    .any(|v| v.field == *field && v.original == original)
                {
                    structured.push(StructuredValue {
                        field: *field,
                        original,
                        tokens: tokens.iter().cloned().collect(),
                    });
                }
            }

            for token in tokens {
                *frequencies.entry(token).or_insert(0) += 1;
            }
        }
        if !frequencies.is_empty() {
            field_terms.push((*field, frequencies));
        }
    }

    AnalyzedDocument {
        id: document.id(),
        length,
        field_terms,
        structured,
    }
}

/// Immutable BM25 inverted index with field-aware postings.
#[derive(Debug)]
pub struct LexicalIndex {
    pub(crate) config: LexicalConfig,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) expander: Arc<dyn QueryExpander>,
    pub(crate) doc_ids: Vec<DocId>,
    pub(crate) doc_lengths: Vec<u32>,
    pub(crate) postings: AHashMap<String, Vec<PostingEntry>>,
    pub(crate) structured: Vec<Vec<StructuredValue>>,
    pub(crate) stats: IndexStatistics,
}

impl LexicalIndex {
    /// Build an index over `documents`.
    ///
    /// The query expander is the built-in domain expander (or the tables at
    /// `config.synonyms_path`), or the identity when expansion is disabled.
    pub fn build(documents: &[Document], config: LexicalConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = config.tokenizer();

        let expander: Arc<dyn QueryExpander> = if config.enable_query_expansion {
            let tables = match &config.synonyms_path {
                Some(path) => SynonymTables::load_from_file(path)?,
                None => SynonymTables::builtin(),
            };
            Arc::new(DomainQueryExpander::new(tables, &tokenizer))
        } else {
            Arc::new(IdentityExpander)
        };

        Self::build_with_expander(documents, config, expander)
    }

    /// Build an index with a caller-supplied query expander.
    pub fn build_with_expander(
        documents: &[Document],
        config: LexicalConfig,
        expander: Arc<dyn QueryExpander>,
    ) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let mut seen = AHashSet::with_capacity(documents.len());
        for document in documents {
            if !seen.insert(document.id()) {
                return Err(ModelseekError::DuplicateDocument(document.id().to_string()));
            }
        }

        let tokenizer = config.tokenizer();
        let analyzed: Vec<AnalyzedDocument<'_>> = documents
            .par_iter()
            .map(|document| analyze(document, &tokenizer))
            .collect();

        let mut doc_ids = Vec::with_capacity(analyzed.len());
        let mut doc_lengths = Vec::with_capacity(analyzed.len());
        let mut structured = Vec::with_capacity(analyzed.len());
        let mut postings: AHashMap<String, Vec<PostingEntry>> = AHashMap::new();
        let mut doc_freqs: AHashMap<String, usize> = AHashMap::new();
        let mut total_tokens = 0u64;
        let mut skipped_documents = 0usize;

        for document in analyzed {
            if document.length == 0 {
                skipped_documents += 1;
                continue;
            }
            let ordinal = doc_ids.len();
            doc_ids.push(document.id.clone());
            doc_lengths.push(document.length);
            structured.push(document.structured);
            total_tokens += document.length as u64;

            let mut distinct: AHashSet<&str> = AHashSet::new();
            for (field, frequencies) in &document.field_terms {
                for (term, tf) in frequencies {
                    if distinct.insert(term.as_str()) {
                        *doc_freqs.entry(term.clone()).or_insert(0) += 1;
                    }
                    postings.entry(term.clone()).or_default().push(PostingEntry {
                        doc: ordinal,
                        term_frequency: *tf,
                        field: *field,
                    });
                }
            }
        }

        let document_count = doc_ids.len();
        let average_document_length = if document_count > 0 {
            total_tokens as f64 / document_count as f64
        } else {
            0.0
        };
        let idf = doc_freqs
            .into_iter()
            .map(|(term, df)| {
                let weight = scoring::idf(document_count, df);
                (term, weight)
            })
            .collect();

        let stats = IndexStatistics {
            document_count,
            skipped_documents,
            total_tokens,
            average_document_length,
            idf,
        };

        info!(
            documents = document_count,
            skipped = skipped_documents,
            terms = stats.term_count(),
            avgdl = average_document_length,
            expander = expander.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built lexical index"
        );

        Ok(Self {
            config,
            tokenizer,
            expander,
            doc_ids,
            doc_lengths,
            postings,
            structured,
            stats,
        })
    }

    /// Build statistics.
    pub fn statistics(&self) -> &IndexStatistics {
        &self.stats
    }

    /// Configuration the index was built with.
    pub fn config(&self) -> &LexicalConfig {
        &self.config
    }

    /// The shared tokenizer.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Name of the query expander in use.
    pub fn expander_name(&self) -> &str {
        self.expander.name()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Identifier of the document at a posting position.
    pub fn doc_id(&self, doc: usize) -> Option<&DocId> {
        self.doc_ids.get(doc)
    }

    /// Postings for a term, empty when the term is not indexed.
    pub fn postings(&self, term: &str) -> &[PostingEntry] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Lowercased structured values retained for a document.
    pub fn structured_values(&self, doc: usize) -> Vec<(FieldName, &str)> {
        self.structured
            .get(doc)
            .map(|values| {
                values
                    .iter()
                    .map(|v| (v.field, v.original.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
