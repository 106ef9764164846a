//! Dense index lifecycle: build, persist, load and query.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{DocId, Document};
use crate::embedding::TextEmbedder;
use crate::error::{ModelseekError, Result};
use crate::hybrid::types::RankedHit;
use crate::storage::Storage;
use crate::vector::ann::{AnnBuilder, AnnIndex, FlatAnnBuilder};
use crate::vector::core::vector::Vector;

/// Manifest file name inside a dense index directory.
pub const MANIFEST_FILE: &str = "dense.manifest.json";

/// ANN payload file name inside a dense index directory.
pub const ANN_FILE: &str = "dense.ann";

/// Current manifest format version.
pub const FORMAT_VERSION: u32 = 1;

/// Metadata persisted next to the ANN payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseManifest {
    pub format_version: u32,
    pub model_identifier: String,
    pub dimension: usize,
    pub ann_backend: String,
    /// CRC32 of the whole ANN file.
    pub ann_checksum: u32,
    /// Document ids in internal index order.
    pub doc_ids: Vec<DocId>,
    pub built_at: DateTime<Utc>,
}

/// Summary of a dense index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseStatistics {
    pub document_count: usize,
    pub dimension: usize,
    pub model_identifier: String,
    pub ann_backend: String,
    pub built_at: DateTime<Utc>,
}

/// Build the text a document is embedded from.
///
/// Field values are visited in field priority order. Each value is
/// whitespace-normalized and repeated [`FieldName::embedding_repeat`] times
/// so that the embedding reflects field importance. A document without any
/// text falls back to `"Model <id>"`.
///
/// [`FieldName::embedding_repeat`]: crate::document::FieldName::embedding_repeat
pub fn document_text(document: &Document) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (field, value) in document.field_values() {
        let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            continue;
        }
        for _ in 0..field.embedding_repeat() {
            parts.push(normalized.clone());
        }
    }

    if parts.is_empty() {
        format!("Model {}", document.id())
    } else {
        parts.join(" ")
    }
}

/// An embedding index over a document set.
///
/// Immutable once built; rebuilding produces a new instance.
pub struct DenseIndex {
    embedder: Arc<dyn TextEmbedder>,
    ann: Box<dyn AnnIndex>,
    doc_ids: Vec<DocId>,
    built_at: DateTime<Utc>,
}

impl std::fmt::Debug for DenseIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseIndex")
            .field("model_identifier", &self.embedder.model_identifier())
            .field("ann", &self.ann.name())
            .field("documents", &self.doc_ids.len())
            .field("built_at", &self.built_at)
            .finish()
    }
}

impl DenseIndex {
    /// Build with the exact flat ANN backend.
    pub fn build(documents: &[Document], embedder: Arc<dyn TextEmbedder>) -> Result<Self> {
        Self::build_with(documents, embedder, &FlatAnnBuilder)
    }

    /// Build with a caller-supplied ANN backend.
    pub fn build_with(
        documents: &[Document],
        embedder: Arc<dyn TextEmbedder>,
        ann_builder: &dyn AnnBuilder,
    ) -> Result<Self> {
        if documents.is_empty() {
            return Err(ModelseekError::EmptyCorpus);
        }

        let start = Instant::now();

        // Internal order is DocId order, so ANN ties break the same way as
        // ranked hits.
        let mut ordered: Vec<&Document> = documents.iter().collect();
        ordered.sort_by(|a, b| a.id().cmp(b.id()));
        if let Some(pair) = ordered.windows(2).find(|pair| pair[0].id() == pair[1].id()) {
            return Err(ModelseekError::DuplicateDocument(pair[0].id().to_string()));
        }

        let texts: Vec<String> = ordered.iter().map(|&d| document_text(d)).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut vectors = embedder.embed_batch(&text_refs)?;
        if vectors.len() != documents.len() {
            return Err(ModelseekError::embedding(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }

        let dimension = embedder.dimension();
        for vector in &vectors {
            vector.validate_dimension(dimension)?;
            if !vector.is_valid() {
                return Err(ModelseekError::embedding(
                    "embedder produced non-finite values",
                ));
            }
        }
        Vector::normalize_batch_parallel(&mut vectors);

        let ann = ann_builder.build(vectors)?;
        let doc_ids = ordered.iter().map(|d| d.id().clone()).collect();

        info!(
            documents = documents.len(),
            dimension,
            model = embedder.model_identifier(),
            backend = ann.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built dense index"
        );

        Ok(Self {
            embedder,
            ann,
            doc_ids,
            built_at: Utc::now(),
        })
    }

    /// Persist the ANN payload and manifest.
    ///
    /// The ANN file is written first so that a manifest on disk always refers
    /// to a complete payload.
    pub fn persist(&self, storage: &dyn Storage) -> Result<()> {
        let start = Instant::now();
        let ann_bytes = self.ann.to_bytes()?;
        let manifest = DenseManifest {
            format_version: FORMAT_VERSION,
            model_identifier: self.embedder.model_identifier().to_string(),
            dimension: self.ann.dimension(),
            ann_backend: self.ann.name().to_string(),
            ann_checksum: crc32fast::hash(&ann_bytes),
            doc_ids: self.doc_ids.clone(),
            built_at: self.built_at,
        };
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;

        storage.write_atomic(ANN_FILE, &ann_bytes)?;
        storage.write_atomic(MANIFEST_FILE, &manifest_bytes)?;

        info!(
            documents = self.doc_ids.len(),
            bytes = ann_bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Persisted dense index"
        );
        Ok(())
    }

    /// Load a persisted index with the flat ANN backend.
    pub fn load(storage: &dyn Storage, embedder: Arc<dyn TextEmbedder>) -> Result<Self> {
        Self::load_with(storage, embedder, &FlatAnnBuilder)
    }

    /// Load a persisted index, verifying it against `embedder`.
    pub fn load_with(
        storage: &dyn Storage,
        embedder: Arc<dyn TextEmbedder>,
        ann_builder: &dyn AnnBuilder,
    ) -> Result<Self> {
        let start = Instant::now();
        let manifest_bytes = storage.read_all(MANIFEST_FILE)?;
        let manifest: DenseManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| ModelseekError::corrupt_index(format!("unreadable manifest: {e}")))?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(ModelseekError::corrupt_index(format!(
                "unsupported manifest version {}",
                manifest.format_version
            )));
        }
        if manifest.model_identifier != embedder.model_identifier() {
            return Err(ModelseekError::IndexModelMismatch {
                expected: embedder.model_identifier().to_string(),
                found: manifest.model_identifier,
            });
        }
        if manifest.dimension != embedder.dimension() {
            return Err(ModelseekError::IndexModelMismatch {
                expected: format!(
                    "{} ({} dims)",
                    embedder.model_identifier(),
                    embedder.dimension()
                ),
                found: format!("{} ({} dims)", manifest.model_identifier, manifest.dimension),
            });
        }
        if manifest.ann_backend != ann_builder.name() {
            return Err(ModelseekError::corrupt_index(format!(
                "index uses ANN backend '{}', loader is '{}'",
                manifest.ann_backend,
                ann_builder.name()
            )));
        }

        let ann_bytes = storage.read_all(ANN_FILE)?;
        if crc32fast::hash(&ann_bytes) != manifest.ann_checksum {
            return Err(ModelseekError::corrupt_index(
                "ANN file does not match manifest checksum",
            ));
        }
        let ann = ann_builder.load(&ann_bytes)?;

        if ann.len() != manifest.doc_ids.len() {
            return Err(ModelseekError::corrupt_index(format!(
                "ANN holds {} vectors, manifest lists {} documents",
                ann.len(),
                manifest.doc_ids.len()
            )));
        }
        if ann.dimension() != manifest.dimension {
            return Err(ModelseekError::corrupt_index(format!(
                "ANN dimension {} differs from manifest dimension {}",
                ann.dimension(),
                manifest.dimension
            )));
        }

        info!(
            documents = manifest.doc_ids.len(),
            model = %manifest.model_identifier,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dense index"
        );

        Ok(Self {
            embedder,
            ann,
            doc_ids: manifest.doc_ids,
            built_at: manifest.built_at,
        })
    }

    /// Nearest documents to `query` by cosine similarity.
    ///
    /// Encoding the query is the one blocking call on this path.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<RankedHit>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut vector = self.embedder.embed(query)?;
        vector.validate_dimension(self.ann.dimension())?;
        if vector.norm() == 0.0 {
            debug!(query, "Query embeds to the zero vector");
            return Ok(Vec::new());
        }
        vector.normalize();

        let scored: Vec<(DocId, f64)> = self
            .ann
            .search(&vector, top_k)
            .into_iter()
            .filter_map(|(index, similarity)| {
                self.doc_ids
                    .get(index)
                    .map(|id| (id.clone(), f64::from(similarity.clamp(-1.0, 1.0))))
            })
            .collect();

        debug!(query, hits = scored.len(), "Dense search");
        Ok(RankedHit::rank_scores(scored, top_k))
    }

    /// Index summary.
    pub fn statistics(&self) -> DenseStatistics {
        DenseStatistics {
            document_count: self.doc_ids.len(),
            dimension: self.ann.dimension(),
            model_identifier: self.embedder.model_identifier().to_string(),
            ann_backend: self.ann.name().to_string(),
            built_at: self.built_at,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    pub fn model_identifier(&self) -> &str {
        self.embedder.model_identifier()
    }

    /// Document ids in internal index order, ascending.
    pub fn doc_ids(&self) -> &[DocId] {
        &self.doc_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FieldName;
    use crate::embedding::{HashingEmbedder, PrecomputedEmbedder};
    use crate::error::ErrorKind;
    use crate::storage::memory::MemoryStorage;

    fn corpus() -> Vec<Document> {
        vec![
            Document::builder("A")
                .add(FieldName::Title, "PyTorch BERT")
                .add(FieldName::Task, "fill-mask")
                .build(),
            Document::builder("B")
                .add(FieldName::Title, "TensorFlow ResNet")
                .add(FieldName::Task, "image classification")
                .build(),
            Document::builder("C")
                .add(FieldName::Title, "PyTorch ResNet")
                .add(FieldName::Task, "image classification")
                .build(),
        ]
    }

    fn hashing(dim: usize) -> Arc<dyn TextEmbedder> {
        Arc::new(HashingEmbedder::new(dim).unwrap())
    }

    #[test]
    fn test_document_text_repeats_by_priority() {
        let doc = Document::builder("x")
            .add(FieldName::Title, "BERT  base")
            .add(FieldName::Description, "masked lm")
            .add(FieldName::License, "mit")
            .build();
        assert_eq!(
            document_text(&doc),
            "BERT base BERT base BERT base masked lm masked lm mit"
        );
    }

    #[test]
    fn test_document_text_fallback() {
        let doc = Document::new("urn:model:7");
        assert_eq!(document_text(&doc), "Model urn:model:7");
    }

    #[test]
    fn test_build_and_search() {
        let index = DenseIndex::build(&corpus(), hashing(64)).unwrap();
        assert_eq!(index.len(), 3);

        let hits = index.search("pytorch resnet", 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].doc_id.as_str(), "C");
        assert_eq!(hits[0].rank, 1);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(hits[0].score <= 1.0 + 1e-6);
    }

    #[test]
    fn test_build_empty_fails() {
        let err = DenseIndex::build(&[], hashing(8)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCorpus);
    }

    #[test]
    fn test_build_duplicate_fails() {
        let docs = vec![Document::new("a"), Document::new("a")];
        assert!(matches!(
            DenseIndex::build(&docs, hashing(8)),
            Err(ModelseekError::DuplicateDocument(_))
        ));
    }

    #[test]
    fn test_top_k_and_zero_query() {
        let index = DenseIndex::build(&corpus(), hashing(32)).unwrap();
        assert!(index.search("pytorch", 0).unwrap().is_empty());
        assert_eq!(index.search("pytorch", 1).unwrap().len(), 1);
        // No tokens survive analysis, so the query vector is zero.
        assert!(index.search("!!", 5).unwrap().is_empty());
    }

    #[test]
    fn test_tied_scores_break_by_doc_id() {
        let docs = vec![
            Document::builder("z")
                .add(FieldName::Title, "resnet vision")
                .build(),
            Document::builder("a")
                .add(FieldName::Title, "resnet vision")
                .build(),
        ];
        let index = DenseIndex::build(&docs, hashing(64)).unwrap();
        assert_eq!(index.doc_ids()[0].as_str(), "a");

        let top = index.search("resnet vision", 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].doc_id.as_str(), "a");

        let both = index.search("resnet vision", 2).unwrap();
        let ids: Vec<&str> = both.iter().map(|h| h.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "z"]);
        assert_eq!(both[0].score, both[1].score);
    }

    #[test]
    fn test_scores_never_exceed_one() {
        let index = DenseIndex::build(&corpus(), hashing(64)).unwrap();
        let text = document_text(&corpus()[2]);
        for hit in index.search(&text, 3).unwrap() {
            assert!(hit.score <= 1.0, "score {} above 1", hit.score);
            assert!(hit.score >= -1.0);
        }
    }

    #[test]
    fn test_persist_load_round_trip() {
        let storage = MemoryStorage::new();
        let index = DenseIndex::build(&corpus(), hashing(64)).unwrap();
        index.persist(&storage).unwrap();
        assert!(storage.file_exists(MANIFEST_FILE));
        assert!(storage.file_exists(ANN_FILE));

        let loaded = DenseIndex::load(&storage, hashing(64)).unwrap();
        assert_eq!(loaded.doc_ids(), index.doc_ids());
        assert_eq!(
            loaded.search("tensorflow image", 3).unwrap(),
            index.search("tensorflow image", 3).unwrap()
        );
        assert_eq!(loaded.statistics().built_at, index.statistics().built_at);
    }

    #[test]
    fn test_load_model_mismatch() {
        let storage = MemoryStorage::new();
        DenseIndex::build(&corpus(), hashing(64))
            .unwrap()
            .persist(&storage)
            .unwrap();

        let other = PrecomputedEmbedder::new("other-model", 64);
        let err = DenseIndex::load(&storage, Arc::new(other)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexModelMismatch);

        let err = DenseIndex::load(&storage, hashing(32)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexModelMismatch);
    }

    #[test]
    fn test_load_detects_corruption() {
        let storage = MemoryStorage::new();
        DenseIndex::build(&corpus(), hashing(16))
            .unwrap()
            .persist(&storage)
            .unwrap();

        let mut bytes = storage.read_all(ANN_FILE).unwrap();
        let last = bytes.len() - 5;
        bytes[last] ^= 0x55;
        storage.put_raw(ANN_FILE, bytes);
        let err = DenseIndex::load(&storage, hashing(16)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptIndex);

        storage.put_raw(MANIFEST_FILE, b"{not json".to_vec());
        let err = DenseIndex::load(&storage, hashing(16)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptIndex);
    }

    #[test]
    fn test_load_missing_is_unavailable() {
        let storage = MemoryStorage::new();
        let err = DenseIndex::load(&storage, hashing(16)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_statistics() {
        let index = DenseIndex::build(&corpus(), hashing(16)).unwrap();
        let stats = index.statistics();
        assert_eq!(stats.document_count, 3);
        assert_eq!(stats.dimension, 16);
        assert_eq!(stats.model_identifier, "hashing-16");
        assert_eq!(stats.ann_backend, "flat");
    }
}
