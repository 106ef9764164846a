//! Corpus sources.
//!
//! The engine only ever reads a corpus. A corpus exposes document identifiers
//! and, for each identifier, raw `(property, value)` pairs as they come out of
//! the backing store; property names are resolved to [`FieldName`]s when
//! documents are materialised.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::document::document::{DocId, Document};
use crate::document::field::FieldName;
use crate::error::{ModelseekError, Result};

/// Read-only document source.
pub trait Corpus: Send + Sync {
    /// Identifiers of every document, in a stable order.
    fn document_ids(&self) -> Vec<DocId>;

    /// Raw `(property, value)` pairs for one document.
    ///
    /// Unknown identifiers yield an empty list.
    fn properties(&self, id: &DocId) -> Result<Vec<(String, String)>>;

    /// Materialise every document, resolving property names to fields.
    fn documents(&self) -> Result<Vec<Document>> {
        self.document_ids()
            .into_iter()
            .map(|id| {
                let properties = self.properties(&id)?;
                Document::from_properties(id, properties)
            })
            .collect()
    }

    /// Number of documents.
    fn len(&self) -> usize {
        self.document_ids().len()
    }

    /// Whether the corpus holds no documents.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Corpus held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    documents: Vec<Document>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct CorpusRecord {
    id: String,
    #[serde(default)]
    fields: BTreeMap<String, OneOrMany>,
}

impl InMemoryCorpus {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-built documents.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        InMemoryCorpus { documents }
    }

    /// Append a document.
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Borrow the documents.
    pub fn as_slice(&self) -> &[Document] {
        &self.documents
    }

    /// Parse a JSON corpus.
    ///
    /// The input is an array of `{"id": "...", "fields": {"property": value}}`
    /// records where each value is a string or an array of strings. Property
    /// names accept every form [`FieldName`] parses.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<CorpusRecord> = serde_json::from_str(json)?;
        let mut documents = Vec::with_capacity(records.len());

        for record in records {
            let mut document = Document::new(record.id);
            for (property, values) in record.fields {
                let field: FieldName = property.parse()?;
                match values {
                    OneOrMany::One(value) => document.add_value(field, value),
                    OneOrMany::Many(values) => {
                        for value in values {
                            document.add_value(field, value);
                        }
                    }
                }
            }
            documents.push(document);
        }

        Ok(InMemoryCorpus { documents })
    }

    /// Load a JSON corpus file. See [`InMemoryCorpus::from_json`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelseekError::storage(format!(
                "Failed to read corpus '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }
}

impl Corpus for InMemoryCorpus {
    fn document_ids(&self) -> Vec<DocId> {
        self.documents.iter().map(|d| d.id().clone()).collect()
    }

    fn properties(&self, id: &DocId) -> Result<Vec<(String, String)>> {
        Ok(self
            .documents
            .iter()
            .find(|d| d.id() == id)
            .map(|d| {
                d.field_values()
                    .map(|(field, value)| (field.as_str().to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}

impl Corpus for Vec<Document> {
    fn document_ids(&self) -> Vec<DocId> {
        self.iter().map(|d| d.id().clone()).collect()
    }

    fn properties(&self, id: &DocId) -> Result<Vec<(String, String)>> {
        Ok(self
            .iter()
            .find(|d| d.id() == id)
            .map(|d| {
                d.field_values()
                    .map(|(field, value)| (field.as_str().to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.clone())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triple-store style corpus that only speaks raw property names.
    struct TripleCorpus {
        triples: Vec<(&'static str, &'static str, &'static str)>,
    }

    impl Corpus for TripleCorpus {
        fn document_ids(&self) -> Vec<DocId> {
            let mut ids: Vec<DocId> = self.triples.iter().map(|(s, _, _)| DocId::from(*s)).collect();
            ids.dedup();
            ids
        }

        fn properties(&self, id: &DocId) -> Result<Vec<(String, String)>> {
            Ok(self
                .triples
                .iter()
                .filter(|(s, _, _)| *s == id.as_str())
                .map(|(_, p, o)| (p.to_string(), o.to_string()))
                .collect())
        }
    }

    #[test]
    fn test_default_documents_resolves_properties() {
        let corpus = TripleCorpus {
            triples: vec![
                ("m1", "http://purl.org/dc/terms/title", "BERT"),
                ("m1", "daimo:library", "transformers"),
                ("m2", "dcterms:title", "ResNet"),
            ],
        };

        let docs = corpus.documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].values(FieldName::Library), ["transformers"]);
        assert_eq!(docs[1].values(FieldName::Title), ["ResNet"]);
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_default_documents_rejects_unknown_property() {
        let corpus = TripleCorpus {
            triples: vec![("m1", "rdf:type", "daimo:Model")],
        };
        assert!(matches!(
            corpus.documents(),
            Err(ModelseekError::UnknownField(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let corpus = InMemoryCorpus::from_json(
            r#"[
                {"id": "a", "fields": {"title": "PyTorch BERT", "keyword": ["nlp", "bert"]}},
                {"id": "b", "fields": {"modelType": "cnn"}},
                {"id": "c"}
            ]"#,
        )
        .unwrap();

        let docs = corpus.as_slice();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].values(FieldName::Keyword), ["nlp", "bert"]);
        assert_eq!(docs[1].values(FieldName::ModelType), ["cnn"]);
        assert!(docs[2].is_empty());
    }

    #[test]
    fn test_from_json_unknown_field() {
        let result = InMemoryCorpus::from_json(r#"[{"id": "a", "fields": {"colour": "red"}}]"#);
        assert!(matches!(result, Err(ModelseekError::UnknownField(_))));
    }

    #[test]
    fn test_properties_round_trip() {
        let corpus = InMemoryCorpus::from_documents(vec![
            Document::builder("a").add(FieldName::Task, "nlp").build(),
        ]);
        let props = corpus.properties(&DocId::from("a")).unwrap();
        assert_eq!(props, vec![("task".to_string(), "nlp".to_string())]);
        assert!(corpus.properties(&DocId::from("zzz")).unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(&path, r#"[{"id": "x", "fields": {"library": "timm"}}]"#).unwrap();

        let corpus = InMemoryCorpus::load_from_file(&path).unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(InMemoryCorpus::load_from_file(dir.path().join("missing.json")).is_err());
    }
}
