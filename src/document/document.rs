//! Catalog document and its identifier.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::field::FieldName;
use crate::error::Result;

/// Opaque, stable document identifier (typically a model URI).
///
/// Ordering is plain lexical string order and is what ranking uses to break
/// score ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Create a new identifier.
    pub fn new<S: Into<String>>(id: S) -> Self {
        DocId(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        DocId(id.to_string())
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        DocId(id)
    }
}

/// One indexed record.
///
/// Values are grouped per field and keep insertion order within a field.
/// Documents are immutable once handed to an index build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocId,
    #[serde(default)]
    fields: BTreeMap<FieldName, Vec<String>>,
}

impl Document {
    /// Create a document with no field values.
    pub fn new<I: Into<DocId>>(id: I) -> Self {
        Document {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Create a builder for constructing documents.
    pub fn builder<I: Into<DocId>>(id: I) -> DocumentBuilder {
        DocumentBuilder::new(id)
    }

    /// Build a document from raw `(property, value)` pairs.
    ///
    /// Property names are resolved with [`FieldName::from_str`]; the first
    /// unknown property fails the whole document.
    ///
    /// [`FieldName::from_str`]: std::str::FromStr::from_str
    pub fn from_properties<I, P, K, V>(id: I, properties: P) -> Result<Self>
    where
        I: Into<DocId>,
        P: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut document = Document::new(id);
        for (property, value) in properties {
            let field: FieldName = property.as_ref().parse()?;
            document.add_value(field, value);
        }
        Ok(document)
    }

    /// Append a value to a field.
    pub fn add_value<V: Into<String>>(&mut self, field: FieldName, value: V) {
        self.fields.entry(field).or_default().push(value.into());
    }

    /// The document identifier.
    pub fn id(&self) -> &DocId {
        &self.id
    }

    /// Values stored under a field, empty when the field is absent.
    pub fn values(&self, field: FieldName) -> &[String] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All fields in priority order.
    pub fn fields(&self) -> &BTreeMap<FieldName, Vec<String>> {
        &self.fields
    }

    /// Iterate over every `(field, value)` pair in priority order.
    pub fn field_values(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.fields
            .iter()
            .flat_map(|(field, values)| values.iter().map(move |v| (*field, v.as_str())))
    }

    /// Number of distinct fields carrying at least one value.
    pub fn len(&self) -> usize {
        self.fields.values().filter(|v| !v.is_empty()).count()
    }

    /// Whether the document carries no values at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new<I: Into<DocId>>(id: I) -> Self {
        DocumentBuilder {
            document: Document::new(id),
        }
    }

    /// Add a value to a field.
    pub fn add<V: Into<String>>(mut self, field: FieldName, value: V) -> Self {
        self.document.add_value(field, value);
        self
    }

    /// Add several values to a field.
    pub fn add_all<V, I>(mut self, field: FieldName, values: I) -> Self
    where
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        for value in values {
            self.document.add_value(field, value);
        }
        self
    }

    /// Build the final document.
    pub fn build(self) -> Document {
        self.document
    }
}
