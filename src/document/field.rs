//! Closed set of indexable document fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelseekError, Result};

/// A document field.
///
/// Declaration order is the field priority order used when a document is
/// flattened into a single text (title first, free-text and provenance last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Display title of the model.
    Title,
    /// Alternative name.
    Name,
    /// Free-text description.
    Description,
    /// Task the model solves, e.g. `image-classification`.
    Task,
    /// Software library, e.g. `transformers`.
    Library,
    /// Deep-learning framework, e.g. `pytorch`.
    Framework,
    /// Curated keyword or tag.
    Keyword,
    /// Repository-local identifier.
    Identifier,
    /// Label attached by the ontology.
    Label,
    /// Network architecture.
    Architecture,
    /// Model type classification.
    ModelType,
    /// Originating repository.
    Source,
    /// Subject heading.
    Subject,
    /// Author or organisation.
    Creator,
    /// License name.
    License,
}

impl FieldName {
    /// Every field, in priority order.
    pub const ALL: [FieldName; 15] = [
        FieldName::Title,
        FieldName::Name,
        FieldName::Description,
        FieldName::Task,
        FieldName::Library,
        FieldName::Framework,
        FieldName::Keyword,
        FieldName::Identifier,
        FieldName::Label,
        FieldName::Architecture,
        FieldName::ModelType,
        FieldName::Source,
        FieldName::Subject,
        FieldName::Creator,
        FieldName::License,
    ];

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Name => "name",
            FieldName::Description => "description",
            FieldName::Task => "task",
            FieldName::Library => "library",
            FieldName::Framework => "framework",
            FieldName::Keyword => "keyword",
            FieldName::Identifier => "identifier",
            FieldName::Label => "label",
            FieldName::Architecture => "architecture",
            FieldName::ModelType => "model_type",
            FieldName::Source => "source",
            FieldName::Subject => "subject",
            FieldName::Creator => "creator",
            FieldName::License => "license",
        }
    }

    /// Whether this field has a small, enumerable value space eligible for
    /// exact/partial match boosting.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            FieldName::Task | FieldName::Library | FieldName::Framework
        )
    }

    /// How many times values of this field are repeated in the text handed
    /// to an embedding model.
    pub fn embedding_repeat(&self) -> usize {
        match self {
            FieldName::Title | FieldName::Name => 3,
            FieldName::Description
            | FieldName::Task
            | FieldName::Library
            | FieldName::Framework => 2,
            _ => 1,
        }
    }

    /// Default lexical weight.
    pub fn default_weight(&self) -> f64 {
        match self {
            FieldName::Task | FieldName::Library => 3.0,
            FieldName::Framework | FieldName::Keyword => 2.5,
            FieldName::Title | FieldName::Name | FieldName::Label => 2.0,
            FieldName::Identifier => 1.5,
            FieldName::Source | FieldName::Creator => 0.8,
            FieldName::Description
            | FieldName::Subject
            | FieldName::Architecture
            | FieldName::ModelType
            | FieldName::License => 1.0,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = ModelseekError;

    /// Resolve a property name.
    ///
    /// Accepts canonical names (`model_type`), ontology local names
    /// (`modelType`, `licenseName`), prefixed names (`dcterms:title`) and full
    /// property URIs (`http://purl.org/dc/terms/title`), case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let local = s.rsplit(['#', '/', ':']).next().unwrap_or(s);
        let normalized: String = local
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        let field = match normalized.as_str() {
            "title" => FieldName::Title,
            "name" => FieldName::Name,
            "description" => FieldName::Description,
            "task" => FieldName::Task,
            "library" => FieldName::Library,
            "framework" => FieldName::Framework,
            "keyword" | "keywords" => FieldName::Keyword,
            "identifier" => FieldName::Identifier,
            "label" => FieldName::Label,
            "architecture" => FieldName::Architecture,
            "modeltype" => FieldName::ModelType,
            "source" => FieldName::Source,
            "subject" => FieldName::Subject,
            "creator" => FieldName::Creator,
            "license" | "licensename" => FieldName::License,
            _ => return Err(ModelseekError::unknown_field(s)),
        };
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
    }

    #[test]
    fn test_parse_ontology_names() {
        assert_eq!(
            "http://purl.org/dc/terms/title".parse::<FieldName>().unwrap(),
            FieldName::Title
        );
        assert_eq!(
            "http://purl.org/pionera/daimo#task"
                .parse::<FieldName>()
                .unwrap(),
            FieldName::Task
        );
        assert_eq!(
            "dcat:keyword".parse::<FieldName>().unwrap(),
            FieldName::Keyword
        );
        assert_eq!(
            "modelType".parse::<FieldName>().unwrap(),
            FieldName::ModelType
        );
        assert_eq!(
            "daimo:licenseName".parse::<FieldName>().unwrap(),
            FieldName::License
        );
        assert_eq!("TITLE".parse::<FieldName>().unwrap(), FieldName::Title);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "rdf:type".parse::<FieldName>().unwrap_err();
        assert!(matches!(err, ModelseekError::UnknownField(name) if name == "rdf:type"));
        assert!("".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_structured_fields() {
        let structured: Vec<_> = FieldName::ALL
            .iter()
            .filter(|f| f.is_structured())
            .collect();
        assert_eq!(
            structured,
            vec![&FieldName::Task, &FieldName::Library, &FieldName::Framework]
        );
    }

    #[test]
    fn test_priority_order() {
        assert!(FieldName::Title < FieldName::Description);
        assert!(FieldName::Task < FieldName::Keyword);
        assert_eq!(FieldName::Title.embedding_repeat(), 3);
        assert_eq!(FieldName::Task.embedding_repeat(), 2);
        assert_eq!(FieldName::Keyword.embedding_repeat(), 1);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&FieldName::ModelType).unwrap();
        assert_eq!(json, "\"model_type\"");
    }
}
