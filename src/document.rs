//! Document model for the model catalog.
//!
//! A [`Document`] is one catalog record: a stable [`DocId`] plus text values
//! grouped by a closed set of [`FieldName`]s. Property names coming from the
//! backing triple store are resolved to fields when documents are built, and
//! anything unrecognised is rejected rather than silently weighted.
//!
//! # Examples
//!
//! ```
//! use modelseek::document::{Document, FieldName};
//!
//! let doc = Document::builder("hf:bert-base-uncased")
//!     .add(FieldName::Title, "BERT base uncased")
//!     .add(FieldName::Task, "fill-mask")
//!     .add(FieldName::Library, "transformers")
//!     .build();
//!
//! assert_eq!(doc.values(FieldName::Task), ["fill-mask"]);
//! ```

pub mod corpus;
pub mod document;
pub mod field;

pub use corpus::{Corpus, InMemoryCorpus};
pub use document::{DocId, Document, DocumentBuilder};
pub use field::FieldName;
