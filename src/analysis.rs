//! Text analysis shared by indexing and querying.
//!
//! A single [`Tokenizer`] is used on both sides of the lexical index so that
//! document terms and query terms can never drift apart. Query expansion
//! sits on top of the tokenizer and only ever adds terms.

pub mod expansion;
pub mod tokenizer;

pub use expansion::{DomainQueryExpander, IdentityExpander, QueryExpander, SynonymTables};
pub use tokenizer::{Tokenizer, tokenize};
