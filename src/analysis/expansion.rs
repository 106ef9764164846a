//! Domain query expansion for AI/ML model search.
//!
//! Expansion is best-effort and monotone: the output always contains every
//! input token, and a query that matches nothing in the tables comes back
//! unchanged.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::error::{ModelseekError, Result};

/// Query expansion strategy.
pub trait QueryExpander: Send + Sync + std::fmt::Debug {
    /// Expand query tokens into a superset of related terms.
    fn expand(&self, tokens: &[String]) -> BTreeSet<String>;

    /// Get the name of this expander for debugging and logging.
    fn name(&self) -> &str;
}

/// Expander that returns its input untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExpander;

impl QueryExpander for IdentityExpander {
    fn expand(&self, tokens: &[String]) -> BTreeSet<String> {
        tokens.iter().cloned().collect()
    }

    fn name(&self) -> &str {
        "identity"
    }
}

const PHRASE_EXPANSIONS: &[(&str, &[&str])] = &[
    // Libraries and frameworks
    ("pytorch", &["pytorch", "torch", "pt"]),
    ("tensorflow", &["tensorflow", "tf", "keras"]),
    ("transformers", &["transformers", "transformer", "huggingface", "hf"]),
    ("scikit", &["scikit", "sklearn", "scikit-learn"]),
    ("jax", &["jax", "flax"]),
    // Computer vision
    (
        "image classification",
        &["image-classification", "image classification", "computer vision", "cv", "vision"],
    ),
    (
        "object detection",
        &["object-detection", "object detection", "detection", "yolo", "rcnn"],
    ),
    (
        "segmentation",
        &["segmentation", "semantic-segmentation", "instance-segmentation", "image-segmentation"],
    ),
    (
        "image generation",
        &["image-generation", "text-to-image", "image generation", "diffusion", "gan"],
    ),
    // Language
    ("nlp", &["nlp", "natural language", "text", "language"]),
    (
        "text classification",
        &["text-classification", "text classification", "sentiment", "classification"],
    ),
    (
        "text generation",
        &["text-generation", "text generation", "language-modeling", "generation"],
    ),
    ("translation", &["translation", "text-translation", "machine-translation"]),
    (
        "question answering",
        &["question-answering", "question answering", "qa", "squad"],
    ),
    (
        "summarization",
        &["summarization", "text-summarization", "abstractive", "extractive"],
    ),
    // Audio
    ("audio", &["audio", "speech", "sound"]),
    (
        "speech recognition",
        &["speech-recognition", "asr", "automatic-speech-recognition", "speech-to-text"],
    ),
    // Multimodal
    ("multimodal", &["multimodal", "vision-language", "image-text"]),
    // Architectures
    ("cnn", &["cnn", "convolutional", "convnet"]),
    ("rnn", &["rnn", "recurrent", "lstm", "gru"]),
    ("transformer", &["transformer", "attention", "bert", "gpt"]),
    // General
    (
        "deep learning",
        &["deep-learning", "deep learning", "dl", "neural network", "neural-network"],
    ),
    ("machine learning", &["machine-learning", "machine learning", "ml"]),
    ("pretrained", &["pretrained", "pre-trained", "finetuned", "fine-tuned"]),
];

const ABBREVIATION_EXPANSIONS: &[(&str, &[&str])] = &[
    ("dl", &["deep learning", "deep-learning"]),
    ("ml", &["machine learning", "machine-learning"]),
    ("cv", &["computer vision", "computer-vision"]),
    ("nlp", &["natural language processing", "natural-language-processing"]),
    ("asr", &["automatic speech recognition", "speech recognition"]),
    ("qa", &["question answering", "question-answering"]),
    ("gan", &["generative adversarial network"]),
    ("vae", &["variational autoencoder"]),
    ("bert", &["bert", "bidirectional encoder representations"]),
    ("gpt", &["gpt", "generative pre-trained transformer"]),
];

/// Raw synonym tables, as stored on disk.
///
/// ```json
/// {
///   "phrases": { "object detection": ["detection", "yolo"] },
///   "abbreviations": { "cv": ["computer vision"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynonymTables {
    /// Multi-word phrase to expansion phrases, matched by substring.
    pub phrases: BTreeMap<String, Vec<String>>,
    /// Single token to expansion phrases.
    pub abbreviations: BTreeMap<String, Vec<String>>,
}

impl SynonymTables {
    /// The built-in AI/ML tables.
    pub fn builtin() -> Self {
        let collect = |table: &[(&str, &[&str])]| {
            table
                .iter()
                .map(|(key, values)| {
                    (
                        key.to_string(),
                        values.iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect()
        };
        Self {
            phrases: collect(PHRASE_EXPANSIONS),
            abbreviations: collect(ABBREVIATION_EXPANSIONS),
        }
    }

    /// Load tables from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelseekError::storage(format!(
                "Failed to read synonym tables '{}': {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ModelseekError::invalid_config(format!(
                "Failed to parse synonym tables '{}': {e}",
                path.display()
            ))
        })
    }
}

/// Phrase- and abbreviation-driven expander.
///
/// Phrase keys are matched as substrings of the space-joined lowercase query,
/// so "pytorch image classification" triggers both the `pytorch` and the
/// `image classification` entries. Every expansion phrase is run through the
/// shared tokenizer, which splits hyphenated variants into index terms.
#[derive(Debug, Clone)]
pub struct DomainQueryExpander {
    phrases: Vec<(String, Vec<String>)>,
    abbreviations: HashMap<String, Vec<String>>,
}

impl DomainQueryExpander {
    /// Build an expander over the given tables.
    pub fn new(tables: SynonymTables, tokenizer: &Tokenizer) -> Self {
        let tokenize_all = |values: &[String]| -> Vec<String> {
            let mut terms: Vec<String> = values
                .iter()
                .flat_map(|v| tokenizer.tokenize(v))
                .collect();
            terms.sort();
            terms.dedup();
            terms
        };

        let phrases = tables
            .phrases
            .iter()
            .map(|(key, values)| (key.to_lowercase(), tokenize_all(values)))
            .collect();
        let abbreviations = tables
            .abbreviations
            .iter()
            .map(|(key, values)| (key.to_lowercase(), tokenize_all(values)))
            .collect();

        Self {
            phrases,
            abbreviations,
        }
    }

    /// Expander over the built-in AI/ML tables.
    pub fn builtin(tokenizer: &Tokenizer) -> Self {
        Self::new(SynonymTables::builtin(), tokenizer)
    }

    /// Number of phrase entries.
    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }
}

impl QueryExpander for DomainQueryExpander {
    fn expand(&self, tokens: &[String]) -> BTreeSet<String> {
        let mut expanded: BTreeSet<String> = tokens.iter().cloned().collect();
        let query_text = tokens.join(" ").to_lowercase();

        for (key, terms) in &self.phrases {
            if query_text.contains(key.as_str()) {
                expanded.extend(terms.iter().cloned());
            }
        }

        for token in tokens {
            if let Some(terms) = self.abbreviations.get(&token.to_lowercase()) {
                expanded.extend(terms.iter().cloned());
            }
        }

        expanded
    }

    fn name(&self) -> &str {
        "domain"
    }
}
