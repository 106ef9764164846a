//! End-to-end retrieval over small model catalogs.

use modelseek::config::EngineConfig;
use modelseek::document::{Corpus, Document, FieldName, InMemoryCorpus};
use modelseek::error::{ErrorKind, ModelseekError};
use modelseek::hybrid::SearchEngine;
use modelseek::lexical::LexicalConfig;
use modelseek::routing::Strategy;

fn catalog() -> Vec<Document> {
    vec![
        Document::builder("A")
            .add(FieldName::Title, "PyTorch BERT")
            .add(FieldName::Task, "nlp")
            .build(),
        Document::builder("B")
            .add(FieldName::Title, "TensorFlow ResNet")
            .add(FieldName::Task, "vision")
            .build(),
        Document::builder("C")
            .add(FieldName::Title, "PyTorch ResNet")
            .add(FieldName::Task, "vision")
            .build(),
    ]
}

#[test]
fn test_structured_match_ranks_first() -> Result<(), Box<dyn std::error::Error>> {
    let index = modelseek::build_lexical(&catalog(), LexicalConfig::default())?;
    let hits = modelseek::search_lexical(&index, "pytorch vision", 10);

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].doc_id.as_str(), "C");
    for (i, hit) in hits.iter().enumerate() {
        assert_eq!(hit.rank, i + 1);
    }
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    Ok(())
}

#[test]
fn test_engine_serves_short_queries_lexically() -> Result<(), Box<dyn std::error::Error>> {
    let engine = SearchEngine::build(&catalog(), EngineConfig::default(), None)?;
    let response = engine.search("pytorch vision", 2)?;

    assert_eq!(response.decision.strategy, Strategy::LexicalOnly);
    assert_eq!(response.executed, Strategy::LexicalOnly);
    assert!(!response.deferred);
    assert_eq!(response.len(), 2);
    assert_eq!(response.best().map(|r| r.doc_id.as_str()), Some("C"));

    let stats = engine.stats();
    assert_eq!(stats.total_searches, 1);
    assert_eq!(stats.lexical_only_routes, 1);

    Ok(())
}

#[test]
fn test_json_corpus_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let corpus = InMemoryCorpus::from_json(
        r#"[
            {"id": "resnet", "fields": {"title": "ResNet-50", "task": "image classification"}},
            {"id": "bert", "fields": {"title": "BERT", "keywords": ["nlp", "transformer"]}}
        ]"#,
    )?;
    assert_eq!(corpus.len(), 2);

    let index = modelseek::build_lexical(&corpus, LexicalConfig::default())?;
    assert_eq!(modelseek::statistics(&index).document_count, 2);

    let hits = modelseek::search_lexical(&index, "transformer", 5);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id.as_str(), "bert");

    Ok(())
}

#[test]
fn test_unknown_property_is_rejected() {
    let err = InMemoryCorpus::from_json(r#"[{"id": "x", "fields": {"colour": "red"}}]"#)
        .unwrap_err();
    assert!(matches!(err, ModelseekError::UnknownField(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn test_empty_corpus() {
    let empty: Vec<Document> = Vec::new();

    let index = modelseek::build_lexical(&empty, LexicalConfig::default()).unwrap();
    assert!(index.is_empty());
    assert!(modelseek::search_lexical(&index, "pytorch", 10).is_empty());

    let embedder = std::sync::Arc::new(modelseek::embedding::HashingEmbedder::new(16).unwrap());
    let err = modelseek::build_dense(&empty, embedder).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyCorpus);
}

#[test]
fn test_zero_top_k_and_blank_queries() -> Result<(), Box<dyn std::error::Error>> {
    let index = modelseek::build_lexical(&catalog(), LexicalConfig::default())?;
    assert!(modelseek::search_lexical(&index, "pytorch", 0).is_empty());
    assert!(modelseek::search_lexical(&index, "", 10).is_empty());
    assert!(modelseek::search_lexical(&index, "?!", 10).is_empty());
    assert!(modelseek::search_lexical(&index, "quantum", 10).is_empty());
    Ok(())
}

#[test]
fn test_duplicate_ids_fail_the_build() {
    let mut docs = catalog();
    docs.push(Document::builder("A").add(FieldName::Title, "again").build());
    let err = modelseek::build_lexical(&docs, LexicalConfig::default()).unwrap_err();
    assert!(matches!(err, ModelseekError::DuplicateDocument(ref id) if id == "A"));
}

#[test]
fn test_routing_through_crate_root() {
    assert_eq!(modelseek::route("bert").strategy, Strategy::LexicalOnly);

    let decision = modelseek::route("count models by task");
    assert_eq!(decision.strategy, Strategy::Defer);
    assert!(decision.matched_features.contains("aggregation"));
    assert!(decision.matched_features.contains("grouping"));
}

#[test]
fn test_deferred_query_falls_back_to_lexical() -> Result<(), Box<dyn std::error::Error>> {
    let engine = SearchEngine::build(&catalog(), EngineConfig::default(), None)?;
    let response = engine.search("count pytorch models by task", 10)?;
    assert!(response.deferred);
    assert_eq!(response.decision.strategy, Strategy::Defer);
    assert_eq!(response.executed, Strategy::LexicalOnly);
    assert!(!response.is_empty());

    let config = EngineConfig {
        defer_fallback: false,
        ..EngineConfig::default()
    };
    let engine = SearchEngine::build(&catalog(), config, None)?;
    let response = engine.search("count pytorch models by task", 10)?;
    assert!(response.deferred);
    assert_eq!(response.executed, Strategy::Defer);
    assert!(response.is_empty());

    Ok(())
}
