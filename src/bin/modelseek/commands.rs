//! Command implementations for the modelseek CLI.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use modelseek::config::EngineConfig;
use modelseek::document::{Corpus, InMemoryCorpus};
use modelseek::embedding::{HashingEmbedder, TextEmbedder};
use modelseek::hybrid::SearchEngine;
use modelseek::lexical::LexicalIndex;
use modelseek::routing::ComplexityRouter;
use modelseek::storage::file::FileStorage;
use modelseek::vector::{DenseIndex, DenseStatistics};

use crate::args::*;
use crate::output::*;

/// Execute a CLI command.
pub fn execute_command(args: ModelseekArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    match &args.command {
        Command::Index(index_args) => build_index(index_args, &config, &args),
        Command::Search(search_args) => search(search_args, &config, &args),
        Command::Route(route_args) => route(route_args, &config, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &config, &args),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_corpus(path: &Path) -> Result<InMemoryCorpus> {
    InMemoryCorpus::load_from_file(path)
        .with_context(|| format!("loading corpus {}", path.display()))
}

fn embedder(config: &EngineConfig) -> Result<Arc<dyn TextEmbedder>> {
    Ok(Arc::new(HashingEmbedder::new(config.embedding_dimension)?))
}

fn load_dense(dir: &Path, config: &EngineConfig) -> Result<DenseIndex> {
    modelseek::load_dense(dir, embedder(config)?)
        .with_context(|| format!("loading dense index {}", dir.display()))
}

#[derive(Debug, Serialize)]
struct IndexReport {
    documents: usize,
    lexical_documents: usize,
    skipped_documents: usize,
    dense: DenseStatistics,
    directory: String,
    duration_ms: u64,
}

fn build_index(args: &IndexArgs, config: &EngineConfig, cli: &ModelseekArgs) -> Result<()> {
    let start = Instant::now();
    let corpus = load_corpus(&args.corpus)?;
    let documents = corpus.documents()?;

    let lexical = LexicalIndex::build(&documents, config.lexical.clone())
        .context("building lexical index")?;
    let dense = DenseIndex::build(&documents, embedder(config)?).context("building dense index")?;

    let storage = FileStorage::open(&args.out)?;
    dense
        .persist(&storage)
        .with_context(|| format!("persisting dense index to {}", args.out.display()))?;

    let report = IndexReport {
        documents: documents.len(),
        lexical_documents: lexical.statistics().document_count,
        skipped_documents: lexical.statistics().skipped_documents,
        dense: dense.statistics(),
        directory: args.out.display().to_string(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    output_result("Index built", &report, cli)
}

fn search(args: &SearchArgs, config: &EngineConfig, cli: &ModelseekArgs) -> Result<()> {
    let corpus = load_corpus(&args.corpus)?;
    let documents = corpus.documents()?;
    let lexical = LexicalIndex::build(&documents, config.lexical.clone())
        .context("building lexical index")?;
    let dense = match &args.dense {
        Some(dir) => Some(load_dense(dir, config)?),
        None => None,
    };

    let engine = SearchEngine::new(config.clone(), lexical, dense)?;
    let response = engine.search(&args.query, args.top_k)?;
    output_search_response(&response, cli)
}

fn route(args: &RouteArgs, config: &EngineConfig, cli: &ModelseekArgs) -> Result<()> {
    let router = ComplexityRouter::new(config.router.clone())?;
    let decision = router.route(&args.query);
    output_result("Routing decision", &decision, cli)
}

#[derive(Debug, Serialize)]
struct StatsReport {
    documents: usize,
    skipped_documents: usize,
    terms: usize,
    total_tokens: u64,
    average_document_length: f64,
    dense: Option<DenseStatistics>,
}

fn show_stats(args: &StatsArgs, config: &EngineConfig, cli: &ModelseekArgs) -> Result<()> {
    let corpus = load_corpus(&args.corpus)?;
    let index = modelseek::build_lexical(&corpus, config.lexical.clone())
        .context("building lexical index")?;
    let stats = modelseek::statistics(&index);

    let dense = match &args.dense {
        Some(dir) => Some(load_dense(dir, config)?.statistics()),
        None => None,
    };

    let report = StatsReport {
        documents: stats.document_count,
        skipped_documents: stats.skipped_documents,
        terms: stats.term_count(),
        total_tokens: stats.total_tokens,
        average_document_length: stats.average_document_length,
        dense,
    };
    output_result("Index statistics", &report, cli)
}
