//! The `modelseek` binary driven end to end.

use std::path::Path;
use std::process::{Command, Output};

use modelseek::vector::dense::{ANN_FILE, MANIFEST_FILE};
use serde_json::Value;
use tempfile::TempDir;

const CORPUS: &str = r#"[
    {"id": "A", "fields": {"title": "PyTorch BERT", "task": "fill-mask"}},
    {"id": "B", "fields": {"title": "TensorFlow ResNet", "task": "image classification"}},
    {"id": "C", "fields": {"title": "PyTorch ResNet", "task": "image classification"}}
]"#;

fn modelseek(args: &[&str]) -> Result<Output, Box<dyn std::error::Error>> {
    Ok(Command::new(env!("CARGO_BIN_EXE_modelseek"))
        .args(args)
        .env_remove("MODELSEEK_CONFIG")
        .env_remove("RUST_LOG")
        .output()?)
}

fn json_stdout(output: &Output) -> Result<Value, Box<dyn std::error::Error>> {
    assert!(
        output.status.success(),
        "modelseek failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(serde_json::from_slice(&output.stdout)?)
}

fn write_corpus(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let path = dir.join("corpus.json");
    std::fs::write(&path, CORPUS)?;
    Ok(path.display().to_string())
}

#[test]
fn test_route_command() -> Result<(), Box<dyn std::error::Error>> {
    let output = modelseek(&["route", "count models by task", "--format", "json"])?;
    let decision = json_stdout(&output)?;
    assert_eq!(decision["strategy"], "defer");
    Ok(())
}

#[test]
fn test_index_then_search() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let corpus = write_corpus(dir.path())?;
    let index_dir = dir.path().join("dense");
    let index_dir = index_dir.display().to_string();

    let output = modelseek(&["index", "--corpus", &corpus, "--out", &index_dir, "-f", "json"])?;
    json_stdout(&output)?;
    assert!(dir.path().join("dense").join(MANIFEST_FILE).exists());
    assert!(dir.path().join("dense").join(ANN_FILE).exists());

    let output = modelseek(&[
        "search",
        "--corpus",
        &corpus,
        "--dense",
        &index_dir,
        "-f",
        "json",
        "pytorch resnet",
    ])?;
    let response = json_stdout(&output)?;
    assert_eq!(response["query"], "pytorch resnet");
    assert_eq!(response["results"][0]["doc_id"], "C");
    Ok(())
}

#[test]
fn test_stats_command() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let corpus = write_corpus(dir.path())?;

    let output = modelseek(&["stats", "--corpus", &corpus, "--format", "json"])?;
    let report = json_stdout(&output)?;
    assert!(report.is_object());
    Ok(())
}

#[test]
fn test_missing_corpus_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("nope.json").display().to_string();

    let output = modelseek(&["search", "--corpus", &missing, "bert"])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
    Ok(())
}
