//! Output formatting for CLI commands.

use anyhow::Result;
use serde::Serialize;

use modelseek::hybrid::SearchResponse;

use crate::args::{ModelseekArgs, OutputFormat};

/// Output a result in the selected format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &ModelseekArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(result),
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            let value = serde_json::to_value(result)?;
            print_value(&value, 0);
            Ok(())
        }
    }
}

/// Output a search response.
pub fn output_search_response(response: &SearchResponse, args: &ModelseekArgs) -> Result<()> {
    if args.output_format == OutputFormat::Json {
        return output_json(response);
    }

    println!(
        "Query: {}  (routed: {}, executed: {}, complexity {:.2})",
        response.query,
        response.decision.strategy,
        response.executed,
        response.decision.complexity_score
    );
    if response.deferred {
        println!("Deferred: hand this query to the generative pipeline.");
    }
    if response.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!();
    for result in &response.results {
        let sources: Vec<String> = result.sources.iter().map(ToString::to_string).collect();
        println!(
            "{:>3}. {}  score={:.4}  [{}]",
            result.final_rank,
            result.doc_id,
            result.combined_score,
            sources.join("+")
        );
    }
    println!();
    println!("{} result(s) in {} ms", response.len(), response.query_time_ms);
    Ok(())
}

fn output_json<T: Serialize>(result: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

fn print_value(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                if value.is_object() || value.is_array() {
                    println!("{pad}{key}:");
                    print_value(value, indent + 1);
                } else {
                    println!("{pad}{key}: {}", scalar(value));
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                if item.is_object() || item.is_array() {
                    println!("{pad}-");
                    print_value(item, indent + 1);
                } else {
                    println!("{pad}- {}", scalar(item));
                }
            }
        }
        other => println!("{pad}{}", scalar(other)),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
