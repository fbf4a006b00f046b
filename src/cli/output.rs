//! Rendering of command results

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Single-line JSON
    JsonCompact,
    /// CSV, one row per record
    Csv,
}

/// Print `data` or save it to `output`
pub fn emit(data: &Value, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let formatted = format_output(data, format)?;

    match output {
        Some(path) => {
            fs::write(path, &formatted)
                .with_context(|| format!("Failed to write output to: {}", path.display()))?;
            println!("💾 Results saved to: {}", path.display().to_string().bright_green());
        }
        None => println!("{}", formatted),
    }

    Ok(())
}

pub fn format_output(data: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).context("Failed to format JSON output")
        }
        OutputFormat::JsonCompact => {
            serde_json::to_string(data).context("Failed to format JSON output")
        }
        OutputFormat::Csv => Ok(json_to_csv(data)),
    }
}

fn json_to_csv(data: &Value) -> String {
    match data {
        Value::Array(rows) => {
            let Some(Value::Object(first)) = rows.first() else {
                return "No data\n".to_string();
            };

            let headers: Vec<&String> = first.keys().collect();
            let mut csv = headers
                .iter()
                .map(|header| csv_escape(header))
                .collect::<Vec<_>>()
                .join(",");
            csv.push('\n');

            for row in rows.iter().filter_map(Value::as_object) {
                let cells: Vec<String> = headers
                    .iter()
                    .map(|header| csv_escape(&value_to_string(row.get(*header).unwrap_or(&Value::Null))))
                    .collect();
                csv.push_str(&cells.join(","));
                csv.push('\n');
            }
            csv
        }
        Value::Object(fields) => {
            let mut csv = String::from("key,value\n");
            for (key, value) in fields {
                csv.push_str(&format!("{},{}\n", csv_escape(key), csv_escape(&value_to_string(value))));
            }
            csv
        }
        _ => format!("value\n{}\n", csv_escape(&value_to_string(data))),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
