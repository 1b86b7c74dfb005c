//! Output formatting and display utilities for the CLI

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Print `data` as JSON or YAML, or hand it to `text` for human output.
pub fn render<T, F>(format: OutputFormat, data: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match format.resolve() {
        OutputFormat::Auto => unreachable!("Auto should be resolved"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
            print!("{yaml}");
        }
        OutputFormat::Text => text(data),
    }
    Ok(())
}

/// Print a `label  value` line with the label dimmed, as used by detail views
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    use colored::Colorize;
    const LABEL_WIDTH: usize = 16;
    let label = format!("{label:LABEL_WIDTH$}");
    println!("  {}{value}", label.dimmed());
}

/// Print a JSON value as plain text
pub fn print_value_as_text(value: &serde_json::Value) {
    match value {
        serde_json::Value::String(s) => println!("{s}"),
        serde_json::Value::Number(n) => println!("{n}"),
        serde_json::Value::Bool(b) => println!("{b}"),
        serde_json::Value::Null => println!("null"),
        serde_json::Value::Array(arr) => {
            for item in arr {
                print_value_as_text(item);
            }
        }
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::String(s) => println!("{key} = \"{s}\""),
                    serde_json::Value::Number(n) => println!("{key} = {n}"),
                    serde_json::Value::Bool(b) => println!("{key} = {b}"),
                    _ => println!(
                        "{} = {}",
                        key,
                        serde_json::to_string_pretty(val).unwrap_or_default()
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_formats() {
        let data = json!({ "chain_id": 8453, "label": "base" });
        for format in [OutputFormat::Json, OutputFormat::Yaml, OutputFormat::Text] {
            let mut called = false;
            render(format, &data, |_| called = true).unwrap();
            assert_eq!(called, format == OutputFormat::Text);
        }
    }
}
