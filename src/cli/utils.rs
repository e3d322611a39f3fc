use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::crud::{Notice, NoticeLevel};
use crate::error::FieldErrors;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(body)) = (data, response.as_object_mut()) {
                body.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Notices are part of the JSON document; in text mode they go to stderr
pub fn output_notices(output_format: &OutputFormat, notices: &[Notice]) {
    if let OutputFormat::Text = output_format {
        for notice in notices {
            match notice.level {
                NoticeLevel::Success => eprintln!("✓ {}", notice.message),
                NoticeLevel::Error => eprintln!("✗ {}", notice.message),
            }
        }
    }
}

/// JSON mode prints `document` with its notices; text mode runs `text`
pub fn output_document<T, F>(output_format: &OutputFormat, document: &T, notices: &[Notice], text: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": true,
                "data": document,
                "notices": notices,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            text(document);
            output_notices(output_format, notices);
        }
    }
    Ok(())
}

pub fn output_field_errors(output_format: &OutputFormat, field_errors: &FieldErrors) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": "validation failed",
                    "field_errors": field_errors,
                }))?
            );
        }
        OutputFormat::Text => {
            for (field, messages) in field_errors {
                eprintln!("  {}: {}", field, messages.join(", "));
            }
        }
    }
    Ok(())
}

/// Left-aligned table; the last column is not padded
pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i + 1 == cells.len() {
                    c.clone()
                } else {
                    format!("{:<width$}", c, width = widths.get(i).copied().unwrap_or(0))
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(headers));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        println!("{}", line(row));
    }
}

