use std::path::Path;

use serde_json::Value;
use tokio::fs;
use tracing::warn;

use crate::error::{LogoError, Result};
use crate::models::{GenerationRequest, split_colors};

/// Reads a batch file. `.csv` files are parsed as CSV, `.json` as a JSON
/// array; anything else is sniffed from its first character.
pub async fn load_batch_file(path: &Path) -> Result<Vec<GenerationRequest>> {
    let text = fs::read_to_string(path).await?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => Ok(parse_csv(&text)),
        Some("json") => parse_json(&text),
        _ if text.trim_start().starts_with('[') => parse_json(&text),
        _ => Ok(parse_csv(&text)),
    }
}

/// Parses a JSON array of request objects. Entries that do not form a valid
/// request are skipped with a warning.
pub fn parse_json(text: &str) -> Result<Vec<GenerationRequest>> {
    let rows = match serde_json::from_str::<Value>(text)? {
        Value::Array(rows) => rows,
        _ => return Err(LogoError::validation("batch JSON must be an array of requests")),
    };
    let mut requests = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<GenerationRequest>(row) {
            Ok(request) if request.validate().is_ok() => requests.push(trimmed(request)),
            Ok(_) => warn!("batch entry {} is missing company or prompt, skipped", index),
            Err(err) => warn!("batch entry {} is invalid, skipped: {}", index, err),
        }
    }
    Ok(requests)
}

fn trimmed(mut request: GenerationRequest) -> GenerationRequest {
    request.company = request.company.trim().to_string();
    request.prompt = request.prompt.trim().to_string();
    request
}

/// Splits one CSV line, honouring double quotes and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

fn clean(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

#[derive(Debug, Default)]
struct Columns {
    company: Option<usize>,
    prompt: Option<usize>,
    style: Option<usize>,
    industry: Option<usize>,
    colors: Option<usize>,
    size: Option<usize>,
    quality: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Self {
        let mut columns = Columns::default();
        for (index, name) in split_csv_line(header).iter().enumerate() {
            let slot = match clean(name).to_ascii_lowercase().as_str() {
                "company" => &mut columns.company,
                "prompt" | "description" => &mut columns.prompt,
                "style" => &mut columns.style,
                "industry" => &mut columns.industry,
                "colors" | "colours" => &mut columns.colors,
                "size" => &mut columns.size,
                "quality" => &mut columns.quality,
                _ => continue,
            };
            slot.get_or_insert(index);
        }
        columns
    }
}

fn field<'a>(fields: &'a [String], column: Option<usize>) -> &'a str {
    column
        .and_then(|index| fields.get(index))
        .map(|value| clean(value))
        .unwrap_or("")
}

fn parse_optional<T: std::str::FromStr>(value: &str, line: usize) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("line {}: {}, ignored", line, err);
            None
        }
    }
}

/// Parses CSV with a header row. Rows without both a company and a prompt
/// (or description) are dropped.
pub fn parse_csv(text: &str) -> Vec<GenerationRequest> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        return Vec::new();
    };
    let columns = Columns::from_header(header);

    let mut requests = Vec::new();
    for (index, line) in lines {
        let line_number = index + 1;
        let fields = split_csv_line(line);
        let company = field(&fields, columns.company);
        let prompt = field(&fields, columns.prompt);
        if company.is_empty() || prompt.is_empty() {
            continue;
        }
        let colors = field(&fields, columns.colors);
        requests.push(GenerationRequest {
            company: company.to_string(),
            prompt: prompt.to_string(),
            style: parse_optional(field(&fields, columns.style), line_number),
            industry: parse_optional(field(&fields, columns.industry), line_number),
            colors: split_colors(colors),
            size: parse_optional(field(&fields, columns.size), line_number),
            quality: parse_optional(field(&fields, columns.quality), line_number),
        });
    }
    requests
}
