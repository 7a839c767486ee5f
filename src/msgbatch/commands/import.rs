use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BatchError, Result};
use crate::model::{BatchItem, Draft};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Text,
    Json,
    JsonLines,
    Csv,
}

impl ImportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" => Ok(ImportFormat::Text),
            "json" => Ok(ImportFormat::Json),
            "jsonl" => Ok(ImportFormat::JsonLines),
            "csv" => Ok(ImportFormat::Csv),
            "" => Err(BatchError::validation(format!(
                "Unsupported file format: {} has no extension",
                path.display()
            ))),
            other => Err(BatchError::validation(format!(
                "Unsupported file format: .{}",
                other
            ))),
        }
    }
}

/// Settings every imported item inherits.
struct ImportContext<'a> {
    source: String,
    model: &'a str,
    max_tokens: u32,
}

impl ImportContext<'_> {
    fn default_id(&self, position: usize) -> String {
        format!("{}_{}", self.source, position)
    }

    fn item(&self, custom_id: String, content: &str) -> Result<BatchItem> {
        BatchItem::new(custom_id, self.model, self.max_tokens, content)
    }
}

/// Appends every prompt found in `path` to the draft. Nothing is appended if
/// the file cannot be parsed.
pub fn run(draft: &mut Draft, path: &Path, model: &str, max_tokens: u32) -> Result<CmdResult> {
    if model.trim().is_empty() {
        return Err(BatchError::validation("Model cannot be empty"));
    }
    if max_tokens == 0 {
        return Err(BatchError::validation("Max tokens must be a positive integer"));
    }

    let format = ImportFormat::from_path(path)?;
    let raw = fs::read_to_string(path)?;
    let ctx = ImportContext {
        source: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        model,
        max_tokens,
    };

    let mut result = CmdResult::default();
    let (items, skipped) = match format {
        ImportFormat::Text => (parse_text(&ctx, &raw)?, 0),
        ImportFormat::Json => parse_json(&ctx, &raw)?,
        ImportFormat::JsonLines => parse_json_lines(&ctx, &raw)?,
        ImportFormat::Csv => parse_csv(&ctx, &raw, &mut result)?,
    };

    for item in &items {
        draft.push(item.clone());
    }
    result.add_message(CmdMessage::success(format!(
        "Successfully imported {} prompt(s) from {}",
        items.len(),
        path.display()
    )));
    if skipped > 0 {
        result.add_message(CmdMessage::info(format!("Skipped {} entries", skipped)));
    }
    Ok(result.with_affected_items(items))
}

fn parse_text(ctx: &ImportContext, raw: &str) -> Result<Vec<BatchItem>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| ctx.item(ctx.default_id(i + 1), line.trim()))
        .collect()
}

fn parse_json(ctx: &ImportContext, raw: &str) -> Result<(Vec<BatchItem>, usize)> {
    let data: Value = serde_json::from_str(raw)
        .map_err(|e| BatchError::validation(format!("Invalid JSON file: {}", e)))?;
    let entries = match data {
        Value::Array(entries) => entries,
        Value::Object(_) => vec![data],
        _ => {
            return Err(BatchError::validation(
                "JSON file must contain an object or an array of objects",
            ));
        }
    };

    let mut items = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if let Some(item) = json_entry(ctx, entry, i + 1)? {
            items.push(item);
        }
    }
    let skipped = entries.len() - items.len();
    Ok((items, skipped))
}

fn parse_json_lines(ctx: &ImportContext, raw: &str) -> Result<(Vec<BatchItem>, usize)> {
    let mut items = Vec::new();
    let mut skipped = 0;
    for (i, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: Value = serde_json::from_str(line).map_err(|e| {
            BatchError::validation(format!("Invalid JSON on line {}: {}", i + 1, e))
        })?;
        match json_entry(ctx, &entry, i + 1)? {
            Some(item) => items.push(item),
            None => skipped += 1,
        }
    }
    Ok((items, skipped))
}

// Entries without usable content are dropped without comment.
fn json_entry(ctx: &ImportContext, entry: &Value, position: usize) -> Result<Option<BatchItem>> {
    let Some(object) = entry.as_object() else {
        return Ok(None);
    };
    let content = match object.get("content").and_then(Value::as_str) {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Ok(None),
    };
    let custom_id = object
        .get("custom_id")
        .or_else(|| object.get("customId"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| ctx.default_id(position));
    ctx.item(custom_id, content).map(Some)
}

fn parse_csv(
    ctx: &ImportContext,
    raw: &str,
    result: &mut CmdResult,
) -> Result<(Vec<BatchItem>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let mut records = reader.records();

    let header = records.next().transpose().map_err(invalid_csv)?;
    let header_ok = header.as_ref().is_some_and(|h| {
        h.len() == 2
            && h[0].trim().eq_ignore_ascii_case("custom_id")
            && h[1].trim().eq_ignore_ascii_case("content")
    });
    if !header_ok {
        return Err(BatchError::validation(
            "CSV file must have 'custom_id' and 'content' columns",
        ));
    }

    let mut items = Vec::new();
    let mut skipped = 0;
    for record in records {
        let record = record.map_err(invalid_csv)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() != 2 {
            let fields: Vec<&str> = record.iter().collect();
            warn!(line, columns = record.len(), "skipping csv row");
            result.add_message(CmdMessage::warning(format!(
                "Skipping invalid row at line {}: {:?}",
                line, fields
            )));
            skipped += 1;
            continue;
        }
        let content = record[1].trim();
        if content.is_empty() {
            result.add_message(CmdMessage::warning(format!(
                "Skipping row at line {}: empty content",
                line
            )));
            skipped += 1;
            continue;
        }
        let custom_id = record[0].trim();
        let custom_id = if custom_id.is_empty() {
            ctx.default_id(items.len() + 1)
        } else {
            custom_id.to_string()
        };
        items.push(ctx.item(custom_id, content)?);
    }
    Ok((items, skipped))
}

fn invalid_csv(error: csv::Error) -> BatchError {
    BatchError::validation(format!("Invalid CSV file: {}", error))
}
