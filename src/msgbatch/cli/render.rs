//! Tables and messages as plain strings. Nothing here prints.
//!
//! Cells are padded by display width before styling, so ANSI codes never
//! throw the columns off.

use super::styles::{status_style, MSGBATCH_THEME};
use chrono::{DateTime, Utc};
use colored::Colorize;
use console::Style;
use msgbatch::commands::{CmdMessage, MessageLevel};
use msgbatch::model::{BatchItem, BatchStatusSnapshot, MonitoredBatches, ResultItem, TrackedStatus};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const CONTENT_WIDTH: usize = 50;
const COLUMN_GAP: &str = "  ";

struct Cell {
    text: String,
    style: &'static Style,
}

impl Cell {
    fn new(text: impl Into<String>, style: &'static Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

fn paint(style: &Style, text: &str, use_color: bool) -> String {
    style.clone().force_styling(use_color).apply_to(text).to_string()
}

fn render_table(title: &str, headers: &[&str], rows: &[Vec<Cell>], use_color: bool) -> String {
    let theme = &*MSGBATCH_THEME;
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.text.width());
        }
    }

    let mut output = String::new();
    output.push_str(&paint(&theme.title, title, use_color));
    output.push('\n');

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| paint(&theme.header, &pad_to_width(h, *w), use_color))
        .collect();
    output.push_str(header_line.join(COLUMN_GAP).trim_end());
    output.push('\n');

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| paint(cell.style, &pad_to_width(&cell.text, *w), use_color))
            .collect();
        output.push_str(line.join(COLUMN_GAP).trim_end());
        output.push('\n');
    }
    output
}

pub fn render_draft(items: &[BatchItem], use_color: bool) -> String {
    if items.is_empty() {
        return format!("{}\n", "The current draft is empty.".yellow());
    }
    let theme = &*MSGBATCH_THEME;
    let rows: Vec<Vec<Cell>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            vec![
                Cell::new(i.to_string(), &theme.index),
                Cell::new(item.custom_id.as_str(), &theme.id),
                Cell::new(item.model.as_str(), &theme.model),
                Cell::new(item.max_tokens.to_string(), &theme.number),
                Cell::new(preview(&item.content), &theme.content),
            ]
        })
        .collect();
    render_table(
        "Current Batch",
        &["Index", "Custom ID", "Model", "Max Tokens", "Content"],
        &rows,
        use_color,
    )
}

pub fn render_monitored(monitored: &MonitoredBatches, use_color: bool) -> String {
    if monitored.is_empty() {
        return format!("{}\n", "No active batches".yellow());
    }
    let theme = &*MSGBATCH_THEME;
    let rows: Vec<Vec<Cell>> = monitored
        .iter()
        .map(|(id, tracked)| {
            let counts = &tracked.request_counts;
            let count = |n: u64| match tracked.status {
                TrackedStatus::Added => "-".to_string(),
                _ => n.to_string(),
            };
            vec![
                Cell::new(id.as_str(), &theme.id),
                Cell::new(tracked.status.to_string(), status_style(tracked.status)),
                Cell::new(count(counts.processing), &theme.processing),
                Cell::new(count(counts.succeeded), &theme.succeeded),
                Cell::new(count(counts.errored), &theme.errored),
                Cell::new(count(counts.canceled), &theme.canceled),
                Cell::new(count(counts.expired), &theme.expired),
            ]
        })
        .collect();
    render_table(
        "Monitored Batches",
        &[
            "Batch ID",
            "Status",
            "Processing",
            "Succeeded",
            "Errored",
            "Canceled",
            "Expired",
        ],
        &rows,
        use_color,
    )
}

pub fn render_batches(batches: &[BatchStatusSnapshot], use_color: bool) -> String {
    let theme = &*MSGBATCH_THEME;
    let rows: Vec<Vec<Cell>> = batches
        .iter()
        .map(|batch| {
            vec![
                Cell::new(batch.id.as_str(), &theme.id),
                Cell::new(
                    batch.processing_status.to_string(),
                    status_style(TrackedStatus::Remote(batch.processing_status)),
                ),
                Cell::new(format_time(batch.created_at), &theme.muted),
            ]
        })
        .collect();
    render_table(
        "All Batches",
        &["Batch ID", "Status", "Created At"],
        &rows,
        use_color,
    )
}

pub fn render_results(id: &str, results: &[ResultItem], use_color: bool) -> String {
    let theme = &*MSGBATCH_THEME;
    let rows: Vec<Vec<Cell>> = results
        .iter()
        .map(|r| {
            let style = match r.status.as_str() {
                "succeeded" => &theme.succeeded,
                "errored" => &theme.errored,
                _ => &theme.muted,
            };
            vec![
                Cell::new(r.custom_id.as_str(), &theme.id),
                Cell::new(r.status.as_str(), style),
                Cell::new(preview(&r.content), &theme.content),
            ]
        })
        .collect();
    render_table(
        &format!("Results for Batch {}", id),
        &["Custom ID", "Status", "Content"],
        &rows,
        use_color,
    )
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let line = match m.level {
                MessageLevel::Info => m.content.dimmed(),
                MessageLevel::Success => m.content.green(),
                MessageLevel::Warning => m.content.yellow(),
                MessageLevel::Error => m.content.red(),
            };
            format!("{}\n", line)
        })
        .collect()
}

fn format_time(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// First line of `content`, cut to the table's content width.
fn preview(content: &str) -> String {
    let mut lines = content.lines();
    let truncated = truncate_to_width(lines.next().unwrap_or_default(), CONTENT_WIDTH);
    if lines.next().is_some() && !truncated.ends_with('…') {
        format!("{}…", truncated)
    } else {
        truncated
    }
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgbatch::model::{ProcessingStatus, RequestCounts};

    fn item(id: &str, content: &str) -> BatchItem {
        BatchItem::new(id, "claude", 100, content).unwrap()
    }

    #[test]
    fn test_render_empty_draft() {
        let output = render_draft(&[], false);
        assert!(output.contains("The current draft is empty."));
    }

    #[test]
    fn test_render_draft_columns_align() {
        let output = render_draft(&[item("a", "short"), item("longer_id", "x")], false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Current Batch");
        assert!(lines[1].starts_with("Index  Custom ID"));
        let model_col = lines[2].find("claude").unwrap();
        assert_eq!(lines[3].find("claude").unwrap(), model_col);
    }

    #[test]
    fn test_long_content_is_truncated() {
        let long = "word ".repeat(40);
        let output = render_draft(&[item("a", &long)], false);
        assert!(output.contains('…'));
        assert!(!output.contains(long.trim()));
    }

    #[test]
    fn test_truncate_to_width_handles_wide_chars() {
        let truncated = truncate_to_width("日本語のテキスト", 7);
        assert!(truncated.width() <= 7);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncate_to_width("fits", 10), "fits");
    }

    #[test]
    fn test_render_monitored_added_shows_dashes() {
        let mut monitored = MonitoredBatches::new();
        msgbatch::commands::monitor::add_batch(&mut monitored, "batch_1").unwrap();
        let output = render_monitored(&monitored, false);
        assert!(output.contains("batch_1"));
        assert!(output.contains("Added"));
        assert!(output.contains('-'));
    }

    #[test]
    fn test_render_empty_monitored() {
        let output = render_monitored(&MonitoredBatches::new(), false);
        assert!(output.contains("No active batches"));
    }

    #[test]
    fn test_render_batches_without_created_at() {
        let batch = BatchStatusSnapshot::new("b1", ProcessingStatus::Ended).with_counts(
            RequestCounts {
                succeeded: 1,
                ..RequestCounts::default()
            },
        );
        let output = render_batches(&[batch], false);
        assert!(output.contains("b1"));
        assert!(output.contains("ended"));
        assert!(output.contains("N/A"));
    }

    #[test]
    fn test_render_with_color_keeps_text() {
        let output = render_draft(&[item("colored", "body")], true);
        assert!(output.contains("colored"));
    }

    #[test]
    fn test_render_results() {
        let results = vec![ResultItem {
            custom_id: "q1".into(),
            status: "succeeded".into(),
            content: "Paris".into(),
        }];
        let output = render_results("batch_9", &results, false);
        assert!(output.starts_with("Results for Batch batch_9"));
        assert!(output.contains("Paris"));
    }

    #[test]
    fn test_render_messages_multiple() {
        let messages = vec![
            CmdMessage::info("Info message"),
            CmdMessage::warning("Warning message"),
            CmdMessage::error("Error message"),
        ];
        let output = render_messages(&messages);
        assert!(output.contains("Info message"));
        assert!(output.contains("Warning message"));
        assert!(output.contains("Error message"));
    }
}
