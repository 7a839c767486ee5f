use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::gateway::{BatchGateway, ResultStream};
use crate::model::{BatchStatusSnapshot, ProcessingStatus};
use std::fmt::Write;

/// Results of one batch. `items` is empty unless `status` is `Ended`.
pub struct BatchResults {
    pub status: ProcessingStatus,
    pub items: ResultStream,
}

impl BatchResults {
    pub fn is_ready(&self) -> bool {
        self.status == ProcessingStatus::Ended
    }
}

pub fn list_all<G: BatchGateway>(gateway: &G, limit: u32) -> Result<CmdResult> {
    let batches = gateway.list_batches(limit)?;
    let mut result = CmdResult::default();
    if batches.is_empty() {
        result.add_message(CmdMessage::info("No batches found."));
    }
    Ok(result.with_batches(batches))
}

pub fn details<G: BatchGateway>(gateway: &G, id: &str) -> Result<CmdResult> {
    let snapshot = gateway.get_batch_status(id)?;
    Ok(CmdResult::default().with_batches(vec![snapshot]))
}

pub fn cancel<G: BatchGateway>(gateway: &G, id: &str) -> Result<CmdResult> {
    let snapshot = gateway.cancel_batch(id)?;
    let mut result = CmdResult::default();
    if snapshot.processing_status == ProcessingStatus::Canceling {
        result.cancel_accepted = true;
        result.add_message(CmdMessage::success(format!(
            "Batch {} is being canceled.",
            id
        )));
    } else {
        result.add_message(CmdMessage::warning(format!(
            "Unexpected status after cancellation: {}",
            snapshot.processing_status
        )));
    }
    Ok(result.with_batches(vec![snapshot]))
}

pub fn status_summary<G: BatchGateway>(gateway: &G, id: &str) -> Result<CmdResult> {
    let snapshot = gateway.get_batch_status(id)?;
    let summary = format_summary(&snapshot);
    Ok(CmdResult::default()
        .with_summary(summary)
        .with_batches(vec![snapshot]))
}

pub fn format_summary(snapshot: &BatchStatusSnapshot) -> String {
    let counts = &snapshot.request_counts;
    let total = counts.total();
    let mut summary = String::new();
    let _ = writeln!(
        summary,
        "Batch {} - Status: {}",
        snapshot.id, snapshot.processing_status
    );
    let _ = writeln!(summary, "Total requests: {}", total);
    for (kind, count) in counts.entries() {
        let percentage = if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            summary,
            "{}: {} ({:.1}%)",
            capitalize(kind),
            count,
            percentage
        );
    }
    summary
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Checks the status first; an unfinished batch yields no results rather than an error.
pub fn retrieve_results<G: BatchGateway>(gateway: &G, id: &str) -> Result<BatchResults> {
    let status = gateway.get_batch_status(id)?.processing_status;
    if status != ProcessingStatus::Ended {
        return Ok(BatchResults {
            status,
            items: Box::new(std::iter::empty()),
        });
    }
    Ok(BatchResults {
        status,
        items: gateway.get_batch_results(id)?,
    })
}
