//! # Gateway Layer
//!
//! The [`BatchGateway`] trait is the only seam between msgbatch and the remote
//! Message Batches service. Commands are generic over it, so the same logic
//! runs against the real API or a scripted backend.
//!
//! ## Implementations
//!
//! - [`http::HttpGateway`]: production client (blocking `reqwest`)
//!   - JSON request/response bodies
//!   - results streamed as newline-delimited JSON
//!
//! - [`memory::InMemoryGateway`]: scripted backend for tests
//!   - records created batches
//!   - serves preset statuses and results
//!
//! Every call is a single attempt. There is no retry and no pagination beyond
//! the `limit` passed to [`BatchGateway::list_batches`].

use crate::error::{BatchError, Result};
use crate::model::{BatchHandle, BatchItem, BatchStatusSnapshot, ResultItem};
use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;

pub mod http;
pub mod memory;

/// Lazy, finite, non-restartable sequence of batch results.
pub type ResultStream = Box<dyn Iterator<Item = Result<ResultItem>>>;

pub trait BatchGateway {
    /// Submit the items as one batch job
    fn create_batch(&self, items: &[BatchItem]) -> Result<BatchHandle>;

    /// Fetch the current status of a batch
    fn get_batch_status(&self, id: &str) -> Result<BatchStatusSnapshot>;

    /// Stream per-item results of an ended batch
    fn get_batch_results(&self, id: &str) -> Result<ResultStream>;

    /// Most recent batches in the workspace
    fn list_batches(&self, limit: u32) -> Result<Vec<BatchStatusSnapshot>>;

    /// Request cancellation; the returned snapshot reflects the new status
    fn cancel_batch(&self, id: &str) -> Result<BatchStatusSnapshot>;
}

impl<G: BatchGateway + ?Sized> BatchGateway for &G {
    fn create_batch(&self, items: &[BatchItem]) -> Result<BatchHandle> {
        (**self).create_batch(items)
    }

    fn get_batch_status(&self, id: &str) -> Result<BatchStatusSnapshot> {
        (**self).get_batch_status(id)
    }

    fn get_batch_results(&self, id: &str) -> Result<ResultStream> {
        (**self).get_batch_results(id)
    }

    fn list_batches(&self, limit: u32) -> Result<Vec<BatchStatusSnapshot>> {
        (**self).list_batches(limit)
    }

    fn cancel_batch(&self, id: &str) -> Result<BatchStatusSnapshot> {
        (**self).cancel_batch(id)
    }
}

/// Reads result lines from a buffered body. Blank lines are skipped; the first
/// malformed line is yielded as an error and ends the stream.
pub struct NdjsonResults<R> {
    reader: R,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> NdjsonResults<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for NdjsonResults<R> {
    type Item = Result<ResultItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {
                    self.line_number += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    let parsed = decode_result_line(&line).map_err(|e| {
                        BatchError::MalformedResponse(format!(
                            "result line {}: {}",
                            self.line_number, e
                        ))
                    });
                    if parsed.is_err() {
                        self.done = true;
                    }
                    return Some(parsed);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(BatchError::Io(e)));
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct ResultLine {
    custom_id: String,
    result: ResultBody,
}

#[derive(Deserialize)]
struct ResultBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<MessageBody>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub fn decode_result_line(line: &str) -> serde_json::Result<ResultItem> {
    let raw: ResultLine = serde_json::from_str(line.trim())?;
    let content = match (&raw.result.message, &raw.result.error) {
        (Some(message), _) => message
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join(""),
        (None, Some(error)) => error_message(error),
        (None, None) => String::new(),
    };
    Ok(ResultItem {
        custom_id: raw.custom_id,
        status: raw.result.kind,
        content,
    })
}

// Errors nest as {"error": {"type": ..., "message": ...}} at varying depth.
fn error_message(value: &Value) -> String {
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    match value.get("error") {
        Some(inner) => error_message(inner),
        None => value.to_string(),
    }
}
