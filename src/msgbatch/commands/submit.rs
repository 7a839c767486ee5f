use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BatchError, Result};
use crate::gateway::BatchGateway;
use crate::model::Draft;
use tracing::info;

/// Why a submission failed, for user-facing messaging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitFailure {
    MalformedResponse,
    ConnectionFailure,
    Timeout,
    Unexpected,
}

impl SubmitFailure {
    pub fn classify(error: &BatchError) -> Self {
        match error {
            BatchError::MalformedResponse(_) => SubmitFailure::MalformedResponse,
            e if e.is_timeout() => SubmitFailure::Timeout,
            e if e.is_connection() => SubmitFailure::ConnectionFailure,
            _ => SubmitFailure::Unexpected,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            SubmitFailure::MalformedResponse => {
                "The API response was not in the expected format. Please check the API documentation."
            }
            SubmitFailure::ConnectionFailure => {
                "There was a problem connecting to the API. Please check your internet connection and try again."
            }
            SubmitFailure::Timeout => {
                "The API request timed out. The server might be overloaded, please try again later."
            }
            SubmitFailure::Unexpected => {
                "An unexpected error occurred. Please contact support if this problem persists."
            }
        }
    }
}

/// Sends the draft as one batch. Single attempt; the draft is left as is.
pub fn run<G: BatchGateway>(gateway: &G, draft: &Draft) -> Result<CmdResult> {
    if draft.is_empty() {
        return Err(BatchError::validation(
            "The draft is empty. Add or import prompts before submitting.",
        ));
    }

    let mut result = CmdResult::default();
    let duplicates = draft.duplicate_ids();
    if !duplicates.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "Duplicate custom IDs in draft: {}",
            duplicates.join(", ")
        )));
    }

    let handle = gateway.create_batch(draft.items())?;
    info!(id = %handle.id, count = draft.len(), "batch submitted");
    result.add_message(CmdMessage::success(format!(
        "Batch submitted successfully. Batch ID: {}",
        handle.id
    )));
    Ok(result.with_handle(handle))
}
