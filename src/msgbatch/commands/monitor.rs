//! Pull-based tracking of submitted batches.
//!
//! A tracked batch starts as `Added` and only changes when the operator asks
//! for a refresh. Nothing here polls on its own.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::gateway::BatchGateway;
use crate::model::{MonitoredBatches, TrackedBatch};
use tracing::warn;

pub fn add_batch(monitored: &mut MonitoredBatches, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if monitored.contains(id) {
        result.add_message(CmdMessage::warning(format!(
            "Batch {} is already being monitored.",
            id
        )));
    } else {
        monitored.insert(id.to_string(), TrackedBatch::added());
        result.add_message(CmdMessage::success(format!(
            "Batch {} added to monitoring.",
            id
        )));
    }
    Ok(result)
}

pub fn update_status<G: BatchGateway>(
    gateway: &G,
    monitored: &mut MonitoredBatches,
    id: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if !monitored.contains(id) {
        result.add_message(not_monitored(id));
        return Ok(result);
    }

    match gateway.get_batch_status(id) {
        Ok(snapshot) => {
            monitored.insert(id.to_string(), TrackedBatch::from_snapshot(&snapshot));
            result.add_message(CmdMessage::info(format!(
                "Status updated for batch {}.",
                id
            )));
            Ok(result.with_batches(vec![snapshot]))
        }
        Err(e) => {
            warn!(id, error = %e, "status refresh failed");
            result.add_message(CmdMessage::error(format!(
                "Error updating status for batch {}: {}",
                id, e
            )));
            Ok(result)
        }
    }
}

/// Refreshes every tracked batch in id order; one failure does not stop the rest.
pub fn update_all<G: BatchGateway>(
    gateway: &G,
    monitored: &mut MonitoredBatches,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if monitored.is_empty() {
        result.add_message(CmdMessage::info("No active batches to monitor."));
        return Ok(result);
    }

    for id in monitored.ids() {
        let single = update_status(gateway, monitored, &id)?;
        result.batches.extend(single.batches);
        result.messages.extend(single.messages);
    }
    Ok(result)
}

pub fn remove_completed(monitored: &mut MonitoredBatches, id: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match monitored.get(id).map(|b| b.status) {
        None => result.add_message(not_monitored(id)),
        Some(status) if status.is_terminal() => {
            monitored.remove(id);
            result.add_message(CmdMessage::success(format!(
                "Batch {} removed from monitoring.",
                id
            )));
        }
        Some(status) => result.add_message(CmdMessage::warning(format!(
            "Batch {} is not completed (status: {}). Not removing.",
            id, status
        ))),
    }
    Ok(result)
}

pub fn status_of(monitored: &MonitoredBatches, id: &str) -> TrackedBatch {
    monitored
        .get(id)
        .cloned()
        .unwrap_or_else(TrackedBatch::not_monitored)
}

fn not_monitored(id: &str) -> CmdMessage {
    CmdMessage::warning(format!("Batch {} is not being monitored.", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchError;
    use crate::gateway::memory::InMemoryGateway;
    use crate::model::{
        BatchStatusSnapshot, ProcessingStatus, RequestCounts, TrackedStatus,
    };

    fn gateway() -> InMemoryGateway {
        InMemoryGateway::new()
            .with_batch(BatchStatusSnapshot::new("b1", ProcessingStatus::InProgress))
            .with_batch(BatchStatusSnapshot::new("b2", ProcessingStatus::Ended))
    }

    #[test]
    fn added_batch_starts_as_added() {
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b1").unwrap();
        assert_eq!(status_of(&monitored, "b1").status, TrackedStatus::Added);
    }

    #[test]
    fn adding_twice_warns_and_keeps_state() {
        let gateway = gateway();
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b1").unwrap();
        update_status(&gateway, &mut monitored, "b1").unwrap();
        let result = add_batch(&mut monitored, "b1").unwrap();
        assert!(result.has_warnings());
        assert_eq!(
            status_of(&monitored, "b1").status,
            TrackedStatus::Remote(ProcessingStatus::InProgress)
        );
    }

    #[test]
    fn update_overwrites_snapshot() {
        let gateway = gateway();
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b1").unwrap();
        update_status(&gateway, &mut monitored, "b1").unwrap();

        let counts = RequestCounts {
            succeeded: 4,
            ..RequestCounts::default()
        };
        gateway.set_status("b1", ProcessingStatus::Ended, counts);
        update_status(&gateway, &mut monitored, "b1").unwrap();

        let tracked = status_of(&monitored, "b1");
        assert_eq!(tracked.status, TrackedStatus::Remote(ProcessingStatus::Ended));
        assert_eq!(tracked.request_counts, counts);
    }

    #[test]
    fn update_untracked_is_a_noop() {
        let gateway = gateway();
        let mut monitored = MonitoredBatches::new();
        let result = update_status(&gateway, &mut monitored, "b1").unwrap();
        assert!(result.has_warnings());
        assert!(monitored.is_empty());
        assert_eq!(gateway.calls(), 0);
    }

    #[test]
    fn failed_refresh_keeps_previous_entry() {
        let gateway = gateway();
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b1").unwrap();
        gateway.fail_next(BatchError::MalformedResponse("x".into()));
        let result = update_status(&gateway, &mut monitored, "b1").unwrap();
        assert!(result.has_warnings());
        assert_eq!(status_of(&monitored, "b1").status, TrackedStatus::Added);
    }

    #[test]
    fn update_all_continues_past_failures() {
        let gateway = gateway();
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b1").unwrap();
        add_batch(&mut monitored, "b2").unwrap();
        gateway.fail_next(BatchError::MalformedResponse("x".into()));

        let result = update_all(&gateway, &mut monitored).unwrap();
        assert_eq!(result.batches.len(), 1);
        assert_eq!(status_of(&monitored, "b1").status, TrackedStatus::Added);
        assert_eq!(
            status_of(&monitored, "b2").status,
            TrackedStatus::Remote(ProcessingStatus::Ended)
        );
    }

    #[test]
    fn remove_completed_keeps_in_progress_batch() {
        let gateway = gateway();
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b1").unwrap();
        update_status(&gateway, &mut monitored, "b1").unwrap();

        let result = remove_completed(&mut monitored, "b1").unwrap();
        assert!(result.has_warnings());
        assert!(monitored.contains("b1"));
    }

    #[test]
    fn remove_completed_drops_ended_batch() {
        let gateway = gateway();
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b2").unwrap();
        update_status(&gateway, &mut monitored, "b2").unwrap();
        remove_completed(&mut monitored, "b2").unwrap();
        assert!(!monitored.contains("b2"));
    }

    #[test]
    fn freshly_added_batch_is_not_completed() {
        let mut monitored = MonitoredBatches::new();
        add_batch(&mut monitored, "b2").unwrap();
        remove_completed(&mut monitored, "b2").unwrap();
        assert!(monitored.contains("b2"));
    }

    #[test]
    fn status_of_untracked_reports_not_monitored() {
        let monitored = MonitoredBatches::new();
        assert_eq!(
            status_of(&monitored, "zzz").status,
            TrackedStatus::NotMonitored
        );
    }
}
