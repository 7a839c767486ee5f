//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point the terminal menu (or any other client) uses.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns** the gateway and the set of monitored batches
//! - **Dispatches** to the appropriate command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! The [`Draft`] is not owned here. Callers hold it and pass it by reference,
//! so a session can keep, replace or inspect it without going through the API.
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **I/O operations**: no stdout, stderr or prompts
//! - **Presentation concerns**: returns data structures, not strings
//!
//! ## Generic Over BatchGateway
//!
//! `BatchApi<G: BatchGateway>` is generic over the remote backend:
//! - Production: `BatchApi<HttpGateway>`
//! - Testing: `BatchApi<InMemoryGateway>`

use crate::commands::manage::BatchResults;
use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::gateway::BatchGateway;
use crate::model::{Draft, ItemEdit, MonitoredBatches, TrackedBatch};
use std::path::Path;

pub struct BatchApi<G: BatchGateway> {
    gateway: G,
    monitor: MonitoredBatches,
}

impl<G: BatchGateway> BatchApi<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            monitor: MonitoredBatches::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn monitored(&self) -> &MonitoredBatches {
        &self.monitor
    }

    // Draft

    pub fn new_draft(&self, draft: &mut Draft) -> Result<CmdResult> {
        commands::draft::new_draft(draft)
    }

    pub fn add_item(
        &self,
        draft: &mut Draft,
        custom_id: String,
        model: String,
        max_tokens: u32,
        content: String,
    ) -> Result<CmdResult> {
        commands::draft::add_item(draft, custom_id, model, max_tokens, content)
    }

    pub fn edit_item(&self, draft: &mut Draft, index: usize, edit: &ItemEdit) -> Result<CmdResult> {
        commands::draft::edit_item(draft, index, edit)
    }

    pub fn remove_item(&self, draft: &mut Draft, index: usize) -> Result<CmdResult> {
        commands::draft::remove_item(draft, index)
    }

    pub fn view_draft(&self, draft: &Draft) -> Result<CmdResult> {
        commands::draft::view_draft(draft)
    }

    pub fn import_file(
        &self,
        draft: &mut Draft,
        path: &Path,
        model: &str,
        max_tokens: u32,
    ) -> Result<CmdResult> {
        commands::import::run(draft, path, model, max_tokens)
    }

    // Submit

    pub fn submit(&self, draft: &Draft) -> Result<CmdResult> {
        commands::submit::run(&self.gateway, draft)
    }

    // Monitor

    pub fn add_batch(&mut self, id: &str) -> Result<CmdResult> {
        commands::monitor::add_batch(&mut self.monitor, id)
    }

    pub fn update_status(&mut self, id: &str) -> Result<CmdResult> {
        commands::monitor::update_status(&self.gateway, &mut self.monitor, id)
    }

    pub fn update_all(&mut self) -> Result<CmdResult> {
        commands::monitor::update_all(&self.gateway, &mut self.monitor)
    }

    pub fn remove_completed(&mut self, id: &str) -> Result<CmdResult> {
        commands::monitor::remove_completed(&mut self.monitor, id)
    }

    pub fn status_of(&self, id: &str) -> TrackedBatch {
        commands::monitor::status_of(&self.monitor, id)
    }

    // Manage

    pub fn list_all(&self, limit: u32) -> Result<CmdResult> {
        commands::manage::list_all(&self.gateway, limit)
    }

    pub fn details(&self, id: &str) -> Result<CmdResult> {
        commands::manage::details(&self.gateway, id)
    }

    pub fn cancel(&self, id: &str) -> Result<CmdResult> {
        commands::manage::cancel(&self.gateway, id)
    }

    pub fn status_summary(&self, id: &str) -> Result<CmdResult> {
        commands::manage::status_summary(&self.gateway, id)
    }

    pub fn retrieve_results(&self, id: &str) -> Result<BatchResults> {
        commands::manage::retrieve_results(&self.gateway, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use crate::model::{BatchStatusSnapshot, ProcessingStatus, TrackedStatus};

    fn api() -> BatchApi<InMemoryGateway> {
        BatchApi::new(InMemoryGateway::new())
    }

    fn one_item_draft(api: &BatchApi<InMemoryGateway>) -> Draft {
        let mut draft = Draft::new();
        api.add_item(&mut draft, "req1".into(), "m".into(), 50, "hi".into())
            .unwrap();
        draft
    }

    #[test]
    fn submit_then_track_registers_added() {
        let mut api = api();
        let draft = one_item_draft(&api);
        let result = api.submit(&draft).unwrap();
        let handle = result.handle.unwrap();
        assert_eq!(handle.id, "batch_1");

        api.add_batch(&handle.id).unwrap();
        assert_eq!(api.status_of("batch_1").status, TrackedStatus::Added);
        assert_eq!(api.monitored().len(), 1);
    }

    #[test]
    fn update_status_uses_owned_gateway() {
        let mut api = api();
        let draft = one_item_draft(&api);
        let id = api.submit(&draft).unwrap().handle.unwrap().id;
        api.add_batch(&id).unwrap();
        api.update_status(&id).unwrap();
        assert_eq!(
            api.status_of(&id).status,
            TrackedStatus::Remote(ProcessingStatus::InProgress)
        );
        assert_eq!(api.gateway().calls(), 2);
    }

    #[test]
    fn results_for_in_progress_batch_are_empty() {
        let api = BatchApi::new(
            InMemoryGateway::new()
                .with_batch(BatchStatusSnapshot::new("batch_x", ProcessingStatus::InProgress)),
        );
        let results = api.retrieve_results("batch_x").unwrap();
        assert_eq!(results.status, ProcessingStatus::InProgress);
        assert_eq!(results.items.count(), 0);
    }

    #[test]
    fn draft_edits_dispatch() {
        let api = api();
        let mut draft = one_item_draft(&api);
        api.edit_item(&mut draft, 0, &ItemEdit::Model("other".into()))
            .unwrap();
        assert_eq!(draft.get(0).unwrap().model, "other");
        api.remove_item(&mut draft, 0).unwrap();
        assert!(api.view_draft(&draft).unwrap().affected_items.is_empty());
    }
}
