use super::{BatchGateway, ResultStream};
use crate::error::{BatchError, Result};
use crate::model::{
    BatchHandle, BatchItem, BatchStatusSnapshot, ProcessingStatus, RequestCounts, ResultItem,
};
use chrono::Utc;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

/// Scripted in-process gateway. Ids are assigned as `batch_1`, `batch_2`, ...
#[derive(Default)]
pub struct InMemoryGateway {
    state: RefCell<State>,
}

#[derive(Default)]
struct State {
    next_id: usize,
    order: Vec<String>,
    batches: BTreeMap<String, BatchStatusSnapshot>,
    submitted: BTreeMap<String, Vec<BatchItem>>,
    results: BTreeMap<String, Vec<ResultItem>>,
    failures: VecDeque<BatchError>,
    calls: usize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a batch as if it had been created elsewhere.
    pub fn with_batch(self, snapshot: BatchStatusSnapshot) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.order.push(snapshot.id.clone());
            state.batches.insert(snapshot.id.clone(), snapshot);
        }
        self
    }

    pub fn with_results(self, id: &str, results: Vec<ResultItem>) -> Self {
        self.state
            .borrow_mut()
            .results
            .insert(id.to_string(), results);
        self
    }

    pub fn set_status(&self, id: &str, status: ProcessingStatus, counts: RequestCounts) {
        let mut state = self.state.borrow_mut();
        let snapshot = state
            .batches
            .entry(id.to_string())
            .or_insert_with(|| BatchStatusSnapshot::new(id, status));
        snapshot.processing_status = status;
        snapshot.request_counts = counts;
    }

    /// The next call returns `error` instead of doing its work.
    pub fn fail_next(&self, error: BatchError) {
        self.state.borrow_mut().failures.push_back(error);
    }

    pub fn submitted(&self, id: &str) -> Option<Vec<BatchItem>> {
        self.state.borrow().submitted.get(id).cloned()
    }

    /// Number of gateway calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.state.borrow().calls
    }

    fn begin_call(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn snapshot(&self, id: &str) -> Result<BatchStatusSnapshot> {
        self.state
            .borrow()
            .batches
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &str) -> BatchError {
    BatchError::Api {
        status: 404,
        body: format!("{{\"error\":{{\"type\":\"not_found_error\",\"message\":\"{}\"}}}}", id),
    }
}

impl BatchGateway for InMemoryGateway {
    fn create_batch(&self, items: &[BatchItem]) -> Result<BatchHandle> {
        self.begin_call()?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = format!("batch_{}", state.next_id);
        let counts = RequestCounts {
            processing: items.len() as u64,
            ..RequestCounts::default()
        };
        let created_at = Utc::now();
        let mut snapshot =
            BatchStatusSnapshot::new(id.clone(), ProcessingStatus::InProgress).with_counts(counts);
        snapshot.created_at = Some(created_at);
        state.order.push(id.clone());
        state.batches.insert(id.clone(), snapshot);
        state.submitted.insert(id.clone(), items.to_vec());
        Ok(BatchHandle { id, created_at })
    }

    fn get_batch_status(&self, id: &str) -> Result<BatchStatusSnapshot> {
        self.begin_call()?;
        self.snapshot(id)
    }

    fn get_batch_results(&self, id: &str) -> Result<ResultStream> {
        self.begin_call()?;
        let results = self
            .state
            .borrow()
            .results
            .get(id)
            .cloned()
            .unwrap_or_default();
        Ok(Box::new(results.into_iter().map(Ok)))
    }

    fn list_batches(&self, limit: u32) -> Result<Vec<BatchStatusSnapshot>> {
        self.begin_call()?;
        let state = self.state.borrow();
        Ok(state
            .order
            .iter()
            .rev()
            .take(limit as usize)
            .filter_map(|id| state.batches.get(id).cloned())
            .collect())
    }

    fn cancel_batch(&self, id: &str) -> Result<BatchStatusSnapshot> {
        self.begin_call()?;
        let mut state = self.state.borrow_mut();
        let snapshot = state.batches.get_mut(id).ok_or_else(|| not_found(id))?;
        if snapshot.processing_status == ProcessingStatus::InProgress {
            snapshot.processing_status = ProcessingStatus::Canceling;
        }
        Ok(snapshot.clone())
    }
}
