use crate::error::{BatchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One request in a draft: a single user message sent to `model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub custom_id: String,
    pub model: String,
    pub max_tokens: u32,
    pub content: String,
}

impl BatchItem {
    pub fn new(
        custom_id: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        content: impl Into<String>,
    ) -> Result<Self> {
        let item = Self {
            custom_id: custom_id.into(),
            model: model.into(),
            max_tokens,
            content: content.into(),
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<()> {
        if self.custom_id.trim().is_empty() {
            return Err(BatchError::validation("Custom ID cannot be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(BatchError::validation("Model cannot be empty"));
        }
        if self.max_tokens == 0 {
            return Err(BatchError::validation("Max tokens must be a positive integer"));
        }
        if self.content.trim().is_empty() {
            return Err(BatchError::validation("Content cannot be empty"));
        }
        Ok(())
    }
}

/// Editable fields of a [`BatchItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    CustomId,
    Model,
    MaxTokens,
    Content,
}

impl ItemField {
    pub const ALL: [ItemField; 4] = [
        ItemField::CustomId,
        ItemField::Model,
        ItemField::MaxTokens,
        ItemField::Content,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemField::CustomId => "custom_id",
            ItemField::Model => "model",
            ItemField::MaxTokens => "max_tokens",
            ItemField::Content => "content",
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemField {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "customid" => Ok(ItemField::CustomId),
            "model" => Ok(ItemField::Model),
            "maxtokens" => Ok(ItemField::MaxTokens),
            "content" => Ok(ItemField::Content),
            _ => Err(BatchError::validation(format!("Invalid field: {}", s))),
        }
    }
}

/// A typed field-level edit. Values are already coerced to the field's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEdit {
    CustomId(String),
    Model(String),
    MaxTokens(u32),
    Content(String),
}

impl ItemEdit {
    /// Builds an edit from raw console input, rejecting non-numeric token counts.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        let field = ItemField::from_str(field)?;
        Self::for_field(field, value)
    }

    pub fn for_field(field: ItemField, value: &str) -> Result<Self> {
        Ok(match field {
            ItemField::CustomId => ItemEdit::CustomId(value.to_string()),
            ItemField::Model => ItemEdit::Model(value.to_string()),
            ItemField::MaxTokens => ItemEdit::MaxTokens(parse_max_tokens(value)?),
            ItemField::Content => ItemEdit::Content(value.to_string()),
        })
    }

    pub fn field(&self) -> ItemField {
        match self {
            ItemEdit::CustomId(_) => ItemField::CustomId,
            ItemEdit::Model(_) => ItemField::Model,
            ItemEdit::MaxTokens(_) => ItemField::MaxTokens,
            ItemEdit::Content(_) => ItemField::Content,
        }
    }

    pub fn apply_to(&self, item: &mut BatchItem) {
        match self {
            ItemEdit::CustomId(v) => item.custom_id = v.clone(),
            ItemEdit::Model(v) => item.model = v.clone(),
            ItemEdit::MaxTokens(v) => item.max_tokens = *v,
            ItemEdit::Content(v) => item.content = v.clone(),
        }
    }
}

pub fn parse_max_tokens(value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(BatchError::validation(format!(
            "Max tokens must be a positive integer, got '{}'",
            value.trim()
        ))),
    }
}

/// The batch being assembled. Order is the order requests are submitted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    items: Vec<BatchItem>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BatchItem> {
        self.items.get(index)
    }

    pub(crate) fn push(&mut self, item: BatchItem) {
        self.items.push(item);
    }

    pub(crate) fn replace(&mut self, index: usize, item: BatchItem) {
        self.items[index] = item;
    }

    pub(crate) fn remove(&mut self, index: usize) -> BatchItem {
        self.items.remove(index)
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    /// Custom IDs that appear more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = BTreeMap::new();
        let mut dups = Vec::new();
        for item in &self.items {
            let count = seen.entry(item.custom_id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                dups.push(item.custom_id.clone());
            }
        }
        dups
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHandle {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    InProgress,
    Ended,
    Canceling,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl ProcessingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Ended | ProcessingStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::InProgress => "in_progress",
            ProcessingStatus::Ended => "ended",
            ProcessingStatus::Canceling => "canceling",
            ProcessingStatus::Canceled => "canceled",
            ProcessingStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestCounts {
    pub processing: u64,
    pub succeeded: u64,
    pub errored: u64,
    pub canceled: u64,
    pub expired: u64,
}

impl RequestCounts {
    pub fn total(&self) -> u64 {
        self.processing + self.succeeded + self.errored + self.canceled + self.expired
    }

    pub fn entries(&self) -> [(&'static str, u64); 5] {
        [
            ("processing", self.processing),
            ("succeeded", self.succeeded),
            ("errored", self.errored),
            ("canceled", self.canceled),
            ("expired", self.expired),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatusSnapshot {
    pub id: String,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub request_counts: RequestCounts,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results_url: Option<String>,
}

impl BatchStatusSnapshot {
    pub fn new(id: impl Into<String>, processing_status: ProcessingStatus) -> Self {
        Self {
            id: id.into(),
            processing_status,
            request_counts: RequestCounts::default(),
            created_at: None,
            ended_at: None,
            expires_at: None,
            results_url: None,
        }
    }

    pub fn with_counts(mut self, request_counts: RequestCounts) -> Self {
        self.request_counts = request_counts;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub custom_id: String,
    pub status: String,
    pub content: String,
}

/// Monitor-side view of a batch: `Added` until the first refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedStatus {
    Added,
    Remote(ProcessingStatus),
    NotMonitored,
}

impl TrackedStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackedStatus::Remote(status) if status.is_terminal())
    }
}

impl fmt::Display for TrackedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackedStatus::Added => f.write_str("Added"),
            TrackedStatus::Remote(status) => write!(f, "{}", status),
            TrackedStatus::NotMonitored => f.write_str("Not monitored"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedBatch {
    pub status: TrackedStatus,
    pub request_counts: RequestCounts,
}

impl TrackedBatch {
    pub fn added() -> Self {
        Self {
            status: TrackedStatus::Added,
            request_counts: RequestCounts::default(),
        }
    }

    pub fn not_monitored() -> Self {
        Self {
            status: TrackedStatus::NotMonitored,
            request_counts: RequestCounts::default(),
        }
    }

    pub fn from_snapshot(snapshot: &BatchStatusSnapshot) -> Self {
        Self {
            status: TrackedStatus::Remote(snapshot.processing_status),
            request_counts: snapshot.request_counts,
        }
    }
}

/// Batches the operator is watching, in the order they were first tracked.
/// Updating a batch keeps its position.
#[derive(Debug, Clone, Default)]
pub struct MonitoredBatches {
    entries: Vec<(String, TrackedBatch)>,
}

impl MonitoredBatches {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&TrackedBatch> {
        self.position(id).map(|i| &self.entries[i].1)
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TrackedBatch)> {
        self.entries.iter().map(|(id, batch)| (id, batch))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, id: String, batch: TrackedBatch) {
        match self.position(&id) {
            Some(i) => self.entries[i].1 = batch,
            None => self.entries.push((id, batch)),
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<TrackedBatch> {
        self.position(id).map(|i| self.entries.remove(i).1)
    }
}
