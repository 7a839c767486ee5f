use crate::model::{BatchHandle, BatchItem, BatchStatusSnapshot};

pub mod draft;
pub mod import;
pub mod manage;
pub mod monitor;
pub mod submit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_items: Vec<BatchItem>,
    pub handle: Option<BatchHandle>,
    pub batches: Vec<BatchStatusSnapshot>,
    pub summary: Option<String>,
    /// Set by cancel: whether the service moved the batch to `canceling`.
    pub cancel_accepted: bool,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_items(mut self, items: Vec<BatchItem>) -> Self {
        self.affected_items = items;
        self
    }

    pub fn with_handle(mut self, handle: BatchHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn with_batches(mut self, batches: Vec<BatchStatusSnapshot>) -> Self {
        self.batches = batches;
        self
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}
