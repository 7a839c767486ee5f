use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BatchError, Result};
use crate::model::{BatchItem, Draft, ItemEdit};

pub fn new_draft(draft: &mut Draft) -> Result<CmdResult> {
    draft.clear();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("New batch created."));
    Ok(result)
}

pub fn add_item(
    draft: &mut Draft,
    custom_id: String,
    model: String,
    max_tokens: u32,
    content: String,
) -> Result<CmdResult> {
    let item = BatchItem::new(custom_id, model, max_tokens, content)?;
    draft.push(item.clone());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Message added to batch with custom_id: {}",
        item.custom_id
    )));
    Ok(result.with_affected_items(vec![item]))
}

pub fn edit_item(draft: &mut Draft, index: usize, edit: &ItemEdit) -> Result<CmdResult> {
    let mut item = draft
        .get(index)
        .cloned()
        .ok_or_else(|| invalid_index(index, draft.len()))?;
    edit.apply_to(&mut item);
    item.validate()?;
    draft.replace(index, item.clone());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Message at index {} updated ({}).",
        index,
        edit.field()
    )));
    Ok(result.with_affected_items(vec![item]))
}

pub fn remove_item(draft: &mut Draft, index: usize) -> Result<CmdResult> {
    if index >= draft.len() {
        return Err(invalid_index(index, draft.len()));
    }
    let removed = draft.remove(index);

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Message removed from batch: {}",
        removed.custom_id
    )));
    Ok(result.with_affected_items(vec![removed]))
}

pub fn view_draft(draft: &Draft) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if draft.is_empty() {
        result.add_message(CmdMessage::info("The current draft is empty."));
    }
    Ok(result.with_affected_items(draft.items().to_vec()))
}

fn invalid_index(index: usize, len: usize) -> BatchError {
    if len == 0 {
        BatchError::validation(format!("Invalid message index {}: the draft is empty", index))
    } else {
        BatchError::validation(format!(
            "Invalid message index {}: expected 0..={}",
            index,
            len - 1
        ))
    }
}
