//! Named styles for terminal output.
//!
//! Rendering code asks for a style by what the text *is* (a batch id, a
//! status, a count) and never picks colors itself. Changing the look of the
//! tool means editing this file only.

use console::Style;
use msgbatch::model::{ProcessingStatus, TrackedStatus};
use once_cell::sync::Lazy;

pub struct Theme {
    pub title: Style,
    pub header: Style,
    pub index: Style,
    pub id: Style,
    pub model: Style,
    pub number: Style,
    pub content: Style,
    pub muted: Style,
    pub status_active: Style,
    pub status_done: Style,
    pub status_stopped: Style,
    pub processing: Style,
    pub succeeded: Style,
    pub errored: Style,
    pub canceled: Style,
    pub expired: Style,
}

pub static MSGBATCH_THEME: Lazy<Theme> = Lazy::new(|| Theme {
    title: Style::new().bold(),
    header: Style::new().bold().underlined(),
    index: Style::new().cyan(),
    id: Style::new().cyan(),
    model: Style::new().green(),
    number: Style::new().yellow(),
    content: Style::new().blue(),
    muted: Style::new().dim(),
    status_active: Style::new().magenta(),
    status_done: Style::new().green().bold(),
    status_stopped: Style::new().yellow(),
    processing: Style::new().blue(),
    succeeded: Style::new().green(),
    errored: Style::new().red(),
    canceled: Style::new().yellow(),
    expired: Style::new().dim(),
});

pub fn status_style(status: TrackedStatus) -> &'static Style {
    let theme = &*MSGBATCH_THEME;
    match status {
        TrackedStatus::Remote(ProcessingStatus::Ended) => &theme.status_done,
        TrackedStatus::Remote(ProcessingStatus::Canceling)
        | TrackedStatus::Remote(ProcessingStatus::Canceled) => &theme.status_stopped,
        TrackedStatus::NotMonitored | TrackedStatus::Remote(ProcessingStatus::Unknown) => {
            &theme.muted
        }
        TrackedStatus::Added | TrackedStatus::Remote(ProcessingStatus::InProgress) => {
            &theme.status_active
        }
    }
}
