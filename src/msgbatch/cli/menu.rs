//! The interactive session: a main menu repeated until quit, with nested
//! loops for draft editing and monitoring.
//!
//! Every handler returns `Result<()>`. Failures are rendered in one place per
//! loop and the loop carries on, so a bad file path or a refused request never
//! ends the session. Cancelling a prompt abandons the current action; cancelling
//! the main menu itself quits. Ctrl+C quits from any depth.

use super::prompt::Prompter;
use super::render;
use colored::Colorize;
use msgbatch::api::BatchApi;
use msgbatch::commands::submit::SubmitFailure;
use msgbatch::commands::CmdResult;
use msgbatch::config::BatchConfig;
use msgbatch::error::{BatchError, Result};
use msgbatch::gateway::BatchGateway;
use msgbatch::model::{parse_max_tokens, Draft, ItemEdit, ItemField};
use std::fmt;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NewDraft,
    EditDraft,
    Import,
    Submit,
    Monitor,
    ViewResults,
    ListBatches,
    Cancel,
    Quit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 9] = [
        MenuChoice::NewDraft,
        MenuChoice::EditDraft,
        MenuChoice::Import,
        MenuChoice::Submit,
        MenuChoice::Monitor,
        MenuChoice::ViewResults,
        MenuChoice::ListBatches,
        MenuChoice::Cancel,
        MenuChoice::Quit,
    ];
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuChoice::NewDraft => "New draft",
            MenuChoice::EditDraft => "Edit current draft",
            MenuChoice::Import => "Import prompts from file",
            MenuChoice::Submit => "Submit draft",
            MenuChoice::Monitor => "Monitor batches",
            MenuChoice::ViewResults => "View batch results",
            MenuChoice::ListBatches => "List all batches",
            MenuChoice::Cancel => "Cancel a batch",
            MenuChoice::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftAction {
    Add,
    Edit,
    Remove,
    View,
    Done,
}

impl DraftAction {
    const ALL: [DraftAction; 5] = [
        DraftAction::Add,
        DraftAction::Edit,
        DraftAction::Remove,
        DraftAction::View,
        DraftAction::Done,
    ];
}

impl fmt::Display for DraftAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DraftAction::Add => "Add message",
            DraftAction::Edit => "Edit message",
            DraftAction::Remove => "Remove message",
            DraftAction::View => "View draft",
            DraftAction::Done => "Done",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonitorAction {
    RefreshAll,
    RefreshOne,
    Summary,
    Track,
    RemoveCompleted,
    Back,
}

impl MonitorAction {
    const ALL: [MonitorAction; 6] = [
        MonitorAction::RefreshAll,
        MonitorAction::RefreshOne,
        MonitorAction::Summary,
        MonitorAction::Track,
        MonitorAction::RemoveCompleted,
        MonitorAction::Back,
    ];
}

impl fmt::Display for MonitorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MonitorAction::RefreshAll => "Refresh all",
            MonitorAction::RefreshOne => "Refresh one batch",
            MonitorAction::Summary => "Status summary",
            MonitorAction::Track => "Track an existing batch",
            MonitorAction::RemoveCompleted => "Remove completed batch",
            MonitorAction::Back => "Back",
        })
    }
}

/// Defaults offered by prompts, taken from the configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub default_max_tokens: u32,
    pub default_list_limit: u32,
    pub use_color: bool,
}

impl SessionSettings {
    pub fn from_config(config: &BatchConfig, use_color: bool) -> Self {
        Self {
            default_max_tokens: config.default_max_tokens,
            default_list_limit: config.default_list_limit,
            use_color,
        }
    }
}

pub struct Session<G: BatchGateway, P: Prompter, W: Write> {
    api: BatchApi<G>,
    draft: Draft,
    prompter: P,
    out: W,
    settings: SessionSettings,
    last_model: Option<String>,
}

impl<G: BatchGateway, P: Prompter, W: Write> Session<G, P, W> {
    pub fn new(api: BatchApi<G>, prompter: P, out: W, settings: SessionSettings) -> Self {
        Self {
            api,
            draft: Draft::new(),
            prompter,
            out,
            settings,
            last_model: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{}", "Press Ctrl+C to exit at any time.".dimmed())?;
        loop {
            let table = render::render_monitored(self.api.monitored(), self.settings.use_color);
            write!(self.out, "\n{}\n", table)?;

            let choice = match self.choose("What would you like to do?", &MenuChoice::ALL) {
                Ok(choice) => choice,
                Err(BatchError::Cancelled | BatchError::Interrupted) => MenuChoice::Quit,
                Err(e) => return Err(e),
            };
            if choice == MenuChoice::Quit {
                break;
            }
            match self.dispatch(choice) {
                Ok(()) => {}
                Err(BatchError::Interrupted) => break,
                Err(e) => self.report(&e)?,
            }
        }
        writeln!(self.out, "Goodbye.")?;
        Ok(())
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::NewDraft => {
                let result = self.api.new_draft(&mut self.draft)?;
                self.show(&result)?;
                self.edit_draft()
            }
            MenuChoice::EditDraft => self.edit_draft(),
            MenuChoice::Import => self.import(),
            MenuChoice::Submit => self.submit(),
            MenuChoice::Monitor => self.monitor(),
            MenuChoice::ViewResults => self.view_results(),
            MenuChoice::ListBatches => self.list_batches(),
            MenuChoice::Cancel => self.cancel_batch(),
            MenuChoice::Quit => Ok(()),
        }
    }

    // Draft

    fn edit_draft(&mut self) -> Result<()> {
        loop {
            self.show_draft()?;
            let action = match self.choose("Action", &DraftAction::ALL) {
                Ok(action) => action,
                Err(BatchError::Cancelled) => DraftAction::Done,
                Err(e) => return Err(e),
            };
            let outcome = match action {
                DraftAction::Add => self.add_message(),
                DraftAction::Edit => self.edit_message(),
                DraftAction::Remove => self.remove_message(),
                DraftAction::View => continue,
                DraftAction::Done => return Ok(()),
            };
            match outcome {
                Ok(()) => {}
                Err(BatchError::Interrupted) => return Err(BatchError::Interrupted),
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn add_message(&mut self) -> Result<()> {
        let custom_id = self.ask_text("Custom ID", None)?;
        let model = self.ask_model()?;
        let max_tokens = self.ask_max_tokens()?;
        let content = self.ask_text("Message content", None)?;
        let result = self
            .api
            .add_item(&mut self.draft, custom_id, model, max_tokens, content)?;
        self.show(&result)
    }

    fn edit_message(&mut self) -> Result<()> {
        let index = self.ask_number("Message index to edit", 0, 0)?;
        let field = self.choose("Field to edit", &ItemField::ALL)?;
        let edit = match field {
            ItemField::MaxTokens => ItemEdit::MaxTokens(self.ask_max_tokens()?),
            other => {
                let value = self.ask_text(&format!("New value for {}", other), None)?;
                ItemEdit::for_field(other, &value)?
            }
        };
        let result = self.api.edit_item(&mut self.draft, index as usize, &edit)?;
        self.show(&result)
    }

    fn remove_message(&mut self) -> Result<()> {
        let index = self.ask_number("Message index to remove", 0, 0)?;
        let result = self.api.remove_item(&mut self.draft, index as usize)?;
        self.show(&result)
    }

    fn import(&mut self) -> Result<()> {
        let path = self.ask_text("Path to the file containing prompts", None)?;
        let model = self.ask_model()?;
        let max_tokens = self.ask_max_tokens()?;
        let result = self.api.import_file(
            &mut self.draft,
            Path::new(path.trim()),
            &model,
            max_tokens,
        )?;
        self.show(&result)?;
        self.show_draft()
    }

    // Submit

    fn submit(&mut self) -> Result<()> {
        let result = match self.api.submit(&self.draft) {
            Ok(result) => result,
            Err(e @ BatchError::Validation(_)) => return Err(e),
            Err(e) => {
                let failure = SubmitFailure::classify(&e);
                writeln!(self.out, "{}", "Batch submission failed.".red())?;
                writeln!(self.out, "{}", failure.hint().yellow())?;
                return Err(e);
            }
        };
        self.show(&result)?;
        if let Some(handle) = &result.handle {
            let tracked = self.api.add_batch(&handle.id)?;
            self.show(&tracked)?;
        }
        Ok(())
    }

    // Monitor

    fn monitor(&mut self) -> Result<()> {
        let refreshed = self.api.update_all()?;
        self.show(&refreshed)?;
        loop {
            let table = render::render_monitored(self.api.monitored(), self.settings.use_color);
            write!(self.out, "\n{}\n", table)?;
            let action = match self.choose("Monitor", &MonitorAction::ALL) {
                Ok(action) => action,
                Err(BatchError::Cancelled) => MonitorAction::Back,
                Err(e) => return Err(e),
            };
            if action == MonitorAction::Back {
                return Ok(());
            }
            match self.monitor_action(action) {
                Ok(()) => {}
                Err(BatchError::Interrupted) => return Err(BatchError::Interrupted),
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn monitor_action(&mut self, action: MonitorAction) -> Result<()> {
        let result = match action {
            MonitorAction::RefreshAll => self.api.update_all()?,
            MonitorAction::RefreshOne => {
                let id = self.ask_batch_id()?;
                self.api.update_status(&id)?
            }
            MonitorAction::Summary => {
                let id = self.ask_batch_id()?;
                self.api.status_summary(&id)?
            }
            MonitorAction::Track => {
                let id = self.ask_batch_id()?;
                self.api.add_batch(&id)?
            }
            MonitorAction::RemoveCompleted => {
                let id = self.ask_batch_id()?;
                self.api.remove_completed(&id)?
            }
            MonitorAction::Back => return Ok(()),
        };
        if let Some(summary) = &result.summary {
            write!(self.out, "{}", summary)?;
        }
        self.show(&result)
    }

    // Manage

    fn view_results(&mut self) -> Result<()> {
        let id = self.ask_batch_id()?;
        let results = self.api.retrieve_results(&id)?;
        if !results.is_ready() {
            let message = format!(
                "Batch {} has not ended yet (status: {}). No results available.",
                id, results.status
            );
            writeln!(self.out, "{}", message.yellow())?;
            return Ok(());
        }

        let mut items = Vec::new();
        let mut failure = None;
        for item in results.items {
            match item {
                Ok(item) => items.push(item),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        write!(
            self.out,
            "{}",
            render::render_results(&id, &items, self.settings.use_color)
        )?;
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn list_batches(&mut self) -> Result<()> {
        let limit = self.ask_number(
            "Number of batches to list",
            self.settings.default_list_limit,
            1,
        )?;
        let result = self.api.list_all(limit)?;
        if !result.batches.is_empty() {
            write!(
                self.out,
                "{}",
                render::render_batches(&result.batches, self.settings.use_color)
            )?;
        }
        self.show(&result)
    }

    fn cancel_batch(&mut self) -> Result<()> {
        let id = self.ask_batch_id()?;
        let result = self.api.cancel(&id)?;
        self.show(&result)
    }

    // Prompts and output

    fn choose<T: Copy + fmt::Display>(&mut self, message: &str, options: &[T]) -> Result<T> {
        let labels = options.iter().map(|o| o.to_string()).collect();
        let index = self.prompter.select(message, labels)?;
        options
            .get(index)
            .copied()
            .ok_or_else(|| BatchError::Input(format!("No option at position {}", index)))
    }

    fn ask_text(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        self.prompter.text(message, default)
    }

    fn ask_batch_id(&mut self) -> Result<String> {
        let id = self.ask_text("Batch ID", None)?;
        let id = id.trim();
        if id.is_empty() {
            return Err(BatchError::validation("Batch ID cannot be empty"));
        }
        Ok(id.to_string())
    }

    fn ask_model(&mut self) -> Result<String> {
        let last = self.last_model.clone();
        let model = self.ask_text("Model name", last.as_deref())?;
        let model = model.trim().to_string();
        if !model.is_empty() {
            self.last_model = Some(model.clone());
        }
        Ok(model)
    }

    fn ask_max_tokens(&mut self) -> Result<u32> {
        let default = self.settings.default_max_tokens;
        self.ask_number("Max tokens", default, 1)
    }

    /// Re-asks until the answer is an integer no smaller than `min`.
    fn ask_number(&mut self, message: &str, default: u32, min: u32) -> Result<u32> {
        let default_text = default.to_string();
        loop {
            let answer = self.ask_text(message, Some(default_text.as_str()))?;
            let parsed = if min > 0 {
                parse_max_tokens(&answer).ok()
            } else {
                answer.trim().parse::<u32>().ok()
            };
            match parsed {
                Some(n) if n >= min => return Ok(n),
                _ => {
                    let hint = if min > 0 {
                        "Please enter a positive integer."
                    } else {
                        "Please enter a valid integer."
                    };
                    writeln!(self.out, "{}", hint.red())?;
                }
            }
        }
    }

    fn show(&mut self, result: &CmdResult) -> Result<()> {
        write!(self.out, "{}", render::render_messages(&result.messages))?;
        Ok(())
    }

    fn show_draft(&mut self) -> Result<()> {
        let view = self.api.view_draft(&self.draft)?;
        let table = render::render_draft(&view.affected_items, self.settings.use_color);
        write!(self.out, "\n{}", table)?;
        Ok(())
    }

    fn report(&mut self, error: &BatchError) -> Result<()> {
        match error {
            BatchError::Cancelled => writeln!(self.out, "{}", "Cancelled.".dimmed())?,
            e => writeln!(self.out, "{} {}", "Error:".red().bold(), e)?,
        }
        Ok(())
    }
}
