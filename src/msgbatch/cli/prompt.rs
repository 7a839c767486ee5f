//! Interactive input.
//!
//! The menu talks to a [`Prompter`] rather than to `inquire` directly, so tests
//! can drive a whole session from a script. Esc surfaces as
//! [`BatchError::Cancelled`] and the menu decides what cancelling means where.
//! Ctrl+C surfaces as [`BatchError::Interrupted`] and ends the session.

use inquire::{InquireError, Select, Text};
use msgbatch::error::{BatchError, Result};

pub trait Prompter {
    /// Returns the index of the chosen option
    fn select(&mut self, message: &str, options: Vec<String>) -> Result<usize>;

    /// Free text; an empty answer yields `default` when one is given
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String>;
}

pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn select(&mut self, message: &str, options: Vec<String>) -> Result<usize> {
        Select::new(message, options)
            .with_page_size(10)
            .raw_prompt()
            .map(|choice| choice.index)
            .map_err(from_inquire)
    }

    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let mut prompt = Text::new(message);
        if let Some(default) = default {
            prompt = prompt.with_default(default);
        }
        prompt.prompt().map_err(from_inquire)
    }
}

fn from_inquire(error: InquireError) -> BatchError {
    match error {
        InquireError::OperationCanceled => BatchError::Cancelled,
        InquireError::OperationInterrupted => BatchError::Interrupted,
        InquireError::IO(e) => BatchError::Io(e),
        other => BatchError::Input(other.to_string()),
    }
}

/// Answers prompts from a fixed script. Select answers name the option label.
/// Running out of answers behaves like pressing Esc, and [`CTRL_C`] in the
/// script behaves like pressing Ctrl+C.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
}

#[cfg(test)]
pub const CTRL_C: &str = "<ctrl-c>";

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self) -> Result<String> {
        match self.answers.pop_front() {
            Some(answer) if answer == CTRL_C => Err(BatchError::Interrupted),
            Some(answer) => Ok(answer),
            None => Err(BatchError::Cancelled),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn select(&mut self, message: &str, options: Vec<String>) -> Result<usize> {
        let answer = self.next_answer()?;
        options
            .iter()
            .position(|o| *o == answer)
            .ok_or_else(|| BatchError::Input(format!("{}: no option '{}'", message, answer)))
    }

    fn text(&mut self, _message: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next_answer()?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_cancels_and_ctrl_c_interrupts() {
        assert!(matches!(
            from_inquire(InquireError::OperationCanceled),
            BatchError::Cancelled
        ));
        assert!(matches!(
            from_inquire(InquireError::OperationInterrupted),
            BatchError::Interrupted
        ));
        assert!(matches!(
            from_inquire(InquireError::NotTTY),
            BatchError::Input(_)
        ));
    }

    #[test]
    fn scripted_empty_answer_takes_default() {
        let mut prompter = ScriptedPrompter::new(&["", "x"]);
        assert_eq!(prompter.text("q", Some("d")).unwrap(), "d");
        assert_eq!(prompter.text("q", Some("d")).unwrap(), "x");
        assert!(matches!(prompter.text("q", None), Err(BatchError::Cancelled)));
    }

    #[test]
    fn scripted_ctrl_c_interrupts() {
        let mut prompter = ScriptedPrompter::new(&[CTRL_C]);
        let options = vec!["a".to_string()];
        assert!(matches!(
            prompter.select("q", options),
            Err(BatchError::Interrupted)
        ));
        assert_eq!(prompter.remaining(), 0);
    }
}
