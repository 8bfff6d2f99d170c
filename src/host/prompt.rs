//! Name prompts — interactive terminal input or a name given up front.

use std::io::ErrorKind;

use dialoguer::{Error as DialoguerError, Input};

use super::{HostError, NamePrompt};

/// Prompts on the controlling terminal. Ctrl-C dismisses the prompt.
pub struct TerminalPrompt;

impl NamePrompt for TerminalPrompt {
    fn ask(&mut self, label: &str, default: &str) -> Result<Option<String>, HostError> {
        // dialoguer renders its own ": " after the prompt.
        let mut input = Input::<String>::new()
            .with_prompt(label.trim_end_matches(':'))
            .allow_empty(true);
        if !default.is_empty() {
            input = input.with_initial_text(default);
        }

        match input.interact_text() {
            Ok(value) => Ok(Some(value)),
            Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(HostError::Prompt(err.to_string())),
        }
    }
}

/// Answers with a fixed name, once. Later prompts are dismissed.
pub struct FixedPrompt(Option<String>);

impl FixedPrompt {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }
}

impl NamePrompt for FixedPrompt {
    fn ask(&mut self, _label: &str, _default: &str) -> Result<Option<String>, HostError> {
        Ok(self.0.take())
    }
}
