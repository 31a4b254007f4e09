//! The presentation seam between the session core and the terminal.
//!
//! Every prompt the shell issues goes through [`Console`]. The interactive
//! implementation lives in [`crate::cli::terminal`]; the line-driven one used by
//! script mode and tests lives in [`crate::cli::script`].

use thiserror::Error;

use super::output::MessageKind;

/// Result of a prompt the user may interrupt with Ctrl-C or Esc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted<T> {
    Value(T),
    Interrupted,
}

impl<T> Prompted<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Prompted::Value(value) => Some(value),
            Prompted::Interrupted => None,
        }
    }
}

/// What the read loop received at the command prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    Line(String),
    Interrupted,
    Eof,
}

/// A single free-text question.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinePrompt<'a> {
    pub label: &'a str,
    pub default: Option<&'a str>,
    pub masked: bool,
    pub multiline: bool,
}

impl<'a> LinePrompt<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: Option<&'a str>) -> Self {
        self.default = default;
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

/// One row of a single-selection menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    /// Stable key scripts can answer with (an identifier, usually).
    pub key: String,
    pub label: String,
}

impl MenuOption {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Prompt error: {0}")]
    Dialog(#[from] dialoguer::Error),
    #[error("Input ended while waiting for `{0}`")]
    Exhausted(String),
}

/// Prompts and output required by the session core.
pub trait Console {
    /// Reads the next command line.
    fn read_command(&mut self, prompt: &str) -> Result<CommandInput, ConsoleError>;

    /// Asks for free text. An empty answer to a prompt with a default keeps it.
    fn prompt_line(&mut self, prompt: LinePrompt<'_>) -> Result<Prompted<String>, ConsoleError>;

    /// Asks the user to pick one option; returns its index.
    fn select(
        &mut self,
        message: &str,
        options: &[MenuOption],
        default: Option<usize>,
    ) -> Result<Prompted<usize>, ConsoleError>;

    /// Yes/no question that defaults to no.
    fn confirm(&mut self, message: &str) -> Result<Prompted<bool>, ConsoleError>;

    fn emit(&mut self, kind: MessageKind, message: &str);

    fn clear_screen(&mut self) -> Result<(), ConsoleError>;

    /// Whether output may carry terminal colour codes.
    fn color(&self) -> bool;

    fn line(&mut self, message: &str) {
        self.emit(MessageKind::Plain, message);
    }

    fn info(&mut self, message: &str) {
        self.emit(MessageKind::Info, message);
    }

    fn success(&mut self, message: &str) {
        self.emit(MessageKind::Success, message);
    }

    fn warning(&mut self, message: &str) {
        self.emit(MessageKind::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.emit(MessageKind::Error, message);
    }

    /// Confirmation where an interrupt counts as "no".
    fn confirm_or_decline(&mut self, message: &str) -> Result<bool, ConsoleError> {
        Ok(self.confirm(message)?.value().unwrap_or(false))
    }
}
