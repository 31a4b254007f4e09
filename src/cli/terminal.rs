use std::{borrow::Cow, fs, io, path::PathBuf};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Context as ReadlineContext, Editor, Helper,
};

use super::console::{CommandInput, Console, ConsoleError, LinePrompt, MenuOption, Prompted};
use super::output::{self, MessageKind};
use crate::utils::history_path;

const CLEAR_TOKEN: &str = ":clear";
const MULTILINE_HINT: &str = "(finish with a line containing only `.`; `:clear` empties the field)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelperMode {
    Command,
    Text,
    Masked,
}

/// Interactive console: rustyline for typed input, dialoguer for menus.
pub struct TerminalConsole {
    editor: Editor<ShellHelper, DefaultHistory>,
    history: Option<PathBuf>,
    theme: ColorfulTheme,
}

impl TerminalConsole {
    pub fn new(commands: Vec<&'static str>) -> Result<Self, ConsoleError> {
        let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(ShellHelper::new(commands)));

        let path = history_path();
        let history = match path.parent().map(fs::create_dir_all) {
            Some(Err(err)) => {
                tracing::debug!(%err, "command history disabled");
                None
            }
            _ => Some(path),
        };
        if let Some(path) = history.as_ref().filter(|path| path.exists()) {
            if let Err(err) = editor.load_history(path) {
                tracing::debug!(%err, "unable to load command history");
            }
        }

        Ok(Self {
            editor,
            history,
            theme: ColorfulTheme::default(),
        })
    }

    fn set_mode(&mut self, mode: HelperMode) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.mode = mode;
        }
    }

    fn read(&mut self, prompt: &str, initial: Option<&str>) -> Result<Prompted<String>, ConsoleError> {
        let result = match initial {
            Some(initial) => self.editor.readline_with_initial(prompt, (initial, "")),
            None => self.editor.readline(prompt),
        };
        match result {
            Ok(line) => Ok(Prompted::Value(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(Prompted::Interrupted),
            Err(err) => Err(err.into()),
        }
    }

    fn read_multiline(&mut self, prompt: &LinePrompt<'_>) -> Result<Prompted<String>, ConsoleError> {
        println!("{} {}", prompt.label, MULTILINE_HINT);
        if let Some(current) = prompt.default.filter(|text| !text.is_empty()) {
            println!("Current value (a lone `.` keeps it):");
            println!("{current}");
        }
        let mut lines = Vec::new();
        loop {
            let line = match self.read("... ", None)? {
                Prompted::Value(line) => line,
                Prompted::Interrupted => return Ok(Prompted::Interrupted),
            };
            match line.trim_end() {
                "." => break,
                CLEAR_TOKEN => return Ok(Prompted::Value(String::new())),
                _ => lines.push(line),
            }
        }
        if lines.is_empty() {
            if let Some(default) = prompt.default {
                return Ok(Prompted::Value(default.to_string()));
            }
        }
        Ok(Prompted::Value(lines.join("\n")))
    }
}

impl Console for TerminalConsole {
    fn read_command(&mut self, prompt: &str) -> Result<CommandInput, ConsoleError> {
        self.set_mode(HelperMode::Command);
        match self.editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    self.editor.add_history_entry(trimmed).ok();
                    if let Some(path) = &self.history {
                        if let Err(err) = self.editor.save_history(path) {
                            tracing::debug!(%err, "unable to save command history");
                        }
                    }
                }
                Ok(CommandInput::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(CommandInput::Interrupted),
            Err(ReadlineError::Eof) => Ok(CommandInput::Eof),
            Err(err) => Err(err.into()),
        }
    }

    fn prompt_line(&mut self, prompt: LinePrompt<'_>) -> Result<Prompted<String>, ConsoleError> {
        if prompt.multiline {
            self.set_mode(HelperMode::Text);
            return self.read_multiline(&prompt);
        }

        if prompt.masked {
            self.set_mode(HelperMode::Masked);
            let label = match prompt.default {
                Some(_) => format!(
                    "{} (blank keeps current, `{CLEAR_TOKEN}` removes it) > ",
                    prompt.label
                ),
                None => format!("{} > ", prompt.label),
            };
            let answer = self.read(&label, None);
            self.set_mode(HelperMode::Text);
            return Ok(match answer? {
                Prompted::Value(value) => Prompted::Value(masked_answer(value, prompt.default)),
                Prompted::Interrupted => Prompted::Interrupted,
            });
        }

        self.set_mode(HelperMode::Text);
        self.read(&format!("{} > ", prompt.label), prompt.default)
    }

    fn select(
        &mut self,
        message: &str,
        options: &[MenuOption],
        default: Option<usize>,
    ) -> Result<Prompted<usize>, ConsoleError> {
        let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
        dialog_answer(
            Select::with_theme(&self.theme)
                .with_prompt(message)
                .items(&labels)
                .default(default.unwrap_or(0))
                .interact_opt(),
        )
    }

    fn confirm(&mut self, message: &str) -> Result<Prompted<bool>, ConsoleError> {
        dialog_answer(
            Confirm::with_theme(&self.theme)
                .with_prompt(message)
                .default(false)
                .interact_opt(),
        )
    }

    fn emit(&mut self, kind: MessageKind, message: &str) {
        let rendered = output::render(kind, message, self.color());
        match kind {
            MessageKind::Section => println!("\n{rendered}"),
            _ => println!("{rendered}"),
        }
    }

    fn clear_screen(&mut self) -> Result<(), ConsoleError> {
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    fn color(&self) -> bool {
        colored::control::SHOULD_COLORIZE.should_colorize()
    }
}

/// dialoguer reports Esc as `None` and Ctrl-C as an interrupted read; both
/// cancel the prompt.
fn dialog_answer<T>(
    result: Result<Option<T>, dialoguer::Error>,
) -> Result<Prompted<T>, ConsoleError> {
    match result {
        Ok(Some(value)) => Ok(Prompted::Value(value)),
        Ok(None) => Ok(Prompted::Interrupted),
        Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => {
            Ok(Prompted::Interrupted)
        }
        Err(err) => Err(err.into()),
    }
}

/// With a current value, blank keeps it and the clear token empties it.
fn masked_answer(value: String, current: Option<&str>) -> String {
    match current {
        Some(current) if value.is_empty() => current.to_string(),
        Some(_) if value.trim() == CLEAR_TOKEN => String::new(),
        _ => value,
    }
}

struct ShellHelper {
    commands: Vec<String>,
    mode: HelperMode,
}

impl ShellHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self {
            commands,
            mode: HelperMode::Command,
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if self.mode != HelperMode::Command {
            return Ok((pos, Vec::new()));
        }
        let prefix = &line[..pos];
        let trimmed = prefix.trim_start();
        if trimmed.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let start = prefix.len() - trimmed.len();
        let needle = trimmed.to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.mode == HelperMode::Masked {
            Cow::Owned("*".repeat(line.chars().count()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.mode == HelperMode::Masked
    }
}

impl Validator for ShellHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_and_esc_in_dialogs_cancel_the_prompt() {
        let interrupted = io::Error::new(io::ErrorKind::Interrupted, "read interrupted");
        assert_eq!(
            dialog_answer::<usize>(Err(dialoguer::Error::IO(interrupted))).expect("cancel"),
            Prompted::Interrupted
        );
        assert_eq!(
            dialog_answer::<bool>(Ok(None)).expect("esc"),
            Prompted::Interrupted
        );
        assert_eq!(dialog_answer(Ok(Some(2))).expect("pick"), Prompted::Value(2));
    }

    #[test]
    fn other_dialog_failures_stay_errors() {
        let broken = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        assert!(matches!(
            dialog_answer::<bool>(Err(dialoguer::Error::IO(broken))),
            Err(ConsoleError::Dialog(_))
        ));
    }

    #[test]
    fn masked_edit_can_keep_or_clear_the_secret() {
        assert_eq!(masked_answer(String::new(), Some("old")), "old");
        assert_eq!(masked_answer(":clear".into(), Some("old")), "");
        assert_eq!(masked_answer("new".into(), Some("old")), "new");
        assert_eq!(masked_answer(":clear".into(), None), ":clear");
        assert_eq!(masked_answer(String::new(), None), "");
    }
}
