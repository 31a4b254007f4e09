//! Line-driven console used by script mode and tests.
//!
//! Each prompt consumes one input line. A few tokens stand in for keys that a
//! plain text stream cannot carry:
//!
//! * `<INTERRUPT>` behaves like Ctrl-C at any prompt.
//! * `<BLANK>` answers with an empty string even when a default exists.
//! * `<DEFAULT>` (or an empty line) accepts the default.
//! * Multi-line answers end with a line holding only `.`.

use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, BufRead},
    rc::Rc,
};

use super::console::{
    CommandInput, Console, ConsoleError, LinePrompt, MenuOption, Prompted,
};
use super::output::{self, MessageKind};

pub const INTERRUPT_TOKEN: &str = "<INTERRUPT>";
pub const BLANK_TOKEN: &str = "<BLANK>";
pub const DEFAULT_TOKEN: &str = "<DEFAULT>";
pub const END_OF_TEXT: &str = ".";
const CLEAR_TOKEN: &str = ":clear";

/// Shared record of everything a [`ScriptedConsole`] printed or asked.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Rc<RefCell<Vec<String>>>);

impl Transcript {
    fn push(&self, line: String) {
        self.0.borrow_mut().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn text(&self) -> String {
        self.0.borrow().join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.borrow().iter().any(|line| line.contains(needle))
    }

    /// Number of recorded lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

pub struct ScriptedConsole {
    input: Box<dyn Iterator<Item = String>>,
    transcript: Transcript,
    echo: bool,
}

impl ScriptedConsole {
    /// Console answering from a fixed list of lines; output is only recorded.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: VecDeque<String> = lines.into_iter().map(Into::into).collect();
        Self {
            input: Box::new(queue.into_iter()),
            transcript: Transcript::default(),
            echo: false,
        }
    }

    /// Console reading answers from a buffered reader and echoing output to stdout.
    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        Self {
            input: Box::new(reader.lines().map_while(Result::ok)),
            transcript: Transcript::default(),
            echo: true,
        }
    }

    pub fn stdin() -> Self {
        Self::from_reader(io::BufReader::new(io::stdin()))
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    fn record(&mut self, line: String) {
        if self.echo {
            println!("{line}");
        }
        self.transcript.push(line);
    }

    fn next_answer(&mut self, waiting_for: &str) -> Result<String, ConsoleError> {
        self.input
            .next()
            .ok_or_else(|| ConsoleError::Exhausted(waiting_for.to_string()))
    }

    fn read_multiline(&mut self, prompt: &LinePrompt<'_>) -> Result<Prompted<String>, ConsoleError> {
        let mut lines: Vec<String> = Vec::new();
        loop {
            let line = self.next_answer(prompt.label)?;
            match line.trim_end() {
                INTERRUPT_TOKEN => return Ok(Prompted::Interrupted),
                END_OF_TEXT => break,
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

impl Console for ScriptedConsole {
    fn read_command(&mut self, prompt: &str) -> Result<CommandInput, ConsoleError> {
        let Some(line) = self.input.next() else {
            return Ok(CommandInput::Eof);
        };
        self.record(format!("{prompt}{line}"));
        Ok(match line.trim() {
            INTERRUPT_TOKEN => CommandInput::Interrupted,
            "<EOF>" => CommandInput::Eof,
            _ => CommandInput::Line(line),
        })
    }

    fn prompt_line(&mut self, prompt: LinePrompt<'_>) -> Result<Prompted<String>, ConsoleError> {
        match prompt.default {
            Some(default) if !prompt.masked && !prompt.multiline => {
                self.record(format!("{} [{}] >", prompt.label, default))
            }
            _ => self.record(format!("{} >", prompt.label)),
        }

        if prompt.multiline {
            return self.read_multiline(&prompt);
        }

        let answer = self.next_answer(prompt.label)?;
        Ok(match answer.as_str() {
            INTERRUPT_TOKEN => Prompted::Interrupted,
            BLANK_TOKEN => Prompted::Value(String::new()),
            "" | DEFAULT_TOKEN => Prompted::Value(prompt.default.unwrap_or_default().to_string()),
            _ => Prompted::Value(answer),
        })
    }

    fn select(
        &mut self,
        message: &str,
        options: &[MenuOption],
        default: Option<usize>,
    ) -> Result<Prompted<usize>, ConsoleError> {
        self.record(format!("{message}:"));
        for (index, option) in options.iter().enumerate() {
            let marker = if Some(index) == default { '*' } else { ' ' };
            self.record(format!(" {marker}{:>3}. {}", index + 1, option.label));
        }

        loop {
            let answer = self.next_answer(message)?;
            let answer = answer.trim();
            if answer == INTERRUPT_TOKEN {
                return Ok(Prompted::Interrupted);
            }
            if answer.is_empty() || answer == DEFAULT_TOKEN {
                return Ok(Prompted::Value(default.unwrap_or(0)));
            }
            if let Ok(number) = answer.parse::<usize>() {
                if (1..=options.len()).contains(&number) {
                    return Ok(Prompted::Value(number - 1));
                }
            }
            let found = options.iter().position(|option| {
                option.key.eq_ignore_ascii_case(answer) || option.label.eq_ignore_ascii_case(answer)
            });
            match found {
                Some(index) => return Ok(Prompted::Value(index)),
                None => self.record(format!("No option matches `{answer}`")),
            }
        }
    }

    fn confirm(&mut self, message: &str) -> Result<Prompted<bool>, ConsoleError> {
        self.record(format!("{message} [y/N]"));
        let answer = self.next_answer(message)?;
        let answer = answer.trim();
        if answer == INTERRUPT_TOKEN {
            return Ok(Prompted::Interrupted);
        }
        Ok(Prompted::Value(matches!(
            answer.to_ascii_lowercase().as_str(),
            "y" | "yes"
        )))
    }

    fn emit(&mut self, kind: MessageKind, message: &str) {
        self.record(output::render(kind, message, false));
    }

    fn clear_screen(&mut self) -> Result<(), ConsoleError> {
        Ok(())
    }

    fn color(&self) -> bool {
        false
    }
}
