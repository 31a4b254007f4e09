use strsim::levenshtein;

use super::commands::{all_definitions, CommandRegistry};
use super::console::Console;
use super::display::pretty_path;
use super::errors::CommandError;
use super::help;
use super::navigator::Navigator;
use crate::store::Store;

pub type CommandResult = Result<(), CommandError>;

/// What a command handler hands back to the read loop.
pub type CommandOutcome = Result<LoopControl, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Everything a command handler works with: the unlocked store, the current
/// group pointer and the console.
pub struct Session {
    pub(crate) store: Store,
    pub(crate) navigator: Navigator,
    pub(crate) console: Box<dyn Console>,
    pub(crate) registry: CommandRegistry,
}

impl Session {
    pub fn new(store: Store, console: Box<dyn Console>) -> Self {
        let navigator = Navigator::new(store.database().root_id());
        Self {
            store,
            navigator,
            console,
            registry: CommandRegistry::new(all_definitions()),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn console(&mut self) -> &mut dyn Console {
        self.console.as_mut()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Writes the whole tree. Any failure here ends the session.
    pub fn persist(&mut self) -> CommandResult {
        self.store.save().map_err(|err| {
            tracing::error!(location = %self.store.location(), error = %err, "persist failed");
            CommandError::Persist(err)
        })
    }

    pub fn command_prompt(&self) -> String {
        let path = self
            .store
            .database()
            .group_path(self.navigator.current())
            .unwrap_or_default();
        format!("[{}] vault > ", pretty_path(&path))
    }

    /// Splits `line` into verb and remainder and runs the matching handler.
    pub fn dispatch_line(&mut self, line: &str) -> CommandOutcome {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(LoopControl::Continue);
        }
        let (raw_verb, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (trimmed, ""),
        };
        let verb = raw_verb.to_lowercase();

        let Some(handler) = self.registry.get(&verb).map(|definition| definition.handler) else {
            self.suggest_command(raw_verb);
            return Ok(LoopControl::Continue);
        };
        tracing::info!(command = %verb, "dispatching command");
        handler(self, rest)
    }

    /// Prints a non-fatal failure inline. Fatal ones are handed back.
    pub fn report_error(&mut self, err: CommandError) -> CommandResult {
        if err.is_fatal() {
            tracing::error!(error = %err, "fatal command failure");
            return Err(err);
        }
        match err {
            CommandError::Cancelled(message) => self.console.info(&message),
            CommandError::Usage { verb, message } => {
                self.console.error(&message);
                if let Some(definition) = self.registry.get(verb) {
                    help::print_command(self.console.as_mut(), definition);
                }
            }
            other => self.console.error(&other.to_string()),
        }
        Ok(())
    }

    pub fn suggest_command(&mut self, input: &str) {
        self.console.error(&format!("Unknown command `{input}`"));
        let lowered = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &lowered), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                self.console.info(&format!("Did you mean `{name}`?"));
            }
        }
    }
}
