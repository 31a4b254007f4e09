use std::path::PathBuf;

use thiserror::Error;

use super::console::ConsoleError;
use crate::{config::ConfigError, errors::StoreError};

/// Failures a command handler can report back to the read loop.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The user declined a confirmation or interrupted a selection.
    #[error("{0}")]
    Cancelled(String),
    #[error("Invalid UUID `{0}`")]
    InvalidIdentifier(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    /// Missing or unknown sub-arguments; reported together with the verb's help.
    #[error("{message}")]
    Usage { verb: &'static str, message: String },
    /// Persisting or re-reading the store failed. Ends the session.
    #[error("Unable to persist store: {0}")]
    Persist(#[source] StoreError),
    /// The console itself failed. Ends the session.
    #[error(transparent)]
    Console(#[from] ConsoleError),
}

impl CommandError {
    pub fn usage(verb: &'static str, message: impl Into<String>) -> Self {
        CommandError::Usage {
            verb,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Persist(_) | CommandError::Console(_))
    }
}

/// Tree operations that fail are user-facing problems; anything else is I/O.
impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Refused(reason) => CommandError::Validation(reason),
            StoreError::InvalidRef(what) => CommandError::NotFound(format!("Unable to find {what}")),
            other => CommandError::Persist(other),
        }
    }
}

/// Failures that stop the program before or during the session.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("ERROR: {} Does not exist", .0.display())]
    MissingStore(PathBuf),
    #[error("ERROR: {} already exists", .0.display())]
    StoreExists(PathBuf),
    #[error("New database password invalid")]
    InvalidPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Bad credentials")]
    BadCredentials,
    #[error("Unable to open store: {0}")]
    Store(#[source] StoreError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error("CRITICAL: {0}")]
    Fatal(#[source] CommandError),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        if err.is_auth() {
            CliError::BadCredentials
        } else {
            CliError::Store(err)
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Console(inner) => CliError::Console(inner),
            other => CliError::Fatal(other),
        }
    }
}
