pub mod args;
pub mod commands;
pub mod console;
pub mod display;
pub mod errors;
pub mod forms;
pub mod guard;
pub mod help;
pub mod navigator;
pub mod output;
pub mod recycle;
pub mod resolver;
pub mod script;
pub mod selection;
pub mod selectors;
pub mod session;
mod shell;
pub mod terminal;

pub use args::CliArgs;
pub use errors::{CliError, CommandError};
pub use session::Session;
pub use shell::{run_cli, run_session, SCRIPT_ENV};
