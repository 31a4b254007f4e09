use std::{env, path::Path};

use super::args::CliArgs;
use super::commands::verb_names;
use super::console::{CommandInput, Console, LinePrompt};
use super::errors::CliError;
use super::script::ScriptedConsole;
use super::session::{LoopControl, Session};
use super::terminal::TerminalConsole;
use crate::config::LogConfig;
use crate::store::{Credential, KdfParams, Store};
use crate::utils::init_tracing;

/// Set to run every prompt from stdin, one answer per line.
pub const SCRIPT_ENV: &str = "VAULT_CORE_CLI_SCRIPT";

const FAREWELL: &str = "GoodBye!";
const INTERRUPT_HINT: &str = "Use `quit` or `exit` to leave the console.";
const PASSWORD_PROMPT: &str = " >> Enter password to access file";
const NEW_PASSWORD_PROMPT: &str = " >> Enter password for the new file";
const REPEAT_PASSWORD_PROMPT: &str = " >> Repeat password";

pub fn run_cli(args: CliArgs) -> Result<(), CliError> {
    let log_config = args.logcfg.as_deref().map(LogConfig::load).transpose()?;
    init_tracing(log_config.as_ref())?;

    match (args.init, args.store.exists()) {
        (true, true) => return Err(CliError::StoreExists(args.store)),
        (false, false) => return Err(CliError::MissingStore(args.store)),
        _ => {}
    }

    let mut console: Box<dyn Console> = if env::var_os(SCRIPT_ENV).is_some() {
        Box::new(ScriptedConsole::stdin())
    } else {
        Box::new(TerminalConsole::new(verb_names())?)
    };

    console.line(&format!("Accessing : {}", args.store.display()));
    let unlocked = if args.init {
        create_store(console.as_mut(), &args.store)?
    } else {
        open_store(console.as_mut(), &args.store)?
    };
    let Some(store) = unlocked else {
        console.line(FAREWELL);
        return Ok(());
    };

    let mut session = Session::new(store, console);
    run_session(&mut session)
}

/// Masked prompt; `None` when the user interrupted it.
fn ask_secret(console: &mut dyn Console, label: &str) -> Result<Option<String>, CliError> {
    Ok(console.prompt_line(LinePrompt::new(label).masked())?.value())
}

fn open_store(console: &mut dyn Console, path: &Path) -> Result<Option<Store>, CliError> {
    let Some(secret) = ask_secret(console, PASSWORD_PROMPT)? else {
        return Ok(None);
    };
    Ok(Some(Store::open(path, Credential::new(secret))?))
}

/// Asks for the new password twice and writes an empty store.
fn create_store(console: &mut dyn Console, path: &Path) -> Result<Option<Store>, CliError> {
    let Some(secret) = ask_secret(console, NEW_PASSWORD_PROMPT)? else {
        return Ok(None);
    };
    if secret.trim().is_empty() {
        return Err(CliError::InvalidPassword);
    }
    let Some(repeated) = ask_secret(console, REPEAT_PASSWORD_PROMPT)? else {
        return Ok(None);
    };
    if repeated != secret {
        return Err(CliError::PasswordMismatch);
    }

    let store = Store::create(path, Credential::new(secret), KdfParams::default())?;
    tracing::info!(path = %path.display(), "store created");
    console.success(&format!("Created : {}", path.display()));
    Ok(Some(store))
}

/// The read loop. Returns when the user quits, input ends or a command fails
/// fatally.
pub fn run_session(session: &mut Session) -> Result<(), CliError> {
    loop {
        let prompt = session.command_prompt();
        match session.console().read_command(&prompt)? {
            CommandInput::Line(line) => match session.dispatch_line(&line) {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => break,
                Err(err) => session.report_error(err)?,
            },
            CommandInput::Interrupted => session.console().info(INTERRUPT_HINT),
            CommandInput::Eof => break,
        }
    }
    session.console().line(FAREWELL);
    tracing::info!("session closed");
    Ok(())
}
