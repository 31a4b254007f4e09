use super::{split_args, CommandDefinition};
use crate::cli::console::{LinePrompt, Prompted};
use crate::cli::errors::CommandError;
use crate::cli::help;
use crate::cli::session::{CommandOutcome, LoopControl, Session};
use crate::store::Credential;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "chgpwd",
            "Change the store password",
            "chgpwd",
            cmd_change_password,
        )
        .with_details(&[
            "Asks for the current password, then the new one.",
            "The store is rewritten with the new password once confirmed.",
        ]),
        CommandDefinition::new("cls", "Clear the screen", "cls", cmd_clear).with_aliases(&["clear"]),
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("reload", "Re-read the store file", "reload", cmd_reload)
            .with_details(&["Unsaved state is discarded; the current group is kept when it still exists."]),
        CommandDefinition::new("quit", "Leave the console", "quit", cmd_quit).with_aliases(&["exit"]),
    ]
}

const PASSWORD_CHANGE_CANCELED: &str = "Password change canceled";

fn ask_secret(session: &mut Session, label: &str) -> Result<String, CommandError> {
    match session.console.prompt_line(LinePrompt::new(label).masked())? {
        Prompted::Value(value) => Ok(value),
        Prompted::Interrupted => Err(CommandError::Cancelled(PASSWORD_CHANGE_CANCELED.into())),
    }
}

fn cmd_change_password(session: &mut Session, rest: &str) -> CommandOutcome {
    split_args("chgpwd", rest, 0)?;
    let current = ask_secret(session, "Current password")?;
    if !session.store.credential().matches(&current) {
        return Err(CommandError::Validation(
            "Password does not match current database password".into(),
        ));
    }
    let replacement = ask_secret(session, "New password")?;
    if replacement.trim().is_empty() {
        return Err(CommandError::Validation("New database password invalid".into()));
    }
    if !session.console.confirm_or_decline("Change the database password?")? {
        return Err(CommandError::Cancelled(PASSWORD_CHANGE_CANCELED.into()));
    }

    session.store.set_credential(Credential::new(replacement));
    session.persist()?;
    tracing::info!(location = %session.store.location(), "store password changed");
    session.console.success("Database password changed");
    Ok(LoopControl::Continue)
}

fn cmd_clear(session: &mut Session, rest: &str) -> CommandOutcome {
    split_args("cls", rest, 0)?;
    session.console.clear_screen()?;
    Ok(LoopControl::Continue)
}

fn cmd_help(session: &mut Session, rest: &str) -> CommandOutcome {
    let args = split_args("help", rest, 1)?;
    match args.first().map(|verb| verb.to_lowercase()) {
        Some(verb) => match session.registry.get(&verb) {
            Some(definition) => help::print_command(session.console.as_mut(), definition),
            None => session.console.warning(&format!("No help found for {verb}")),
        },
        None => help::print_overview(session.console.as_mut(), &session.registry),
    }
    Ok(LoopControl::Continue)
}

fn cmd_reload(session: &mut Session, rest: &str) -> CommandOutcome {
    split_args("reload", rest, 0)?;
    session.store.reload().map_err(|err| {
        tracing::error!(error = %err, "reload failed");
        CommandError::Persist(err)
    })?;
    session.navigator.ensure_valid(session.store.database());
    session.console.success("Store reloaded");
    Ok(LoopControl::Continue)
}

fn cmd_quit(_session: &mut Session, rest: &str) -> CommandOutcome {
    split_args("quit", rest, 0)?;
    Ok(LoopControl::Exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::script::{ScriptedConsole, Transcript};
    use crate::store::{Database, GroupDraft, MemoryBackend, Store};

    fn session_with(answers: &[&str]) -> (Session, Transcript, MemoryBackend) {
        let backend = MemoryBackend::new(Database::new(), Credential::new("pw"));
        let store =
            Store::with_backend(Box::new(backend.clone()), Credential::new("pw")).expect("open");
        let console = ScriptedConsole::new(answers.iter().copied());
        let transcript = console.transcript();
        (Session::new(store, Box::new(console)), transcript, backend)
    }

    #[test]
    fn wrong_current_password_is_a_validation_error() {
        let (mut session, _, _) = session_with(&["nope"]);
        let err = session.dispatch_line("chgpwd").expect_err("mismatch");
        assert_eq!(
            err.to_string(),
            "Password does not match current database password"
        );
    }

    #[test]
    fn blank_new_password_is_rejected() {
        let (mut session, _, _) = session_with(&["pw", "<BLANK>"]);
        let err = session.dispatch_line("chgpwd").expect_err("blank");
        assert_eq!(err.to_string(), "New database password invalid");
    }

    #[test]
    fn confirmed_change_persists_with_new_password() {
        let (mut session, _, backend) = session_with(&["pw", "s3cret", "y"]);
        session.dispatch_line("chgpwd").expect("changed");
        assert!(session.store().credential().matches("s3cret"));
        let medium = backend.medium();
        let stored = medium.borrow().snapshot.as_ref().map(|(_, c)| c.clone());
        assert_eq!(stored, Some(Credential::new("s3cret")));
    }

    #[test]
    fn declined_change_keeps_old_password() {
        let (mut session, _, _) = session_with(&["pw", "s3cret", "n"]);
        let err = session.dispatch_line("chgpwd").expect_err("declined");
        assert!(matches!(err, CommandError::Cancelled(_)));
        assert!(session.store().credential().matches("pw"));
    }

    #[test]
    fn reload_drops_unsaved_groups_and_resets_location() {
        let (mut session, transcript, _) = session_with(&[]);
        let root = session.store.database().root_id();
        let scratch = session
            .store
            .database_mut()
            .add_group(root, &GroupDraft::new("Scratch", None))
            .expect("group");
        session.navigator.set_current(scratch);
        session.dispatch_line("reload").expect("reload");
        assert_eq!(session.navigator.current(), root);
        assert!(transcript.contains("Store reloaded"));
    }

    #[test]
    fn quit_ends_the_loop_without_an_error() {
        let (mut session, _, _) = session_with(&[]);
        assert_eq!(session.dispatch_line("quit").expect("quit"), LoopControl::Exit);
        assert!(matches!(
            session.dispatch_line("quit now"),
            Err(CommandError::Usage { verb: "quit", .. })
        ));
    }

    #[test]
    fn help_resolves_aliases_and_reports_unknown_verbs() {
        let (mut session, transcript, _) = session_with(&[]);
        session.dispatch_line("help ls").expect("help");
        assert!(transcript.contains("Usage: list"));
        session.dispatch_line("help frobnicate").expect("help");
        assert!(transcript.contains("No help found for frobnicate"));
        session.dispatch_line("help").expect("overview");
        assert!(transcript.contains("getpass"));
    }
}
