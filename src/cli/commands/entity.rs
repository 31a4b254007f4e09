use uuid::Uuid;

use super::{split_args, CommandDefinition};
use crate::cli::display::{show_entry, show_group_header};
use crate::cli::errors::CommandError;
use crate::cli::forms::{EntryWizard, FlowOutcome, FormEngine, GroupWizard};
use crate::cli::guard::{self, Proposal};
use crate::cli::recycle;
use crate::cli::resolver::{resolve_entry, resolve_group};
use crate::cli::session::{CommandOutcome, LoopControl, Session};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add", "Add an entry or a group", "add {entry|group}", cmd_add)
            .with_details(&[
                "Prompts for every field; Ctrl-C offers to cancel.",
                "The new item is shown and saved only after confirmation.",
            ]),
        CommandDefinition::new(
            "delete",
            "Delete an entry or a group",
            "delete {entry|group} [id]",
            cmd_delete,
        )
        .with_details(&[
            "Without an id, entries are picked from the current group and groups from the whole tree.",
            "Items outside the recycle bin can be moved there; items in it can only be removed for good.",
            "Deleting a group removes everything beneath it.",
        ]),
        CommandDefinition::new(
            "edit",
            "Edit an entry or a group",
            "edit {entry|group} [id]",
            cmd_edit,
        )
        .with_details(&[
            "Fields are pre-filled with the current values; Enter keeps them.",
            "Changing an entry's group moves it when the edit is saved.",
        ]),
        CommandDefinition::new(
            "show",
            "Show an entry or a group",
            "show {entry|group} [id]",
            cmd_show,
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Entry,
    Group,
}

/// Parses `{entry|group} [id]`.
fn parse_target<'a>(
    verb: &'static str,
    rest: &'a str,
    allow_id: bool,
) -> Result<(Target, Option<&'a str>), CommandError> {
    let args = split_args(verb, rest, if allow_id { 2 } else { 1 })?;
    let target = match args.first().map(|kind| kind.to_ascii_lowercase()) {
        None => {
            return Err(CommandError::usage(
                verb,
                "Missing target: expected `entry` or `group`",
            ))
        }
        Some(kind) if kind == "entry" => Target::Entry,
        Some(kind) if kind == "group" => Target::Group,
        Some(kind) => {
            return Err(CommandError::usage(
                verb,
                format!("Unknown target `{kind}`: expected `entry` or `group`"),
            ))
        }
    };
    Ok((target, args.get(1).copied()))
}

fn pick_entry(session: &mut Session, literal: Option<&str>) -> Result<Uuid, CommandError> {
    let scope = session.navigator.current();
    resolve_entry(
        session.console.as_mut(),
        session.store.database(),
        literal,
        scope,
    )
}

fn pick_group(session: &mut Session, literal: Option<&str>) -> Result<Uuid, CommandError> {
    let current = session.navigator.current();
    resolve_group(
        session.console.as_mut(),
        session.store.database(),
        literal,
        Some(current),
    )
}

fn show_entry_by_id(session: &mut Session, id: Uuid) {
    let database = session.store.database();
    if let Some(entry) = database.entry(id) {
        let path = database.entry_path(id).unwrap_or_default();
        show_entry(session.console.as_mut(), entry, &path);
    }
}

fn show_group_by_id(session: &mut Session, id: Uuid) {
    let database = session.store.database();
    if let Some(group) = database.group(id) {
        let path = database.group_path(id).unwrap_or_default();
        show_group_header(session.console.as_mut(), group, &path);
    }
}

fn cmd_add(session: &mut Session, rest: &str) -> CommandOutcome {
    let (target, _) = parse_target("add", rest, false)?;
    let parent = session.navigator.current();
    match target {
        Target::Entry => {
            let wizard = EntryWizard::new_create(parent);
            let outcome =
                FormEngine::new(&wizard).run(session.console.as_mut(), session.store.database())?;
            let FlowOutcome::Completed(data) = outcome else {
                return Err(CommandError::Cancelled("Adding entry canceled".into()));
            };
            match guard::propose_create_entry(session, data)? {
                Proposal::Committed(id) => {
                    session.console.success("Entry saved");
                    show_entry_by_id(session, id);
                    Ok(LoopControl::Continue)
                }
                Proposal::Discarded => Err(CommandError::Cancelled("Entry not saved".into())),
            }
        }
        Target::Group => {
            let wizard = GroupWizard::new_create(parent);
            let outcome =
                FormEngine::new(&wizard).run(session.console.as_mut(), session.store.database())?;
            let FlowOutcome::Completed(data) = outcome else {
                return Err(CommandError::Cancelled("Adding group canceled".into()));
            };
            match guard::propose_create_group(session, data)? {
                Proposal::Committed(id) => {
                    session.console.success("Group saved");
                    show_group_by_id(session, id);
                    Ok(LoopControl::Continue)
                }
                Proposal::Discarded => Err(CommandError::Cancelled("Group not saved".into())),
            }
        }
    }
}

fn cmd_edit(session: &mut Session, rest: &str) -> CommandOutcome {
    let (target, literal) = parse_target("edit", rest, true)?;
    match target {
        Target::Entry => {
            let id = pick_entry(session, literal)?;
            let database = session.store.database();
            let (Some(entry), Some(parent)) = (database.entry(id), database.entry_parent(id))
            else {
                return Err(CommandError::NotFound(format!(
                    "Unable to find entry for uuid {id}"
                )));
            };
            let wizard = EntryWizard::new_edit(entry, parent.id);
            let outcome = FormEngine::new(&wizard).run(session.console.as_mut(), database)?;
            let FlowOutcome::Completed(data) = outcome else {
                return Err(CommandError::Cancelled("Editing entry canceled".into()));
            };
            match guard::propose_edit_entry(session, id, data)? {
                Proposal::Committed(_) => {
                    session.console.success("Entry saved");
                    Ok(LoopControl::Continue)
                }
                Proposal::Discarded => Err(CommandError::Cancelled("Entry not saved".into())),
            }
        }
        Target::Group => {
            let id = pick_group(session, literal)?;
            let database = session.store.database();
            let group = database.group(id).ok_or_else(|| {
                CommandError::NotFound(format!("Unable to find group for uuid {id}"))
            })?;
            let wizard = GroupWizard::new_edit(group);
            let outcome = FormEngine::new(&wizard).run(session.console.as_mut(), database)?;
            let FlowOutcome::Completed(data) = outcome else {
                return Err(CommandError::Cancelled("Editing group canceled".into()));
            };
            match guard::propose_edit_group(session, id, data)? {
                Proposal::Committed(_) => {
                    session.console.success("Group saved");
                    Ok(LoopControl::Continue)
                }
                Proposal::Discarded => Err(CommandError::Cancelled("Group not saved".into())),
            }
        }
    }
}

fn cmd_show(session: &mut Session, rest: &str) -> CommandOutcome {
    let (target, literal) = parse_target("show", rest, true)?;
    match target {
        Target::Entry => {
            let id = pick_entry(session, literal)?;
            show_entry_by_id(session, id);
        }
        Target::Group => {
            let id = pick_group(session, literal)?;
            show_group_by_id(session, id);
        }
    }
    Ok(LoopControl::Continue)
}

fn cmd_delete(session: &mut Session, rest: &str) -> CommandOutcome {
    let (target, literal) = parse_target("delete", rest, true)?;
    let message = match target {
        Target::Entry => {
            let id = pick_entry(session, literal)?;
            show_entry_by_id(session, id);
            let choice = recycle::plan_entry_deletion(
                session.console.as_mut(),
                session.store.database(),
                id,
            )?;
            recycle::apply_entry_deletion(session, id, choice)?
        }
        Target::Group => {
            let id = pick_group(session, literal)?;
            recycle::offered_for_group(session.store.database(), id)?;
            show_group_by_id(session, id);
            let choice = recycle::plan_group_deletion(
                session.console.as_mut(),
                session.store.database(),
                id,
            )?;
            recycle::apply_group_deletion(session, id, choice)?
        }
    };
    session.console.success(&message);
    Ok(LoopControl::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::script::{ScriptedConsole, Transcript};
    use crate::store::{Credential, Database, EntryDraft, GroupDraft, MemoryBackend, Store};

    fn session_with(database: Database, answers: &[&str]) -> (Session, Transcript) {
        let backend = MemoryBackend::new(database, Credential::new("pw"));
        let store = Store::with_backend(Box::new(backend), Credential::new("pw")).expect("open");
        let console = ScriptedConsole::new(answers.iter().copied());
        let transcript = console.transcript();
        (Session::new(store, Box::new(console)), transcript)
    }

    #[test]
    fn target_is_required_and_checked() {
        assert!(matches!(
            parse_target("add", "", false),
            Err(CommandError::Usage { verb: "add", .. })
        ));
        assert!(matches!(
            parse_target("show", "thing", true),
            Err(CommandError::Usage { .. })
        ));
        assert_eq!(
            parse_target("show", "ENTRY abc", true).expect("ok"),
            (Target::Entry, Some("abc"))
        );
    }

    #[test]
    fn add_entry_saves_after_review() {
        let (mut session, transcript) = session_with(
            Database::new(),
            &["Mail", "", "bob", "pw1", "", ".", "y"],
        );
        session.dispatch_line("add entry").expect("add");
        assert!(transcript.contains("Entry saved"));
        let entries = session.store.database().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].secret.as_deref(), Some("pw1"));
    }

    #[test]
    fn cancelled_add_reports_without_error() {
        let (mut session, _) = session_with(Database::new(), &["<INTERRUPT>", "y"]);
        let err = session.dispatch_line("add group").expect_err("cancelled");
        assert!(matches!(err, CommandError::Cancelled(_)));
        assert_eq!(session.store.database().groups().len(), 1);
    }

    #[test]
    fn show_with_bad_identifier_never_prompts() {
        let (mut session, transcript) = session_with(Database::new(), &[]);
        let err = session.dispatch_line("show entry 42").expect_err("invalid");
        assert!(matches!(err, CommandError::InvalidIdentifier(_)));
        assert!(transcript.lines().is_empty());
    }

    #[test]
    fn delete_group_shows_header_before_choice() {
        let mut db = Database::new();
        let root = db.root_id();
        let email = db.add_group(root, &GroupDraft::new("Email", None)).expect("group");
        db.add_entry(email, &EntryDraft::new("Mail", "bob", "", "", None))
            .expect("entry");
        let (mut session, transcript) = session_with(db, &["2"]);
        session
            .dispatch_line(&format!("delete group {email}"))
            .expect("delete");
        let lines = transcript.lines();
        let header = lines.iter().position(|l| l.contains("Entries: 1")).expect("header");
        let menu = lines.iter().position(|l| l == "Delete group:").expect("menu");
        assert!(header < menu);
        assert!(transcript.contains("Group permanently deleted"));
        assert!(session.store.database().group(email).is_none());
    }

    fn group_with_notes() -> (Database, Uuid) {
        let mut db = Database::new();
        let root = db.root_id();
        let email = db
            .add_group(root, &GroupDraft::new("Email", Some("personal")))
            .expect("group");
        (db, email)
    }

    #[test]
    fn edit_group_commits_name_and_notes() {
        let (db, email) = group_with_notes();
        let (mut session, transcript) =
            session_with(db, &["Mailboxes", "y", "work and home", ".", "y"]);
        session
            .dispatch_line(&format!("edit group {email}"))
            .expect("edit");
        assert!(transcript.contains("Name [Email] >"));
        assert!(transcript.contains("Group saved"));
        let group = session.store.database().group(email).expect("group");
        assert_eq!(group.name, "Mailboxes");
        assert_eq!(group.notes.as_deref(), Some("work and home"));
    }

    #[test]
    fn edit_group_can_skip_the_notes() {
        let (db, email) = group_with_notes();
        let (mut session, transcript) = session_with(db, &["Mailboxes", "n", "y"]);
        session
            .dispatch_line(&format!("edit group {email}"))
            .expect("edit");
        assert!(transcript.contains("Edit group notes? [y/N]"));
        assert!(!transcript.contains("Notes >"));
        let group = session.store.database().group(email).expect("group");
        assert_eq!(group.name, "Mailboxes");
        assert_eq!(group.notes.as_deref(), Some("personal"));
    }

    #[test]
    fn declined_group_edit_keeps_name_and_notes() {
        let (db, email) = group_with_notes();
        let before = db.group(email).cloned();
        let (mut session, _) = session_with(db, &["Mailboxes", "y", "changed", ".", "n"]);
        let err = session
            .dispatch_line(&format!("edit group {email}"))
            .expect_err("declined");
        assert_eq!(err.to_string(), "Group not saved");
        assert_eq!(session.store.database().group(email).cloned(), before);
    }

    #[test]
    fn deleting_the_root_is_refused() {
        let db = Database::new();
        let root = db.root_id();
        let (mut session, _) = session_with(db, &[]);
        let err = session
            .dispatch_line(&format!("delete group {root}"))
            .expect_err("refused");
        assert!(matches!(err, CommandError::Validation(_)));
    }
}
