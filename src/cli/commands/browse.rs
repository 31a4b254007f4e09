use super::{split_args, CommandDefinition};
use crate::cli::display::{show_entries, show_group};
use crate::cli::errors::CommandError;
use crate::cli::resolver::resolve_entry;
use crate::cli::session::{CommandOutcome, LoopControl, Session};
use crate::store::{EntryField, EntryFilter};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "chggrp",
            "Change the current group",
            "chggrp",
            cmd_change_group,
        )
        .with_aliases(&["cd"])
        .with_details(&["Pick any group in the tree; its contents are listed afterwards."]),
        CommandDefinition::new(
            "find",
            "Search entries by title or username",
            "find {title|username} <text>",
            cmd_find,
        )
        .with_details(&[
            "Searches the whole store, ignoring case.",
            "Quote text that contains spaces.",
        ]),
        CommandDefinition::new(
            "getpass",
            "Print the password of an entry",
            "getpass <id>",
            cmd_getpass,
        ),
        CommandDefinition::new(
            "list",
            "List the current group",
            "list",
            cmd_list,
        )
        .with_aliases(&["ls"]),
    ]
}

fn cmd_list(session: &mut Session, rest: &str) -> CommandOutcome {
    split_args("list", rest, 0)?;
    let database = session.store.database();
    let group = session.navigator.current_group(database);
    show_group(session.console.as_mut(), database, group);
    Ok(LoopControl::Continue)
}

fn cmd_change_group(session: &mut Session, rest: &str) -> CommandOutcome {
    split_args("chggrp", rest, 0)?;
    session
        .navigator
        .change_current_group(session.console.as_mut(), session.store.database(), None)?;
    cmd_list(session, "")
}

fn cmd_find(session: &mut Session, rest: &str) -> CommandOutcome {
    let words = shell_words::split(rest)
        .map_err(|err| CommandError::usage("find", format!("Unable to parse arguments: {err}")))?;
    let Some((field, text)) = words.split_first() else {
        return Err(CommandError::usage(
            "find",
            "Missing search field: expected `title` or `username`",
        ));
    };
    let field = EntryField::parse(field).ok_or_else(|| {
        CommandError::usage(
            "find",
            format!("Unknown search field `{field}`: expected `title` or `username`"),
        )
    })?;
    let pattern = text.join(" ");
    if pattern.is_empty() {
        return Err(CommandError::usage("find", "Missing search text"));
    }

    let filter = EntryFilter::Matching {
        field,
        pattern,
        within: None,
    };
    let found = session.store.find_entries(&filter);
    tracing::debug!(?filter, matches = found.len(), "entry search");
    session
        .console
        .info(&format!("Found {} records", found.len()));
    show_entries(session.console.as_mut(), &found);
    Ok(LoopControl::Continue)
}

fn cmd_getpass(session: &mut Session, rest: &str) -> CommandOutcome {
    let args = split_args("getpass", rest, 1)?;
    let Some(literal) = args.first().copied() else {
        return Err(CommandError::usage("getpass", "Missing entry identifier"));
    };
    let scope = session.navigator.current();
    let id = resolve_entry(
        session.console.as_mut(),
        session.store.database(),
        Some(literal),
        scope,
    )?;
    let secret = session
        .store
        .database()
        .entry(id)
        .and_then(|entry| entry.secret.clone());
    match secret {
        Some(secret) => session.console.line(&secret),
        None => session.console.warning("Entry has no password entry"),
    }
    Ok(LoopControl::Continue)
}
