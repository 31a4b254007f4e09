//! Display-then-confirm-then-commit for every create and edit.
//!
//! Candidates are plain values built outside the tree. Nothing is inserted or
//! applied until the user accepts the review question, so a declined review
//! leaves the store exactly as it was.

use uuid::Uuid;

use super::console::Console;
use super::display::{show_entry, show_group_header};
use super::errors::CommandError;
use super::forms::{EntryFormData, FlowEvent, FlowState, GroupFormData};
use super::session::Session;
use crate::store::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proposal<T> {
    Committed(T),
    Discarded,
}

const SAVE_ENTRY: &str = "Save entry?";
const SAVE_GROUP: &str = "Save group?";

fn review(console: &mut dyn Console, question: &str) -> Result<bool, CommandError> {
    let event = if console.confirm_or_decline(question)? {
        FlowEvent::ReviewAccepted
    } else {
        FlowEvent::ReviewDeclined
    };
    Ok(FlowState::ReviewConfirm.next(event, 0) == FlowState::Committed)
}

fn require_group_path(database: &Database, id: Uuid) -> Result<Vec<String>, CommandError> {
    database
        .group_path(id)
        .ok_or_else(|| CommandError::NotFound(format!("Unable to find group for uuid {id}")))
}

pub fn propose_create_entry(
    session: &mut Session,
    data: EntryFormData,
) -> Result<Proposal<Uuid>, CommandError> {
    let candidate = data.draft.build();
    let path = require_group_path(session.store.database(), data.parent)?;
    show_entry(session.console.as_mut(), &candidate, &path);
    if !review(session.console.as_mut(), SAVE_ENTRY)? {
        tracing::info!("new entry discarded");
        return Ok(Proposal::Discarded);
    }

    let database = session.store.database_mut();
    let id = database.insert_entry(data.parent, candidate)?;
    database.touch_entry(id)?;
    session.persist()?;
    tracing::info!(%id, parent = %data.parent, "entry created");
    Ok(Proposal::Committed(id))
}

/// Previews the edit on a copy; the stored entry changes only on commit.
pub fn propose_edit_entry(
    session: &mut Session,
    id: Uuid,
    data: EntryFormData,
) -> Result<Proposal<Uuid>, CommandError> {
    let database = session.store.database();
    let mut candidate = database
        .entry(id)
        .cloned()
        .ok_or_else(|| CommandError::NotFound(format!("Unable to find entry for uuid {id}")))?;
    candidate.apply(&data.draft);
    let path = require_group_path(database, data.parent)?;
    let moving = database.entry_parent(id).map(|group| group.id) != Some(data.parent);

    show_entry(session.console.as_mut(), &candidate, &path);
    if !review(session.console.as_mut(), SAVE_ENTRY)? {
        tracing::info!(%id, "entry edit discarded");
        return Ok(Proposal::Discarded);
    }

    let database = session.store.database_mut();
    if moving {
        database.move_entry(id, data.parent)?;
    }
    if let Some(entry) = database.entry_mut(id) {
        entry.apply(&data.draft);
    }
    database.touch_entry(id)?;
    session.persist()?;
    tracing::info!(%id, moved = moving, "entry updated");
    Ok(Proposal::Committed(id))
}

pub fn propose_create_group(
    session: &mut Session,
    data: GroupFormData,
) -> Result<Proposal<Uuid>, CommandError> {
    let parent = data
        .parent
        .unwrap_or_else(|| session.store.database().root_id());
    let candidate = data.draft.build();
    let mut path = require_group_path(session.store.database(), parent)?;
    path.push(candidate.name.clone());

    show_group_header(session.console.as_mut(), &candidate, &path);
    if !review(session.console.as_mut(), SAVE_GROUP)? {
        tracing::info!("new group discarded");
        return Ok(Proposal::Discarded);
    }

    let database = session.store.database_mut();
    let id = database.insert_group(parent, candidate)?;
    database.touch_group(id)?;
    session.persist()?;
    tracing::info!(%id, %parent, "group created");
    Ok(Proposal::Committed(id))
}

pub fn propose_edit_group(
    session: &mut Session,
    id: Uuid,
    data: GroupFormData,
) -> Result<Proposal<Uuid>, CommandError> {
    let database = session.store.database();
    let mut candidate = database
        .group(id)
        .cloned()
        .ok_or_else(|| CommandError::NotFound(format!("Unable to find group for uuid {id}")))?;
    candidate.apply(&data.draft);
    let mut path = database
        .group_parent(id)
        .and_then(|parent| database.group_path(parent.id))
        .unwrap_or_default();
    if database.group_parent(id).is_some() {
        path.push(candidate.name.clone());
    }

    show_group_header(session.console.as_mut(), &candidate, &path);
    if !review(session.console.as_mut(), SAVE_GROUP)? {
        tracing::info!(%id, "group edit discarded");
        return Ok(Proposal::Discarded);
    }

    let database = session.store.database_mut();
    if let Some(group) = database.group_mut(id) {
        group.apply(&data.draft);
    }
    database.touch_group(id)?;
    session.persist()?;
    tracing::info!(%id, "group updated");
    Ok(Proposal::Committed(id))
}
