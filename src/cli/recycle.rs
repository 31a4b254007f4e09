//! Soft or hard deletion depending on where the target sits in the tree.

use uuid::Uuid;

use super::console::{Console, MenuOption, Prompted};
use super::display::pretty_path;
use super::errors::CommandError;
use super::session::Session;
use crate::store::database::RECYCLE_BIN_NAME;
use crate::store::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionChoice {
    ToRecycle,
    Permanent,
    Cancel,
}

impl DeletionChoice {
    fn key(self) -> &'static str {
        match self {
            DeletionChoice::ToRecycle => "recycle",
            DeletionChoice::Permanent => "permanent",
            DeletionChoice::Cancel => "cancel",
        }
    }

    fn label(self, noun: &str, bin_path: &str) -> String {
        match self {
            DeletionChoice::ToRecycle => format!("Put {noun} in recycle bin ({bin_path})"),
            DeletionChoice::Permanent => format!("Permanently delete {noun}"),
            DeletionChoice::Cancel => format!("Cancel deleting {noun}"),
        }
    }
}

/// Targets already directly under the bin can only be removed for good.
fn choices(recycled: bool) -> Vec<DeletionChoice> {
    if recycled {
        vec![DeletionChoice::Permanent, DeletionChoice::Cancel]
    } else {
        vec![
            DeletionChoice::ToRecycle,
            DeletionChoice::Permanent,
            DeletionChoice::Cancel,
        ]
    }
}

pub fn offered_for_entry(database: &Database, id: Uuid) -> Vec<DeletionChoice> {
    choices(database.is_entry_recycled(id))
}

/// Refuses the root, the bin and anything holding the bin.
pub fn offered_for_group(
    database: &Database,
    id: Uuid,
) -> Result<Vec<DeletionChoice>, CommandError> {
    if id == database.root_id() {
        return Err(CommandError::Validation(
            "The root group cannot be deleted".into(),
        ));
    }
    if let Some(bin) = database.recycle_bin_id() {
        if bin == id {
            return Err(CommandError::Validation(
                "The recycle bin group cannot be deleted".into(),
            ));
        }
        if database.is_within(id, bin) {
            return Err(CommandError::Validation(
                "Group contains the recycle bin and cannot be deleted".into(),
            ));
        }
    }
    Ok(choices(database.is_group_recycled(id)))
}

/// Path of the designated bin, or the name a new bin would get.
fn bin_label(database: &Database) -> String {
    database
        .recycle_bin_id()
        .and_then(|id| database.group_path(id))
        .map(|path| pretty_path(&path))
        .unwrap_or_else(|| RECYCLE_BIN_NAME.to_string())
}

fn choose(
    console: &mut dyn Console,
    database: &Database,
    noun: &str,
    offered: &[DeletionChoice],
) -> Result<DeletionChoice, CommandError> {
    let bin = bin_label(database);
    let options: Vec<MenuOption> = offered
        .iter()
        .map(|choice| MenuOption::new(choice.key(), choice.label(noun, &bin)))
        .collect();
    let default = offered
        .iter()
        .position(|choice| *choice == DeletionChoice::Cancel);
    let choice = match console.select(&format!("Delete {noun}"), &options, default)? {
        Prompted::Value(index) => offered
            .get(index)
            .copied()
            .unwrap_or(DeletionChoice::Cancel),
        Prompted::Interrupted => DeletionChoice::Cancel,
    };
    tracing::debug!(?choice, noun, "deletion choice");
    Ok(choice)
}

pub fn plan_entry_deletion(
    console: &mut dyn Console,
    database: &Database,
    id: Uuid,
) -> Result<DeletionChoice, CommandError> {
    choose(console, database, "entry", &offered_for_entry(database, id))
}

pub fn plan_group_deletion(
    console: &mut dyn Console,
    database: &Database,
    id: Uuid,
) -> Result<DeletionChoice, CommandError> {
    let offered = offered_for_group(database, id)?;
    choose(console, database, "group", &offered)
}

/// Carries out `choice` and returns the message to show.
pub fn apply_entry_deletion(
    session: &mut Session,
    id: Uuid,
    choice: DeletionChoice,
) -> Result<String, CommandError> {
    let database = session.store.database_mut();
    let message = match choice {
        DeletionChoice::ToRecycle => {
            let bin = database.trash_entry(id)?;
            database.touch_entry(id)?;
            let path = database.group_path(bin).unwrap_or_default();
            format!("Entry moved to recycle bin {}", pretty_path(&path))
        }
        DeletionChoice::Permanent => {
            database.delete_entry(id)?;
            "Entry permanently deleted".to_string()
        }
        DeletionChoice::Cancel => {
            return Err(CommandError::Cancelled("Delete entry canceled".into()));
        }
    };
    session.persist()?;
    tracing::info!(%id, ?choice, "entry deleted");
    Ok(message)
}

pub fn apply_group_deletion(
    session: &mut Session,
    id: Uuid,
    choice: DeletionChoice,
) -> Result<String, CommandError> {
    let database = session.store.database_mut();
    let message = match choice {
        DeletionChoice::ToRecycle => {
            let bin = database.trash_group(id)?;
            database.touch_group(id)?;
            let path = database.group_path(bin).unwrap_or_default();
            format!("Group moved to recycle bin {}", pretty_path(&path))
        }
        DeletionChoice::Permanent => {
            database.delete_group(id)?;
            "Group permanently deleted".to_string()
        }
        DeletionChoice::Cancel => {
            return Err(CommandError::Cancelled("Delete group canceled".into()));
        }
    };
    session.persist()?;
    session.navigator.ensure_valid(session.store.database());
    tracing::info!(%id, ?choice, "group deleted");
    Ok(message)
}
