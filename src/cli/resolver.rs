//! Turns a literal identifier, or nothing at all, into a concrete entry or group.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::console::{Console, Prompted};
use super::display::pretty_path;
use super::errors::CommandError;
use super::selection::{EntrySelectionProvider, GroupSelectionProvider, SelectionManager};
use super::selectors::SelectionOutcome;
use crate::store::Database;

static CANONICAL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("identifier pattern is valid")
});

/// Accepts only the hyphenated 8-4-4-4-12 form, in any letter case.
pub fn parse_identifier(raw: &str) -> Result<Uuid, CommandError> {
    let trimmed = raw.trim();
    if !CANONICAL_ID.is_match(trimmed) {
        return Err(CommandError::InvalidIdentifier(trimmed.to_string()));
    }
    Uuid::parse_str(trimmed).map_err(|_| CommandError::InvalidIdentifier(trimmed.to_string()))
}

/// Resolves an entry from a literal id, or by asking the user to pick one of
/// the entries directly inside `scope`.
pub fn resolve_entry(
    console: &mut dyn Console,
    database: &Database,
    literal: Option<&str>,
    scope: Uuid,
) -> Result<Uuid, CommandError> {
    let id = match literal {
        Some(raw) => parse_identifier(raw)?,
        None => {
            let provider = EntrySelectionProvider::new(database, scope);
            match SelectionManager::new(provider).choose(console, None)? {
                SelectionOutcome::Selected(id) => id,
                SelectionOutcome::Cancelled => {
                    return Err(CommandError::Cancelled("Selection cancelled".into()))
                }
                SelectionOutcome::Empty => {
                    let path = database.group_path(scope).unwrap_or_default();
                    return Err(CommandError::NotFound(format!(
                        "No entries in group {}",
                        pretty_path(&path)
                    )));
                }
            }
        }
    };
    tracing::debug!(%id, "resolving entry");
    if database.entry(id).is_none() {
        return Err(CommandError::NotFound(format!(
            "Unable to find entry for uuid {id}"
        )));
    }
    Ok(id)
}

/// Resolves a group from a literal id, or by a whole-tree selection with
/// `default` pre-selected.
pub fn resolve_group(
    console: &mut dyn Console,
    database: &Database,
    literal: Option<&str>,
    default: Option<Uuid>,
) -> Result<Uuid, CommandError> {
    let id = match literal {
        Some(raw) => parse_identifier(raw)?,
        None => match choose_group(console, database, default)? {
            Prompted::Value(id) => id,
            Prompted::Interrupted => {
                return Err(CommandError::Cancelled("Selection cancelled".into()))
            }
        },
    };
    tracing::debug!(%id, "resolving group");
    if database.group(id).is_none() {
        return Err(CommandError::NotFound(format!(
            "Unable to find group for uuid {id}"
        )));
    }
    Ok(id)
}

/// Whole-tree group menu that reports an interrupt instead of failing, so
/// field flows can offer to cancel.
pub fn choose_group(
    console: &mut dyn Console,
    database: &Database,
    default: Option<Uuid>,
) -> Result<Prompted<Uuid>, CommandError> {
    let provider = GroupSelectionProvider::new(database);
    match SelectionManager::new(provider).choose(console, default.as_ref())? {
        SelectionOutcome::Selected(id) => Ok(Prompted::Value(id)),
        SelectionOutcome::Cancelled => Ok(Prompted::Interrupted),
        // The root group always exists, so the menu is never empty.
        SelectionOutcome::Empty => Ok(Prompted::Value(database.root_id())),
    }
}
