use uuid::Uuid;

use super::console::Console;
use super::errors::CommandError;
use super::resolver::resolve_group;
use crate::store::{Database, Group};

/// Holds the session's current-group pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current: Uuid,
}

impl Navigator {
    pub fn new(root: Uuid) -> Self {
        Self { current: root }
    }

    pub fn current(&self) -> Uuid {
        self.current
    }

    pub fn set_current(&mut self, id: Uuid) {
        self.current = id;
    }

    /// The current group, or the root when the pointer went stale.
    pub fn current_group<'a>(&self, database: &'a Database) -> &'a Group {
        database.group(self.current).unwrap_or_else(|| database.root())
    }

    /// Lets the user pick any group in the tree and makes it current.
    pub fn change_current_group(
        &mut self,
        console: &mut dyn Console,
        database: &Database,
        default: Option<Uuid>,
    ) -> Result<Uuid, CommandError> {
        let id = resolve_group(console, database, None, default.or(Some(self.current)))?;
        self.current = id;
        tracing::info!(group = %id, "current group changed");
        Ok(id)
    }

    /// Falls back to the root when the current group no longer exists.
    /// Returns true when the pointer had to move.
    pub fn ensure_valid(&mut self, database: &Database) -> bool {
        if database.group(self.current).is_some() {
            return false;
        }
        tracing::debug!(stale = %self.current, "current group vanished, returning to root");
        self.current = database.root_id();
        true
    }
}
