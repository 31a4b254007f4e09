use uuid::Uuid;

use crate::cli::display::pretty_path;
use crate::cli::selectors::{SelectionItem, SelectionProvider};
use crate::store::Database;

/// Entries directly inside one group, labelled by title.
pub struct EntrySelectionProvider<'a> {
    database: &'a Database,
    scope: Uuid,
}

impl<'a> EntrySelectionProvider<'a> {
    pub fn new(database: &'a Database, scope: Uuid) -> Self {
        Self { database, scope }
    }
}

impl SelectionProvider for EntrySelectionProvider<'_> {
    type Id = Uuid;

    fn prompt(&self) -> String {
        let path = self.database.group_path(self.scope).unwrap_or_default();
        format!("Select an entry in {}", pretty_path(&path))
    }

    fn items(&self) -> Vec<SelectionItem<Uuid>> {
        self.database
            .group(self.scope)
            .map(|group| {
                group
                    .entries
                    .iter()
                    .map(|entry| SelectionItem::new(entry.id, entry.title_or_empty()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Every group in the store, labelled by its full path.
pub struct GroupSelectionProvider<'a> {
    database: &'a Database,
}

impl<'a> GroupSelectionProvider<'a> {
    pub fn new(database: &'a Database) -> Self {
        Self { database }
    }
}

impl SelectionProvider for GroupSelectionProvider<'_> {
    type Id = Uuid;

    fn prompt(&self) -> String {
        "Select a group path".into()
    }

    fn items(&self) -> Vec<SelectionItem<Uuid>> {
        self.database
            .groups()
            .into_iter()
            .map(|group| {
                let path = self.database.group_path(group.id).unwrap_or_default();
                SelectionItem::new(group.id, pretty_path(&path))
            })
            .collect()
    }
}
