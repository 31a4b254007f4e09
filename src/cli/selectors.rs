//! Data contracts shared by the selection menus.

/// Minimal data required to render a selectable item to the user.
#[derive(Debug, Clone)]
pub struct SelectionItem<ID> {
    /// Identifier returned to the caller when the item is chosen.
    pub id: ID,
    /// Label displayed in the menu (title, pretty path, ...).
    pub label: String,
}

impl<ID> SelectionItem<ID> {
    pub fn new(id: ID, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Outcome of a selection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome<ID> {
    Selected(ID),
    Cancelled,
    /// There was nothing to choose from.
    Empty,
}

/// Contract implemented by providers that surface selectable items.
pub trait SelectionProvider {
    type Id;

    /// Message shown above the menu.
    fn prompt(&self) -> String;

    fn items(&self) -> Vec<SelectionItem<Self::Id>>;
}
