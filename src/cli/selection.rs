pub mod manager;
pub mod providers;

pub use manager::SelectionManager;
pub use providers::{EntrySelectionProvider, GroupSelectionProvider};
