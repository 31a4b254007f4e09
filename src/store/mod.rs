//! Credential tree, encryption and persistence.

pub mod backend;
pub mod crypto;
pub mod database;
pub mod model;
#[allow(clippy::module_inception)]
pub mod store;

pub use backend::{EncryptedFileBackend, MemoryBackend, StoreBackend};
pub use crypto::{Credential, KdfParams};
pub use database::{Database, EntryField, EntryFilter, GroupFilter};
pub use model::{Entry, EntryDraft, Group, GroupDraft, Times};
pub use store::Store;
