use std::path::Path;

use uuid::Uuid;

use super::{
    backend::{EncryptedFileBackend, StoreBackend},
    crypto::{Credential, KdfParams},
    database::{Database, EntryFilter, GroupFilter},
    model::{Entry, EntryDraft, Group, GroupDraft},
};
use crate::errors::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

/// An unlocked credential tree bound to its persistence medium.
pub struct Store {
    database: Database,
    credential: Credential,
    backend: Box<dyn StoreBackend>,
}

impl Store {
    /// Opens an existing encrypted store file.
    pub fn open(path: impl AsRef<Path>, credential: Credential) -> Result<Self> {
        let backend = EncryptedFileBackend::new(path.as_ref());
        Self::with_backend(Box::new(backend), credential)
    }

    /// Writes a fresh, empty store to `path` and returns it unlocked.
    pub fn create(path: impl AsRef<Path>, credential: Credential, kdf: KdfParams) -> Result<Self> {
        let backend = EncryptedFileBackend::new(path.as_ref()).with_kdf(kdf);
        let mut store = Self {
            database: Database::new(),
            credential,
            backend: Box::new(backend),
        };
        store.save()?;
        Ok(store)
    }

    pub fn with_backend(mut backend: Box<dyn StoreBackend>, credential: Credential) -> Result<Self> {
        let database = match backend.load(&credential) {
            Ok(database) => database,
            Err(err) => {
                if err.is_auth() {
                    tracing::warn!(location = %backend.location(), "invalid credentials supplied");
                }
                return Err(err);
            }
        };
        tracing::info!(
            location = %backend.location(),
            entries = database.entries().len(),
            "store opened"
        );
        Ok(Self {
            database,
            credential,
            backend,
        })
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    /// Persists the whole tree synchronously.
    pub fn save(&mut self) -> Result<()> {
        self.backend.save(&self.database, &self.credential)
    }

    /// Throws away the in-memory tree and re-reads the medium.
    pub fn reload(&mut self) -> Result<()> {
        self.database = self.backend.load(&self.credential)?;
        tracing::info!(location = %self.backend.location(), "store reloaded");
        Ok(())
    }

    pub fn find_entries(&self, filter: &EntryFilter) -> Vec<&Entry> {
        self.database.find_entries(filter)
    }

    pub fn find_groups(&self, filter: &GroupFilter) -> Vec<&Group> {
        self.database.find_groups(filter)
    }

    pub fn add_entry(&mut self, parent: Uuid, draft: &EntryDraft) -> Result<Uuid> {
        self.database.add_entry(parent, draft)
    }

    pub fn add_group(&mut self, parent: Uuid, draft: &GroupDraft) -> Result<Uuid> {
        self.database.add_group(parent, draft)
    }

    pub fn delete_entry(&mut self, id: Uuid) -> Result<Entry> {
        self.database.delete_entry(id)
    }

    pub fn delete_group(&mut self, id: Uuid) -> Result<Group> {
        self.database.delete_group(id)
    }

    pub fn move_entry(&mut self, id: Uuid, new_parent: Uuid) -> Result<()> {
        self.database.move_entry(id, new_parent)
    }

    pub fn trash_entry(&mut self, id: Uuid) -> Result<Uuid> {
        self.database.trash_entry(id)
    }

    pub fn recycle_bin_group(&self) -> Option<&Group> {
        self.database.recycle_bin()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Swaps the credential; takes effect on the next save.
    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = credential;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::MemoryBackend;
    use tempfile::TempDir;

    #[test]
    fn create_then_open_from_disk() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("vault.store");
        let mut store =
            Store::create(&path, Credential::new("pw"), KdfParams::minimal()).expect("create");
        let root = store.database().root_id();
        store
            .add_entry(root, &EntryDraft::new("Mail", "bob", "pw1", "", None))
            .expect("add");
        store.save().expect("save");

        let reopened = Store::open(&path, Credential::new("pw")).expect("open");
        assert_eq!(reopened.database().entries().len(), 1);
        assert!(Store::open(&path, Credential::new("nope"))
            .err()
            .is_some_and(|err| err.is_auth()));
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let backend = MemoryBackend::new(Database::new(), Credential::new("pw"));
        let mut store =
            Store::with_backend(Box::new(backend), Credential::new("pw")).expect("open");
        let root = store.database().root_id();
        store
            .add_group(root, &GroupDraft::new("Scratch", None))
            .expect("group");
        store.reload().expect("reload");
        assert_eq!(store.database().groups().len(), 1);
    }

    #[test]
    fn new_credential_applies_to_next_save() {
        let backend = MemoryBackend::new(Database::new(), Credential::new("old"));
        let medium = backend.medium();
        let mut store = Store::with_backend(Box::new(backend), Credential::new("old")).expect("open");
        store.set_credential(Credential::new("new"));
        store.save().expect("save");
        let stored = medium.borrow().snapshot.as_ref().map(|(_, c)| c.clone());
        assert_eq!(stored, Some(Credential::new("new")));
    }
}
