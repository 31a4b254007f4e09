#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use once_cell::sync::Lazy;
use tempfile::TempDir;
use vault_core::{
    cli::{script::ScriptedConsole, script::Transcript, Session},
    store::{Credential, Database, EntryDraft, GroupDraft, KdfParams, Store},
};

pub const PASSWORD: &str = "correct horse";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Path inside a fresh temporary directory; the file itself is not created.
pub fn temp_path(name: &str) -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join(name);
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Writes an encrypted store with nothing but the root group.
pub fn empty_store_file() -> PathBuf {
    let path = temp_path("vault.store");
    Store::create(&path, Credential::new(PASSWORD), KdfParams::minimal()).expect("create store");
    path
}

/// Writes an encrypted store holding `Email/Mail` (bob / pw1) and `Bank` at the root.
pub fn seeded_store_file() -> PathBuf {
    let path = temp_path("vault.store");
    let mut store = Store::create(&path, Credential::new(PASSWORD), KdfParams::minimal())
        .expect("create store");
    seed(store.database_mut());
    store.save().expect("save seeded store");
    path
}

pub fn seed(database: &mut Database) {
    let root = database.root_id();
    let email = database
        .add_group(root, &GroupDraft::new("Email", None))
        .expect("email group");
    database
        .add_entry(email, &EntryDraft::new("Mail", "bob", "pw1", "https://mail", None))
        .expect("mail entry");
    database
        .add_entry(root, &EntryDraft::new("Bank", "alice", "", "", Some("branch 12")))
        .expect("bank entry");
}

/// Opens the store at `path` in a session driven by `answers`.
pub fn scripted_session(path: &Path, answers: &[&str]) -> (Session, Transcript) {
    let store = Store::open(path, Credential::new(PASSWORD)).expect("open store");
    let console = ScriptedConsole::new(answers.iter().copied());
    let transcript = console.transcript();
    (Session::new(store, Box::new(console)), transcript)
}
