use std::{
    cell::RefCell,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::{
    crypto::{self, Credential, KdfParams, Sealed, NONCE_BYTES, SALT_BYTES},
    database::Database,
};
use crate::errors::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

const FORMAT_TAG: &str = "vault-core";
const FORMAT_VERSION: u32 = 1;
const KDF_ALGORITHM: &str = "argon2id";
const TMP_SUFFIX: &str = "tmp";

/// Abstraction over the medium a store is persisted to.
pub trait StoreBackend {
    fn load(&mut self, credential: &Credential) -> Result<Database>;
    fn save(&mut self, database: &Database, credential: &Credential) -> Result<()>;
    /// Human readable location used in messages.
    fn location(&self) -> String;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format: String,
    version: u32,
    kdf: KdfHeader,
    nonce: String,
    ciphertext: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct KdfHeader {
    algorithm: String,
    #[serde(flatten)]
    params: KdfParams,
    salt: String,
}

/// Encrypted single-file store: JSON envelope around an AES-256-GCM payload.
#[derive(Debug, Clone)]
pub struct EncryptedFileBackend {
    path: PathBuf,
    kdf: KdfParams,
}

impl EncryptedFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kdf: KdfParams::default(),
        }
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_envelope(&self) -> Result<Envelope> {
        let data = fs::read_to_string(&self.path)?;
        let envelope: Envelope = serde_json::from_str(&data)?;
        if envelope.format != FORMAT_TAG {
            return Err(StoreError::Format(format!(
                "unexpected format tag `{}`",
                envelope.format
            )));
        }
        if envelope.version != FORMAT_VERSION {
            return Err(StoreError::Format(format!(
                "unsupported version {}",
                envelope.version
            )));
        }
        if envelope.kdf.algorithm != KDF_ALGORITHM {
            return Err(StoreError::Format(format!(
                "unsupported key derivation `{}`",
                envelope.kdf.algorithm
            )));
        }
        Ok(envelope)
    }
}

impl StoreBackend for EncryptedFileBackend {
    fn load(&mut self, credential: &Credential) -> Result<Database> {
        let envelope = self.read_envelope()?;
        let sealed = Sealed {
            salt: decode_fixed::<SALT_BYTES>(&envelope.kdf.salt, "salt")?,
            nonce: decode_fixed::<NONCE_BYTES>(&envelope.nonce, "nonce")?,
            ciphertext: decode(&envelope.ciphertext, "ciphertext")?,
        };
        let plaintext = crypto::unseal(&sealed, credential, envelope.kdf.params)?;
        let mut database: Database = serde_json::from_slice(&plaintext)?;
        database.validate()?;
        self.kdf = envelope.kdf.params;
        tracing::debug!(path = %self.path.display(), "store loaded");
        Ok(database)
    }

    fn save(&mut self, database: &Database, credential: &Credential) -> Result<()> {
        let plaintext = serde_json::to_vec(database)?;
        let sealed = crypto::seal(&plaintext, credential, self.kdf)?;
        let envelope = Envelope {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            kdf: KdfHeader {
                algorithm: KDF_ALGORITHM.to_string(),
                params: self.kdf,
                salt: BASE64_STANDARD.encode(sealed.salt),
            },
            nonce: BASE64_STANDARD.encode(sealed.nonce),
            ciphertext: BASE64_STANDARD.encode(&sealed.ciphertext),
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "store saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Shared state behind a [`MemoryBackend`], kept by tests to inspect saves.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    pub snapshot: Option<(Database, Credential)>,
    pub saves: usize,
    pub fail_saves: bool,
}

/// Keeps the "persisted" tree in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    medium: Rc<RefCell<MemoryMedium>>,
}

impl MemoryBackend {
    pub fn new(database: Database, credential: Credential) -> Self {
        let medium = MemoryMedium {
            snapshot: Some((database, credential)),
            ..MemoryMedium::default()
        };
        Self {
            medium: Rc::new(RefCell::new(medium)),
        }
    }

    pub fn medium(&self) -> Rc<RefCell<MemoryMedium>> {
        Rc::clone(&self.medium)
    }
}

impl StoreBackend for MemoryBackend {
    fn load(&mut self, credential: &Credential) -> Result<Database> {
        let medium = self.medium.borrow();
        match &medium.snapshot {
            Some((database, stored)) if stored == credential => Ok(database.clone()),
            Some(_) => Err(StoreError::Auth),
            None => Err(StoreError::InvalidRef("memory store is empty".into())),
        }
    }

    fn save(&mut self, database: &Database, credential: &Credential) -> Result<()> {
        let mut medium = self.medium.borrow_mut();
        if medium.fail_saves {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        medium.snapshot = Some((database.clone(), credential.clone()));
        medium.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".into()
    }
}

fn decode(value: &str, what: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(value)
        .map_err(|_| StoreError::Format(format!("{what} is not valid base64")))
}

fn decode_fixed<const N: usize>(value: &str, what: &str) -> Result<[u8; N]> {
    decode(value, what)?
        .try_into()
        .map_err(|_| StoreError::Format(format!("{what} has the wrong length")))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::model::EntryDraft;
    use tempfile::TempDir;

    fn backend_in(dir: &TempDir) -> EncryptedFileBackend {
        EncryptedFileBackend::new(dir.path().join("vault.store")).with_kdf(KdfParams::minimal())
    }

    #[test]
    fn file_backend_round_trips_the_tree() {
        let temp = TempDir::new().expect("temp dir");
        let credential = Credential::new("pw");
        let mut database = Database::new();
        let root = database.root_id();
        database
            .add_entry(root, &EntryDraft::new("Mail", "bob", "pw1", "", None))
            .expect("entry");

        let mut backend = backend_in(&temp);
        backend.save(&database, &credential).expect("save");
        let raw = fs::read_to_string(backend.path()).expect("read");
        assert!(!raw.contains("bob"), "payload must be encrypted");
        assert!(!tmp_path(backend.path()).exists());

        let loaded = backend.load(&credential).expect("load");
        assert_eq!(loaded, database);
    }

    #[test]
    fn file_backend_rejects_wrong_credential() {
        let temp = TempDir::new().expect("temp dir");
        let mut backend = backend_in(&temp);
        backend
            .save(&Database::new(), &Credential::new("right"))
            .expect("save");
        let err = backend.load(&Credential::new("wrong")).expect_err("auth");
        assert!(err.is_auth());
    }

    #[test]
    fn file_backend_rejects_foreign_files() {
        let temp = TempDir::new().expect("temp dir");
        let backend = backend_in(&temp);
        fs::write(backend.path(), r#"{"format":"other","version":1,"kdf":{"algorithm":"argon2id","m_cost":8,"t_cost":1,"p_cost":1,"salt":""},"nonce":"","ciphertext":""}"#)
            .expect("write");
        let err = backend.clone().load(&Credential::new("pw")).expect_err("format");
        assert!(matches!(err, StoreError::Format(_)));
    }

    #[test]
    fn memory_backend_can_fail_saves() {
        let mut backend = MemoryBackend::new(Database::new(), Credential::new("pw"));
        backend.medium().borrow_mut().fail_saves = true;
        assert!(backend.save(&Database::new(), &Credential::new("pw")).is_err());
    }
}
