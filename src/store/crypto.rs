//! Key derivation and authenticated encryption for the store file.
//!
//! The store credential is stretched with argon2id into a 256-bit key and the
//! serialized tree is sealed with AES-256-GCM. Any authentication tag mismatch
//! is reported as [`StoreError::Auth`], which covers both a wrong credential and
//! a tampered file.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

pub const SALT_BYTES: usize = 16;
pub const NONCE_BYTES: usize = 12;
const KEY_BYTES: usize = 32;
const STORE_AAD: &[u8] = b"vault-core-store-v1";

/// Secret that unlocks a store. Never printed in clear.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// argon2id cost parameters, stored alongside the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

impl KdfParams {
    /// Lowest costs argon2 accepts. Only suitable for throwaway stores.
    pub fn minimal() -> Self {
        Self {
            m_cost: Params::MIN_M_COST,
            t_cost: Params::MIN_T_COST,
            p_cost: Params::MIN_P_COST,
        }
    }
}

/// Output of [`seal`]: everything except the parameters needed to open it again.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub salt: [u8; SALT_BYTES],
    pub nonce: [u8; NONCE_BYTES],
    pub ciphertext: Vec<u8>,
}

pub fn derive_key(
    credential: &Credential,
    salt: &[u8],
    params: KdfParams,
) -> Result<[u8; KEY_BYTES], StoreError> {
    let params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_BYTES))
        .map_err(|err| StoreError::Crypto(format!("invalid key derivation parameters: {err}")))?;
    let mut key = [0u8; KEY_BYTES];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(credential.expose().as_bytes(), salt, &mut key)
        .map_err(|err| StoreError::Crypto(format!("key derivation failed: {err}")))?;
    Ok(key)
}

pub fn seal(
    plaintext: &[u8],
    credential: &Credential,
    params: KdfParams,
) -> Result<Sealed, StoreError> {
    use aes_gcm::aead::rand_core::RngCore as _;

    let mut salt = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(credential, &salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| StoreError::Crypto("derived key has invalid length".into()))?;
    let ciphertext = cipher
        .encrypt(
            (&nonce).into(),
            Payload {
                msg: plaintext,
                aad: STORE_AAD,
            },
        )
        .map_err(|_| StoreError::Crypto("store encryption failed".into()))?;

    Ok(Sealed {
        salt,
        nonce,
        ciphertext,
    })
}

pub fn unseal(
    sealed: &Sealed,
    credential: &Credential,
    params: KdfParams,
) -> Result<Vec<u8>, StoreError> {
    let key = derive_key(credential, &sealed.salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| StoreError::Crypto("derived key has invalid length".into()))?;
    cipher
        .decrypt(
            (&sealed.nonce).into(),
            Payload {
                msg: &sealed.ciphertext,
                aad: STORE_AAD,
            },
        )
        .map_err(|_| StoreError::Auth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_payload_opens_with_same_credential() {
        let credential = Credential::new("hunter2");
        let sealed = seal(b"tree", &credential, KdfParams::minimal()).expect("seal");
        assert_ne!(sealed.ciphertext, b"tree");
        let opened = unseal(&sealed, &credential, KdfParams::minimal()).expect("unseal");
        assert_eq!(opened, b"tree");
    }

    #[test]
    fn wrong_credential_is_an_auth_failure() {
        let sealed = seal(b"tree", &Credential::new("right"), KdfParams::minimal()).expect("seal");
        let err = unseal(&sealed, &Credential::new("wrong"), KdfParams::minimal())
            .expect_err("must fail");
        assert!(err.is_auth());
    }

    #[test]
    fn credential_is_redacted() {
        let credential = Credential::new("hunter2");
        assert!(!format!("{credential:?}").contains("hunter2"));
        assert!(!credential.to_string().contains("hunter2"));
    }
}
