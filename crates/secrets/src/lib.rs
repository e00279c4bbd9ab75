use std::collections::HashMap;
use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::Mutex;
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::debug;

const ENVELOPE_VERSION: &str = "v1";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encrypted notes exist but no encryption key was provided")]
    MissingKey,
    #[error("encryption key must not be empty")]
    EmptyKey,
    #[error("failed to derive encryption key: {0}")]
    KeyDerivation(String),
    #[error("failed to encrypt note body: {0}")]
    Encrypt(String),
    #[error("failed to decrypt note body: wrong key or corrupted ciphertext")]
    Decrypt,
    #[error("malformed ciphertext envelope: {0}")]
    Malformed(String),
}

/// Argon2id cost parameters. They travel inside every envelope so a body
/// can be opened regardless of the parameters the current process uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl KdfParams {
    /// Cheapest parameters argon2 accepts. Only suitable for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn encode(&self) -> String {
        format!("{}.{}.{}", self.memory_kib, self.iterations, self.parallelism)
    }

    fn decode(raw: &str) -> Result<Self, CipherError> {
        let mut parts = raw.split('.').map(str::parse::<u32>);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(memory_kib)), Some(Ok(iterations)), Some(Ok(parallelism)), None) => Ok(Self {
                memory_kib,
                iterations,
                parallelism,
            }),
            _ => Err(CipherError::Malformed(format!("bad kdf parameters `{raw}`"))),
        }
    }
}

type KeyCacheEntry = ([u8; SALT_LEN], KdfParams);

/// Encrypts note bodies with AES-256-GCM under a key derived from the
/// process-wide passphrase.
///
/// Envelope: `v1:<m.t.p>:<salt b64>:<nonce b64>:<ciphertext b64>`.
pub struct BodyCipher {
    passphrase: String,
    params: KdfParams,
    salt: [u8; SALT_LEN],
    keys: Mutex<HashMap<KeyCacheEntry, [u8; KEY_LEN]>>,
}

impl fmt::Debug for BodyCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyCipher")
            .field("passphrase", &"[REDACTED]")
            .field("params", &self.params)
            .finish()
    }
}

impl BodyCipher {
    pub fn new(passphrase: impl Into<String>) -> Result<Self, CipherError> {
        Self::with_params(passphrase, KdfParams::default())
    }

    pub fn with_params(
        passphrase: impl Into<String>,
        params: KdfParams,
    ) -> Result<Self, CipherError> {
        let passphrase = passphrase.into();
        if passphrase.is_empty() {
            return Err(CipherError::EmptyKey);
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let cipher = Self {
            passphrase,
            params,
            salt,
            keys: Mutex::new(HashMap::new()),
        };
        // Surface bad parameters at construction rather than on first write.
        cipher.key_for(&salt, params)?;
        Ok(cipher)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let key = self.key_for(&self.salt, self.params)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        Ok(format!(
            "{ENVELOPE_VERSION}:{}:{}:{}:{}",
            self.params.encode(),
            BASE64.encode(self.salt),
            BASE64.encode(nonce_bytes),
            BASE64.encode(ciphertext)
        ))
    }

    pub fn decrypt(&self, envelope: &str) -> Result<String, CipherError> {
        let parts: Vec<&str> = envelope.split(':').collect();
        let [version, params, salt_b64, nonce_b64, ciphertext_b64] = parts.as_slice() else {
            return Err(CipherError::Malformed(format!(
                "expected 5 fields, found {}",
                parts.len()
            )));
        };
        if *version != ENVELOPE_VERSION {
            return Err(CipherError::Malformed(format!("unknown version `{version}`")));
        }

        let params = KdfParams::decode(params)?;
        let salt: [u8; SALT_LEN] = decode_fixed(salt_b64, "salt")?;
        let nonce_bytes: [u8; NONCE_LEN] = decode_fixed(nonce_b64, "nonce")?;
        let ciphertext = BASE64
            .decode(ciphertext_b64)
            .map_err(|e| CipherError::Malformed(format!("ciphertext: {e}")))?;

        let key = self.key_for(&salt, params)?;
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CipherError::Decrypt)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| CipherError::Decrypt)?;

        String::from_utf8(plaintext)
            .map_err(|e| CipherError::Malformed(format!("plaintext is not utf-8: {e}")))
    }

    fn key_for(
        &self,
        salt: &[u8; SALT_LEN],
        params: KdfParams,
    ) -> Result<[u8; KEY_LEN], CipherError> {
        let mut keys = self.keys.lock();
        if let Some(key) = keys.get(&(*salt, params)) {
            return Ok(*key);
        }

        debug!(?params, "deriving note encryption key");
        let key = derive_key(&self.passphrase, salt, params)?;
        keys.insert((*salt, params), key);
        Ok(key)
    }
}

fn derive_key(
    passphrase: &str,
    salt: &[u8],
    params: KdfParams,
) -> Result<[u8; KEY_LEN], CipherError> {
    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CipherError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| CipherError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

fn decode_fixed<const N: usize>(raw: &str, what: &str) -> Result<[u8; N], CipherError> {
    let bytes = BASE64
        .decode(raw)
        .map_err(|e| CipherError::Malformed(format!("{what}: {e}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        CipherError::Malformed(format!("{what} must be {N} bytes, got {}", bytes.len()))
    })
}
