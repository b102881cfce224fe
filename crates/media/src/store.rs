//! Local encrypted object store.
//!
//! Stands in for the destination's media servers: every blob is encrypted
//! under a fresh random media key before it touches disk, and the caller
//! receives everything a recipient needs to locate, verify and decrypt it.
//!
//! Blob layout: `[nonce: 24 bytes][ciphertext + Poly1305 tag]`, with the
//! direct path bound as associated data.

use std::path::{Component, Path, PathBuf};

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use {
    rand::RngCore,
    sha2::{Digest, Sha256},
    tracing::debug,
};

use crate::error::{Context, Error, Result};

const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;

/// Everything known about a blob after it was stored.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// SHA-256 of the plaintext.
    pub file_sha256: Vec<u8>,
    /// SHA-256 of the encrypted blob as written.
    pub file_enc_sha256: Vec<u8>,
    /// Random 32-byte key the blob is encrypted with.
    pub media_key: Vec<u8>,
    /// Store-relative retrieval path, e.g. `/image/<uuid>.enc`.
    pub direct_path: String,
    pub object_id: String,
    /// Plaintext length in bytes.
    pub file_length: u64,
    /// Unix seconds at which the media key was generated.
    pub media_key_timestamp: i64,
}

impl std::fmt::Debug for StoredMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredMedia")
            .field("media_key", &"[REDACTED]")
            .field("direct_path", &self.direct_path)
            .field("object_id", &self.object_id)
            .field("file_length", &self.file_length)
            .finish_non_exhaustive()
    }
}

/// Directory-backed encrypted blob store.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Encrypt and persist `data` under `category` (`image`, `video`, ...).
    pub async fn store(&self, data: &[u8], category: &str) -> Result<StoredMedia> {
        if category.is_empty() || category.contains(['/', '\\', '.']) {
            return Err(Error::invalid_input(format!(
                "invalid media category: {category:?}"
            )));
        }

        let object_id = uuid::Uuid::new_v4().to_string();
        let direct_path = format!("/{category}/{object_id}.enc");

        let mut media_key = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut media_key);
        let media_key_timestamp = chrono::Utc::now().timestamp();

        let blob = seal(&media_key, data, direct_path.as_bytes())?;

        let dir = self.root.join(category);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let file = dir.join(format!("{object_id}.enc"));
        tokio::fs::write(&file, &blob)
            .await
            .with_context(|| format!("failed to write {}", file.display()))?;

        debug!(
            category,
            object_id = %object_id,
            bytes = data.len(),
            "stored encrypted media"
        );

        Ok(StoredMedia {
            file_sha256: Sha256::digest(data).to_vec(),
            file_enc_sha256: Sha256::digest(&blob).to_vec(),
            media_key: media_key.to_vec(),
            direct_path,
            object_id,
            file_length: data.len() as u64,
            media_key_timestamp,
        })
    }

    /// Read back and decrypt a blob, verifying the encrypted-blob hash.
    pub async fn open(
        &self,
        direct_path: &str,
        media_key: &[u8],
        file_enc_sha256: &[u8],
    ) -> Result<Vec<u8>> {
        let relative = Path::new(direct_path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::invalid_input(format!(
                "invalid direct path: {direct_path}"
            )));
        }
        let key: &[u8; KEY_LEN] = media_key
            .try_into()
            .map_err(|_| Error::invalid_input("media key must be 32 bytes"))?;

        let file = self.root.join(relative);
        let blob = tokio::fs::read(&file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;

        if Sha256::digest(&blob).as_slice() != file_enc_sha256 {
            return Err(Error::Message(format!(
                "encrypted hash mismatch for {direct_path}"
            )));
        }
        unseal(key, &blob, direct_path.as_bytes())
    }
}

#[allow(deprecated)]
fn seal(key: &[u8; KEY_LEN], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.into());

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, Payload {
            msg: plaintext,
            aad,
        })
        .map_err(|e| Error::Message(format!("media encryption failed: {e}")))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

#[allow(deprecated)]
fn unseal(key: &[u8; KEY_LEN], blob: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < NONCE_LEN + 16 {
        return Err(Error::Message("encrypted media too short".into()));
    }
    let (nonce_bytes, ct) = blob.split_at(NONCE_LEN);
    let nonce = XNonce::from_slice(nonce_bytes);
    let cipher = XChaCha20Poly1305::new(key.into());

    cipher
        .decrypt(nonce, Payload { msg: ct, aad })
        .map_err(|e| Error::Message(format!("media decryption failed: {e}")))
}
