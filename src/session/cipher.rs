// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Cipher
//!
//! AES-256-CBC encryption for credential strings held by the session vault.
//!
//! Every `encrypt` call draws a fresh random 16-byte IV, so encrypting the
//! same plaintext twice yields different blobs. The IV travels inside the
//! blob itself as `<ivHex>:<cipherHex>`, two lowercase-hex segments separated
//! by a single colon, which makes `decrypt` self-describing: no side channel
//! is needed to recover the IV.
//!
//! The key is a process-wide 32-byte secret loaded from configuration at
//! startup. There is no fallback key: a missing or mis-sized key is a
//! startup failure, handled in `config`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Initialization vector length in bytes (AES block size).
pub const IV_SIZE: usize = 16;

/// Failure modes when reading an encrypted blob.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// The blob does not have the `<ivHex>:<cipherHex>` structure.
    #[error("encrypted blob is malformed: {0}")]
    Malformed(&'static str),

    /// Structurally valid blob whose ciphertext does not decrypt cleanly:
    /// wrong key, truncation, or corruption. Corrupted input never yields
    /// corrupted output.
    #[error("ciphertext could not be decrypted with the configured key")]
    Decrypt,
}

/// Symmetric cipher for short credential secrets.
#[derive(Clone)]
pub struct CredentialCipher {
    key: [u8; KEY_SIZE],
}

impl CredentialCipher {
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Encrypt a plaintext into a `<ivHex>:<cipherHex>` blob.
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let ciphertext =
            Aes256CbcEnc::new(&self.key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt), returning the
    /// exact original bytes.
    pub fn decrypt(&self, blob: &str) -> Result<Vec<u8>, CipherError> {
        let (iv_hex, cipher_hex) = blob
            .split_once(':')
            .ok_or(CipherError::Malformed("missing ':' separator"))?;

        let iv: [u8; IV_SIZE] = hex::decode(iv_hex)
            .map_err(|_| CipherError::Malformed("IV segment is not valid hex"))?
            .try_into()
            .map_err(|_| CipherError::Malformed("IV segment has wrong length"))?;

        let ciphertext = hex::decode(cipher_hex)
            .map_err(|_| CipherError::Malformed("ciphertext segment is not valid hex"))?;

        Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CipherError::Decrypt)
    }
}
