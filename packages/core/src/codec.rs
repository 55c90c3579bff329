//! Travel token codec: AES-256 over the pipe-delimited travel payload.
//!
//! The zone servers that accept a travel token decrypt it with exactly this
//! scheme, so every step below is fixed for compatibility:
//!
//! 1. Append the end marker [`MARKER`] to the plaintext.
//! 2. Map each character to one byte: its code point minus one. Only
//!    U+0001..=U+0100 fit; anything else is rejected rather than truncated.
//!    The inverse mapping adds the one back.
//! 3. Zero-fill up to the next multiple of [`BLOCK_SIZE`]. The fill always
//!    adds at least one byte, so an already aligned buffer grows by a block.
//! 4. Key material is the lowercase hex rendering of `MD5(key)`: 32 ASCII
//!    bytes, used directly as an AES-256 key.
//! 5. Each block is encrypted independently (ECB, no IV).
//! 6. The ciphertext is rendered as uppercase hex.
//!
//! Decryption reverses the steps and keeps only the text before the first
//! marker, which discards the fill. A token that does not decrypt to text
//! containing the marker (wrong key, corruption) yields nothing.
//!
//! This is not a secure construction. It exists so that tokens interoperate
//! with servers that already speak it.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use md5::{Digest, Md5};
use thiserror::Error;

/// End-of-text marker appended before encryption.
pub const MARKER: &str = "OWS#@!";

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Reasons a token could not be produced or read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("plaintext must not be empty")]
    EmptyPlaintext,

    #[error("ciphertext must not be empty")]
    EmptyCiphertext,

    #[error("key must not be empty")]
    EmptyKey,

    #[error("ciphertext is not valid hex: {0}")]
    InvalidHex(String),

    #[error("decrypted text has no end marker (wrong key or corrupted token)")]
    MarkerMissing,

    /// Only U+0001..=U+0100 fit the one-byte mapping.
    #[error("character {0:?} cannot be encoded in a travel token")]
    UnsupportedCharacter(char),
}

/// Encrypt `plaintext` with `key`, returning uppercase hex.
///
/// Returns an empty string when either input is empty or the plaintext holds
/// a character outside U+0001..=U+0100; callers must treat an empty result as
/// failure. Use [`try_encrypt`] to learn why.
pub fn encrypt(plaintext: &str, key: &str) -> String {
    try_encrypt(plaintext, key).unwrap_or_default()
}

/// Decrypt an uppercase (or lowercase) hex token with `key`.
///
/// Returns an empty string when either input is empty, the hex is invalid,
/// or the decrypted text carries no end marker.
pub fn decrypt(ciphertext_hex: &str, key: &str) -> String {
    try_decrypt(ciphertext_hex, key).unwrap_or_default()
}

/// Fallible form of [`encrypt`].
pub fn try_encrypt(plaintext: &str, key: &str) -> Result<String, CodecError> {
    if plaintext.is_empty() {
        return Err(CodecError::EmptyPlaintext);
    }
    if key.is_empty() {
        return Err(CodecError::EmptyKey);
    }

    let mut buffer = text_to_bytes(plaintext.chars().chain(MARKER.chars()))?;
    buffer.resize(padded_len(buffer.len()), 0);

    let cipher = cipher_for(key);
    for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }

    Ok(hex::encode_upper(buffer))
}

/// Fallible form of [`decrypt`].
pub fn try_decrypt(ciphertext_hex: &str, key: &str) -> Result<String, CodecError> {
    if ciphertext_hex.is_empty() {
        return Err(CodecError::EmptyCiphertext);
    }
    if key.is_empty() {
        return Err(CodecError::EmptyKey);
    }

    let mut buffer =
        hex::decode(ciphertext_hex).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
    let aligned = buffer.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    buffer.resize(aligned, 0);

    let cipher = cipher_for(key);
    for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }

    let text = bytes_to_text(&buffer);
    text.split_once(MARKER)
        .map(|(left, _)| left.to_string())
        .ok_or(CodecError::MarkerMissing)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Length after zero-fill. Always strictly greater than `len`.
fn padded_len(len: usize) -> usize {
    len + (BLOCK_SIZE - len % BLOCK_SIZE)
}

fn derive_key(key: &str) -> [u8; 32] {
    let digest = hex::encode(Md5::digest(key.as_bytes()));
    let mut material = [0u8; 32];
    material.copy_from_slice(digest.as_bytes());
    material
}

fn cipher_for(key: &str) -> Aes256 {
    let material = derive_key(key);
    Aes256::new(GenericArray::from_slice(&material))
}

// Travel payloads are ASCII because the character name is URL-encoded.
fn text_to_bytes(chars: impl Iterator<Item = char>) -> Result<Vec<u8>, CodecError> {
    chars
        .map(|c| {
            u32::from(c)
                .checked_sub(1)
                .and_then(|b| u8::try_from(b).ok())
                .ok_or(CodecError::UnsupportedCharacter(c))
        })
        .collect()
}

fn bytes_to_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| char::from_u32(u32::from(b) + 1).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
