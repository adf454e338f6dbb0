//! AES-CBC obscuring of session payloads.
//!
//! Fixed key, fixed IV, zero padding, base64 text. This keeps casual readers
//! of the store away from profile and menu data; it is not confidentiality
//! against anyone who can read the shipped key.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::config::SessionConfig;
use crate::error::{CodecError, FormatError};

const BLOCK_SIZE: usize = 16;

#[derive(Clone)]
enum CipherKey {
    Aes128([u8; 16]),
    Aes192([u8; 24]),
    Aes256([u8; 32]),
}

impl CipherKey {
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let key = match bytes.len() {
            16 => fixed(bytes).map(CipherKey::Aes128),
            24 => fixed(bytes).map(CipherKey::Aes192),
            32 => fixed(bytes).map(CipherKey::Aes256),
            _ => None,
        };
        key.ok_or(CodecError::InvalidKeyLength(bytes.len()))
    }

    fn name(&self) -> &'static str {
        match self {
            CipherKey::Aes128(_) => "AES-128-CBC",
            CipherKey::Aes192(_) => "AES-192-CBC",
            CipherKey::Aes256(_) => "AES-256-CBC",
        }
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.try_into().ok()
}

/// Symmetric codec for session records.
///
/// Stateless apart from the key material, so one instance is shared (via
/// `Arc`) by every caller.
#[derive(Clone)]
pub struct SessionCodec {
    key: CipherKey,
    iv: [u8; BLOCK_SIZE],
}

impl core::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("cipher", &self.key.name())
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// Build a codec from raw key material.
    ///
    /// The key length picks AES-128/192/256; the IV must be one block.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CodecError> {
        let key = CipherKey::from_bytes(key)?;
        let iv = fixed(iv).ok_or(CodecError::InvalidIvLength(iv.len()))?;
        Ok(Self { key, iv })
    }

    /// Build a codec from configured key/IV strings, one byte per character.
    pub fn from_config(config: &SessionConfig) -> Result<Self, CodecError> {
        let key = latin1_bytes(&config.crypto_key, "cipher key")?;
        let iv = latin1_bytes(&config.crypto_iv, "initialization vector")?;
        Self::new(&key, &iv)
    }

    /// Encrypt `plaintext` into base64 text.
    ///
    /// The input is zero-padded to a whole block (nothing is added when it is
    /// already aligned), so the empty string encrypts to the empty string.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut buf = plaintext.as_bytes().to_vec();
        let rem = buf.len() % BLOCK_SIZE;
        if rem != 0 {
            buf.resize(buf.len() + BLOCK_SIZE - rem, 0);
        }

        let ciphertext = match &self.key {
            CipherKey::Aes128(key) => {
                cbc::Encryptor::<aes::Aes128>::new(key.into(), (&self.iv).into())
                    .encrypt_padded_vec_mut::<NoPadding>(&buf)
            }
            CipherKey::Aes192(key) => {
                cbc::Encryptor::<aes::Aes192>::new(key.into(), (&self.iv).into())
                    .encrypt_padded_vec_mut::<NoPadding>(&buf)
            }
            CipherKey::Aes256(key) => {
                cbc::Encryptor::<aes::Aes256>::new(key.into(), (&self.iv).into())
                    .encrypt_padded_vec_mut::<NoPadding>(&buf)
            }
        };
        STANDARD.encode(ciphertext)
    }

    /// Decrypt base64 text produced by [`SessionCodec::encrypt`].
    ///
    /// Never fails. Empty input gives an empty string; input that is not
    /// base64 or not a whole number of blocks also gives an empty string.
    /// Otherwise some text always comes back, and only parsing it tells
    /// whether it was genuine.
    pub fn decrypt(&self, ciphertext: &str) -> String {
        let ciphertext = ciphertext.trim();
        if ciphertext.is_empty() {
            return String::new();
        }

        let bytes = match STANDARD.decode(ciphertext) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = %err, "session blob is not base64");
                return String::new();
            }
        };
        if bytes.len() % BLOCK_SIZE != 0 {
            tracing::warn!(len = bytes.len(), "session blob is not block aligned");
            return String::new();
        }

        let decrypted = match &self.key {
            CipherKey::Aes128(key) => {
                cbc::Decryptor::<aes::Aes128>::new(key.into(), (&self.iv).into())
                    .decrypt_padded_vec_mut::<NoPadding>(&bytes)
            }
            CipherKey::Aes192(key) => {
                cbc::Decryptor::<aes::Aes192>::new(key.into(), (&self.iv).into())
                    .decrypt_padded_vec_mut::<NoPadding>(&bytes)
            }
            CipherKey::Aes256(key) => {
                cbc::Decryptor::<aes::Aes256>::new(key.into(), (&self.iv).into())
                    .decrypt_padded_vec_mut::<NoPadding>(&bytes)
            }
        };
        let mut plain = match decrypted {
            Ok(plain) => plain,
            Err(err) => {
                tracing::warn!(error = %err, "session blob failed to decrypt");
                return String::new();
            }
        };

        // Zero padding: drop every trailing NUL.
        while plain.last() == Some(&0) {
            plain.pop();
        }
        String::from_utf8_lossy(&plain).into_owned()
    }

    /// Decrypt a blob holding a JSON array.
    pub fn decrypt_to_array(&self, ciphertext: &str) -> Result<Vec<Value>, FormatError> {
        match parse_cleaned::<Value>(&self.decrypt(ciphertext))? {
            Value::Array(items) => Ok(items),
            other => Err(FormatError::NotAnArray(json_kind(&other))),
        }
    }

    /// Decrypt a blob and deserialize it into `T`.
    pub fn decrypt_json<T: DeserializeOwned>(&self, ciphertext: &str) -> Result<T, FormatError> {
        parse_cleaned(&self.decrypt(ciphertext))
    }

    /// Serialize `value` to JSON and encrypt it.
    pub fn encrypt_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, FormatError> {
        let json =
            serde_json::to_string(value).map_err(|e| FormatError::InvalidJson(e.to_string()))?;
        Ok(self.encrypt(&json))
    }
}

/// Remove C0 control characters (padding residue, stray line breaks) and trim.
///
/// JSON strings must escape every character below U+0020, so dropping them
/// never changes a string value; between tokens they are only whitespace.
pub(crate) fn strip_non_printable(text: &str) -> String {
    let cleaned: String = text.chars().filter(|&c| c >= ' ').collect();
    cleaned.trim().to_string()
}

fn parse_cleaned<T: DeserializeOwned>(decrypted: &str) -> Result<T, FormatError> {
    serde_json::from_str(&strip_non_printable(decrypted))
        .map_err(|e| FormatError::InvalidJson(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn latin1_bytes(text: &str, what: &'static str) -> Result<Vec<u8>, CodecError> {
    text.chars()
        .map(|c| u8::try_from(c).map_err(|_| CodecError::NonLatin1(what)))
        .collect()
}
