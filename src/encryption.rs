//! Byte transforms applied to payload text before it is stored.
//!
//! The transform only has to be deterministic and invertible for a given
//! key. It runs between the converter and the envelope, so the envelope's
//! `payload` field holds the transformed bytes.

use persist_core::{Error, Result};

/// Forward and inverse payload transform
pub trait Encryption: Send + Sync {
    /// Prepare the transform. Returns false if it cannot be used.
    fn init(&self) -> bool;

    /// Transform payload text stored under `key`
    fn encrypt(&self, key: &str, plain: &str) -> Result<Vec<u8>>;

    /// Invert [`Encryption::encrypt`] for `key`
    fn decrypt(&self, key: &str, bytes: &[u8]) -> Result<String>;
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Encryption(format!("payload is not valid UTF-8: {}", e)))
}

/// Identity transform: the payload is the UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEncryption;

impl Encryption for NoEncryption {
    fn init(&self) -> bool {
        true
    }

    fn encrypt(&self, _key: &str, plain: &str) -> Result<Vec<u8>> {
        Ok(plain.as_bytes().to_vec())
    }

    fn decrypt(&self, _key: &str, bytes: &[u8]) -> Result<String> {
        utf8(bytes)
    }
}

const SEPARATOR: &str = "###";

/// Salted reversal, bound to the key it was written under
///
/// Layout: `{fp}###{salt}###{reversed text}###{salt}###{fp}`, where `fp` is
/// the CRC32 of the key in hex. This is obfuscation, not confidentiality.
#[derive(Debug, Clone)]
pub struct ReverseEncryption {
    salt: String,
}

impl ReverseEncryption {
    /// Create with the given salt
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Salt framing every payload
    pub fn salt(&self) -> &str {
        &self.salt
    }

    fn fingerprint(key: &str) -> String {
        format!("{:08x}", crc32fast::hash(key.as_bytes()))
    }
}

impl Encryption for ReverseEncryption {
    fn init(&self) -> bool {
        !self.salt.contains(SEPARATOR)
    }

    fn encrypt(&self, key: &str, plain: &str) -> Result<Vec<u8>> {
        let fp = Self::fingerprint(key);
        let reversed: String = plain.chars().rev().collect();
        Ok(format!(
            "{fp}{sep}{salt}{sep}{reversed}{sep}{salt}{sep}{fp}",
            fp = fp,
            sep = SEPARATOR,
            salt = self.salt,
            reversed = reversed
        )
        .into_bytes())
    }

    fn decrypt(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let text = utf8(bytes)?;
        let fp = Self::fingerprint(key);
        let head = format!("{}{}{}{}", fp, SEPARATOR, self.salt, SEPARATOR);
        let tail = format!("{}{}{}{}", SEPARATOR, self.salt, SEPARATOR, fp);

        let body = text
            .strip_prefix(head.as_str())
            .and_then(|rest| rest.strip_suffix(tail.as_str()))
            .ok_or_else(|| {
                Error::Encryption(format!("payload framing does not match key {}", key))
            })?;
        Ok(body.chars().rev().collect())
    }
}
