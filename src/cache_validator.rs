//! Validates integrity of reports held in the in-process store
//!
//! A report is serialized once on write and sealed with a SHA-256 checksum of
//! that exact JSON. On read the checksum is recomputed; a mismatch means the
//! entry was corrupted and it is treated as absent.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// JSON payload plus its checksum
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedCacheEntry {
    /// Serialized value (JSON string)
    pub data: String,
    /// SHA-256 checksum of the data (hex encoded)
    pub checksum: String,
}

impl ValidatedCacheEntry {
    /// Serializes `value` and seals it with a checksum
    pub fn seal<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let data = serde_json::to_string(value)?;
        let checksum = Self::compute_checksum(&data);
        Ok(Self { data, checksum })
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns true if the checksum still matches the data
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }

    /// Verifies the checksum and deserializes the value
    ///
    /// Returns None if the entry was tampered with or no longer decodes as `T`
    pub fn open<T: DeserializeOwned>(&self) -> Option<T> {
        if !self.is_valid() {
            tracing::warn!(
                "Cache validation failed: checksum mismatch. Expected: {}, Data length: {}",
                self.checksum,
                self.data.len()
            );
            return None;
        }

        match serde_json::from_str(&self.data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Cache entry passed checksum but failed to decode: {}", e);
                None
            }
        }
    }
}
