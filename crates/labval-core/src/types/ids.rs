//! Document identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Error, Result};

/// Random bytes fixed for the lifetime of the process.
static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(rand::random);

/// 24-bit counter, seeded randomly.
static COUNTER: LazyLock<AtomicU32> =
    LazyLock::new(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff));

/// Identifier of a stored document (algorithm or workflow).
///
/// Twelve bytes rendered as 24 lowercase hex characters, laid out as
/// `timestamp (4) | process-unique (5) | counter (3)`. Ids sort in
/// creation order within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId([u8; 12]);

impl DocumentId {
    /// Length of the hex form.
    pub const HEX_LEN: usize = 24;

    /// Generates a new id stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```
    /// use labval_core::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// assert_eq!(id.to_string().len(), 24);
    /// ```
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// Generates a new id stamped with the given time.
    pub fn with_timestamp(at: DateTime<Utc>) -> Self {
        let secs = u32::try_from(at.timestamp().max(0)).unwrap_or(u32::MAX);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Builds an id from raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Time embedded in the id, truncated to the second.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(secs), 0).unwrap_or_default()
    }

    /// Returns `true` when `s` looks like a document id.
    pub fn is_valid(s: &str) -> bool {
        s.len() == Self::HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !Self::is_valid(s) {
            return Err(Error::invalid_id(s));
        }
        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &s[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| Error::invalid_id(s))?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for DocumentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_id_new_is_unique() {
        let id1 = DocumentId::new();
        let id2 = DocumentId::new();
        assert_ne!(id1, id2, "Each new ID should be unique");
    }

    #[test]
    fn test_document_id_display_is_lowercase_hex() {
        let id = DocumentId::from_bytes([0xab; 12]);
        assert_eq!(id.to_string(), "abababababababababababab");
    }

    #[test]
    fn test_document_id_from_str() {
        let id: DocumentId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_document_id_accepts_uppercase() {
        let id: DocumentId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_document_id_rejects_wrong_length() {
        let err = "65a1f0c2".parse::<DocumentId>().unwrap_err();
        assert!(matches!(err, Error::InvalidId { .. }));
    }

    #[test]
    fn test_document_id_rejects_non_hex() {
        assert!("zza1f0c2e4b0a1b2c3d4e5f6".parse::<DocumentId>().is_err());
        // Numeric ids from the old local cache are not document ids
        assert!("0".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_document_id_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 14, 9, 26, 53).unwrap();
        let id = DocumentId::with_timestamp(at);
        assert_eq!(id.timestamp(), at);
    }

    #[test]
    fn test_document_id_orders_by_creation() {
        let first = DocumentId::with_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let second = DocumentId::with_timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert!(first < second);
    }

    #[test]
    fn test_document_id_serializes_as_string() {
        let id = DocumentId::from_bytes([1; 12]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"010101010101010101010101\"");
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_document_id_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<DocumentId>("\"nope\"").is_err());
        assert!(serde_json::from_str::<DocumentId>("12").is_err());
    }
}
