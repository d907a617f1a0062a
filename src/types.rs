/// Shared types used across the codebase

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

static OBJECT_ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// 12-byte document identifier: 4 bytes of unix seconds, 5 random bytes,
/// 3 bytes of a process-wide counter. Rendered as 24 lowercase hex chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectIdError {
    #[error("the provided hex string {0} is not a valid ObjectID")]
    InvalidHex(String),

    #[error("the provided hex string {0} has length {1}, expected 24")]
    InvalidLength(String, usize),

    #[error("object ID {0} is zero and is not valid")]
    Zero(String),
}

impl ObjectId {
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        let secs = chrono::Utc::now().timestamp() as u32;
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&Uuid::new_v4().as_bytes()[..5]);
        let count = OBJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 12]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 24-character hex string. Accepts the all-zero id.
    pub fn parse_hex(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != 24 {
            return Err(ObjectIdError::InvalidLength(s.to_string(), s.len()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ObjectIdError::InvalidHex(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Parse an identifier supplied by a caller; the zero id is never assigned
    /// so it is rejected here.
    pub fn parse_user_id(s: &str) -> Result<Self, ObjectIdError> {
        let id = Self::parse_hex(s)?;
        if id.is_zero() {
            return Err(ObjectIdError::Zero(s.to_string()));
        }
        Ok(id)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let id = ObjectId::parse_hex("5b883e25ad3d111aa02b4693").unwrap();
        assert_eq!(id.to_hex(), "5b883e25ad3d111aa02b4693");
        assert_eq!(id.bytes()[0], 0x5b);
    }

    #[test]
    fn rejects_bad_input_without_panicking() {
        assert!(matches!(ObjectId::parse_hex("asdf"), Err(ObjectIdError::InvalidLength(_, 4))));
        assert!(matches!(
            ObjectId::parse_hex("zzzzzzzzzzzzzzzzzzzzzzzz"),
            Err(ObjectIdError::InvalidHex(_))
        ));
        assert!(ObjectId::parse_hex("this is a bad id").is_err());
        // multi-byte characters must not trip slicing
        assert!(ObjectId::parse_hex("ééééééééééééééééééééé").is_err());
        assert!(matches!(
            ObjectId::parse_user_id("000000000000000000000000"),
            Err(ObjectIdError::Zero(_))
        ));
    }

    #[test]
    fn new_ids_are_unique_and_nonzero() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert!(!a.is_zero());
        assert_eq!(a.to_hex().len(), 24);
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = ObjectId::parse_hex("5b883e25ad3d111aa02b4693").unwrap();
        let v = serde_json::to_value(id).unwrap();
        assert_eq!(v, serde_json::json!("5b883e25ad3d111aa02b4693"));
        let back: ObjectId = serde_json::from_value(v).unwrap();
        assert_eq!(back, id);
    }
}
