use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Content address of a stored object.
///
/// An `ObjectId` is the SHA-1 digest of an object's canonical form
/// (`type SP length NUL data`). Identical `(type, data)` pairs always produce
/// the same `ObjectId`, which is what makes puts idempotent across backends.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 40;

    /// Create an `ObjectId` from a pre-computed SHA-1 digest.
    pub const fn from_hash(hash: [u8; 20]) -> Self {
        Self(hash)
    }

    /// The null object ID (all zeros). No real object hashes to it.
    pub const fn null() -> Self {
        Self([0u8; 20])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase, 40-character hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters, as git abbreviates).
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    /// Parse from a 40-character hex string. Either case is accepted.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        if s.len() != Self::HEX_LEN {
            return Err(CodecError::InvalidObjectId(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }
        let mut arr = [0u8; 20];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| CodecError::InvalidObjectId(e.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for ObjectId {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; 20] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

// Serialized as the hex string so reports and configs stay readable.
impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    #[test]
    fn null_is_all_zeros() {
        let null = ObjectId::null();
        assert!(null.is_null());
        assert_eq!(null.as_bytes(), &[0u8; 20]);
        assert_eq!(null.to_hex(), "0".repeat(40));
    }

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::from_hex(HELLO).unwrap();
        assert_eq!(id.to_hex(), HELLO);
        assert!(!id.is_null());
    }

    #[test]
    fn uppercase_hex_is_normalized() {
        let id = ObjectId::from_hex(&HELLO.to_uppercase()).unwrap();
        assert_eq!(id.to_hex(), HELLO);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = ObjectId::from_hex("ce0136").unwrap_err();
        assert!(matches!(err, CodecError::InvalidObjectId(_)));
    }

    #[test]
    fn rejects_non_hex() {
        let bad = "zz013625030ba8dba906f756967f9e9ca394464a";
        assert!(ObjectId::from_hex(bad).is_err());
    }

    #[test]
    fn short_hex_is_7_chars() {
        let id: ObjectId = HELLO.parse().unwrap();
        assert_eq!(id.short_hex(), "ce01362");
        assert_eq!(format!("{id:?}"), "ObjectId(ce01362)");
    }

    #[test]
    fn display_is_full_hex() {
        let id: ObjectId = HELLO.parse().unwrap();
        assert_eq!(format!("{id}"), HELLO);
    }

    #[test]
    fn serde_uses_hex_string() {
        let id: ObjectId = HELLO.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{HELLO}\""));
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn ordering_is_consistent() {
        let id1 = ObjectId::from_hash([0; 20]);
        let id2 = ObjectId::from_hash([1; 20]);
        assert!(id1 < id2);
    }
}
