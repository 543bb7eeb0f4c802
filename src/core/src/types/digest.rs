//! Name-derived 32-byte identifiers
//!
//! Permission identifiers and extra-data keys are blake3 digests of stable,
//! human-readable names, so independent deployments agree on them without
//! coordination.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

fn digest(name: &str) -> [u8; 32] {
    *blake3::hash(name.as_bytes()).as_bytes()
}

fn decode_hex(s: &str) -> Result<[u8; 32]> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| CoreError::invalid(format!("bad hex: {}", e)))?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| CoreError::invalid(format!("expected 32 bytes, got {}", v.len())))
}

fn short(bytes: &[u8; 32], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let hex = hex::encode(bytes);
    write!(f, "0x{}..{}", &hex[..8], &hex[hex.len() - 4..])
}

/// Identifier of a permission ("create a post", "set rules", ...).
///
/// The all-zero value is the legacy encoding of "any permission" and never
/// names a real permission.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PermissionId([u8; 32]);

impl PermissionId {
    /// Derive the identifier of a named permission
    pub fn from_name(name: &str) -> Self {
        Self(digest(name))
    }

    /// Wrap raw digest bytes, rejecting the wildcard sentinel
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        if bytes == [0u8; 32] {
            return Err(CoreError::invalid_query(
                "the zero permission is reserved for the wildcard sentinel",
            ));
        }
        Ok(Self(bytes))
    }

    /// Parse a hex-encoded identifier (optional `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(decode_hex(s)?)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermissionId(")?;
        short(&self.0, f)?;
        write!(f, ")")
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        short(&self.0, f)
    }
}

impl Serialize for PermissionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PermissionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Key of an extra-data entry attached to a primitive
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataKey([u8; 32]);

impl DataKey {
    /// Derive the key for a named entry
    pub fn from_name(name: &str) -> Self {
        Self(digest(name))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKey(")?;
        short(&self.0, f)?;
        write!(f, ")")
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        short(&self.0, f)
    }
}

impl Serialize for DataKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DataKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_hex(&s).map(Self).map_err(serde::de::Error::custom)
    }
}
