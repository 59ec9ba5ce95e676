use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use once_cell::sync::Lazy;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Random value unique to this process, part of every generated [ObjectId]
static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(rand::random);

/// Incremented for every generated [ObjectId], starts at a random value. Only the lower 24 bits are used
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff));

#[derive(Error, Debug, PartialEq, Eq)]
#[error("`{0}` is not a valid object id")]
pub(crate) struct InvalidObjectId(pub(crate) String);

/// Store-assigned 12 byte identifier of an issue.
///
/// Layout: 4 byte big endian unix timestamp (seconds), 5 bytes process unique, 3 byte big endian counter.
/// Its canonical text form are 24 lowercase hexadecimal characters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generates a new object id. The counter part starts at a random value and wraps around, so ids
    /// created within the same second are unique but do not necessarily sort by creation order.
    pub(crate) fn new() -> ObjectId {
        let timestamp = Utc::now().timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        ObjectId(bytes)
    }
}

/// Parses the string into an [ObjectId] if it is a valid object id.
///
/// The string must be parsable *and* formatting the parsed value has to reproduce the string exactly.
/// This rejects strings which would be accepted by a lenient hex parser but are not in canonical form,
/// for example uppercase hex digits.
///
/// # Example
///
/// ```ignore
/// use crate::utils::object_id::parse_canonical;
///
/// assert!(parse_canonical("64fa70ee35412c842c4fccd0").is_some());
/// assert!(parse_canonical("64FA70EE35412C842C4FCCD0").is_none());
/// assert!(parse_canonical("12344567890").is_none());
/// ```
pub(crate) fn parse_canonical(input: &str) -> Option<ObjectId> {
    input.parse::<ObjectId>().ok().filter(|id| id.to_string() == input)
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 12];

        if input.len() != 24 {
            return Err(InvalidObjectId(input.to_owned()));
        }

        hex::decode_to_slice(input, &mut bytes).map_err(|_| InvalidObjectId(input.to_owned()))?;

        Ok(ObjectId(bytes))
    }
}

impl TryFrom<String> for ObjectId {
    type Error = InvalidObjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(hex::encode(self.0).as_str())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let str = String::deserialize(deserializer)?;
        str.parse().map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid(input: &str) -> bool {
        parse_canonical(input).is_some()
    }

    #[test]
    fn canonical_ids_are_valid() {
        assert!(is_valid("64fa70ee35412c842c4fccd0"));
        assert!(is_valid("000000000000000000000000"));
    }

    #[test]
    fn non_canonical_ids_are_invalid() {
        assert!(!is_valid("12344567890"));
        assert!(!is_valid("745"));
        assert!(!is_valid(""));
        assert!(!is_valid("64FA70EE35412C842C4FCCD0"));
        assert!(!is_valid("64fa70ee35412c842c4fccdz"));
        assert!(!is_valid("64fa70ee35412c842c4fccd0a"));
        assert!(!is_valid("aaaaaaaaaaaa")); // 12 characters, would be 12 raw bytes
    }

    #[test]
    fn uppercase_parses_but_is_not_canonical() {
        let id = "64FA70EE35412C842C4FCCD0".parse::<ObjectId>().unwrap();
        assert_eq!(id.to_string(), "64fa70ee35412c842c4fccd0");
    }

    #[test]
    fn generated_ids_are_valid_and_ordered() {
        let first = ObjectId::new();
        let second = ObjectId::new();

        assert!(is_valid(first.to_string().as_str()));
        assert_ne!(first, second);
        assert!(first.0[..4] <= second.0[..4]);
        assert_eq!(first.0[4..9], second.0[4..9]);
    }

    #[test]
    fn serializes_as_hex_string() {
        let id: ObjectId = "64fb3dc40deb0cbfe1bc9993".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""64fb3dc40deb0cbfe1bc9993""#);
    }
}
