//! Serialization of `Vec<u8>` as a hex string without a `0x` prefix, the way
//! signature bytes travel on the wire. Deserialization is lenient and accepts
//! a prefix.

use serde::{de, Deserialize, Deserializer, Serializer};
use std::borrow::Cow;

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Cow::<str>::deserialize(deserializer)?;
    let s = s.strip_prefix("0x").unwrap_or(&s);
    hex::decode(s).map_err(|err| de::Error::custom(format!("failed to decode {s:?} as hex: {err}")))
}
