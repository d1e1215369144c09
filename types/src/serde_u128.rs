//! Serde adapter for large raw amounts in human-edited config.
//!
//! TOML integers are signed 64-bit, which cannot hold raw stake amounts such
//! as `100_000 × 10¹⁸`. Amounts are written as decimal strings and read back
//! from either a string (underscores allowed) or a plain integer.

use serde::{de, Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Int(u64),
    Str(String),
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    match Repr::deserialize(deserializer)? {
        Repr::Int(value) => Ok(value as u128),
        Repr::Str(raw) => raw.replace('_', "").parse().map_err(de::Error::custom),
    }
}
