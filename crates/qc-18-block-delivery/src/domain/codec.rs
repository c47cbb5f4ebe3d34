//! Bincode helpers for the nested byte encodings carried in envelopes.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a wire structure.
pub fn marshal<T: Serialize>(value: &T) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(value)
}

/// Decode a wire structure.
pub fn unmarshal<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, bincode::Error> {
    bincode::deserialize(bytes)
}
