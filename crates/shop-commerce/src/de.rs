//! Lenient field decoding for server DTOs.

use serde::{Deserialize, Deserializer};

/// Read an explicit `null` as the type's default.
///
/// `#[serde(default)]` only covers a missing field; the backend also sends
/// `"discount": null` for boxed numeric columns.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
